//! Interactive console on `stdin`.
//!
//! Every line is parsed with its own `clap` parser and turned into a `UserAction` for the
//! dashboard, this is what clicking on the map or the panel buttons would do in a GUI.
//!
//! ```text
//! drone D1            select a drone (deselects any officer)
//! officer POL-1A2B3C  select an officer, fetching their details
//! close drone         close the drone panel
//! rtl | land          command the selected drone
//! target | emergency  arm the next click
//! click 19.1 77.3     "click" on the map
//! filter drones       all, drones or officers
//! theme satellite     dark, light or satellite
//! quit
//! ```
//!

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use eyre::Result;
use strum::VariantNames;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tracing::{debug, trace, warn};

use fleetwatch_common::{MapTheme, Position};
use fleetwatch_engine::{EntityKind, Event, UserAction, Visibility};
use fleetwatch_formats::Action;

use crate::Status;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[clap(subcommand)]
    cmd: ConsoleCmd,
}

#[derive(Debug, Subcommand)]
enum ConsoleCmd {
    /// Select a drone
    Drone { id: String },
    /// Select an officer
    Officer { id: String },
    /// Close the drone or officer panel
    Close { kind: EntityKind },
    /// Return to launch
    Rtl,
    /// Land now
    Land,
    /// Next click sends the selected drone there
    Target,
    /// Next click sends the nearest drone there
    Emergency,
    /// Cancel target or emergency mode
    Disarm,
    /// Click on the map
    #[command(allow_negative_numbers = true)]
    Click { lat: f64, lng: f64 },
    /// Which markers are displayed
    Filter {
        #[arg(
            ignore_case = true,
            value_parser = PossibleValuesParser::new(Visibility::VARIANTS)
                .try_map(|s| s.parse::<Visibility>())
        )]
        filter: Visibility,
    },
    /// Map theme
    Theme {
        #[arg(
            ignore_case = true,
            value_parser = PossibleValuesParser::new(MapTheme::VARIANTS)
                .try_map(|s| s.parse::<MapTheme>())
        )]
        theme: MapTheme,
    },
    /// Leave
    #[command(alias = "exit")]
    Quit,
}

/// What one console line asks for.
///
#[derive(Debug, PartialEq)]
pub enum Input {
    Action(UserAction),
    Quit,
}

/// Parse one line, `Ok(None)` for an empty one.
///
/// A `clap::Error` is returned as-is so that `help` can be displayed by the caller.
///
pub fn parse_line(line: &str) -> Result<Option<Input>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }

    let line = Line::try_parse_from(words)?;
    let input = match line.cmd {
        ConsoleCmd::Drone { id } => Input::Action(UserAction::SelectDrone(id)),
        ConsoleCmd::Officer { id } => Input::Action(UserAction::SelectOfficer(id)),
        ConsoleCmd::Close { kind } => Input::Action(match kind {
            EntityKind::Drone => UserAction::DeselectDrone,
            EntityKind::Officer => UserAction::DeselectOfficer,
        }),
        ConsoleCmd::Rtl => Input::Action(UserAction::Send(Action::Rtl)),
        ConsoleCmd::Land => Input::Action(UserAction::Send(Action::Land)),
        ConsoleCmd::Target => Input::Action(UserAction::ArmTarget),
        ConsoleCmd::Emergency => Input::Action(UserAction::ArmEmergency),
        ConsoleCmd::Disarm => Input::Action(UserAction::Disarm),
        ConsoleCmd::Click { lat, lng } => {
            let pos = Position::new(lat, lng);
            if !pos.is_valid() {
                let e = Status::BadPosition(lat, lng);
                return Err(clap::Error::raw(
                    clap::error::ErrorKind::ValueValidation,
                    format!("{e}\n"),
                ));
            }
            Input::Action(UserAction::Click(pos))
        }
        ConsoleCmd::Filter { filter } => Input::Action(UserAction::Filter(filter)),
        ConsoleCmd::Theme { theme } => Input::Action(UserAction::Theme(theme)),
        ConsoleCmd::Quit => Input::Quit,
    };
    Ok(Some(input))
}

/// Read `stdin` until EOF or `quit`, forwarding actions as events.
///
/// Returns `true` if the user asked to quit, `false` on EOF or if the dashboard is gone.
///
#[tracing::instrument(skip_all)]
pub async fn console(events: Sender<Event>) -> Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        trace!("console: {line}");

        match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(Input::Quit)) => {
                debug!("quit");
                return Ok(true);
            }
            Ok(Some(Input::Action(action))) => {
                if events.send(Event::User(action)).await.is_err() {
                    warn!("dashboard gone");
                    break;
                }
            }
            Err(e) => eprint!("{}", e.render()),
        }
    }
    Ok(false)
}
