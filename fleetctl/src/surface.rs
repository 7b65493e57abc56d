//! Terminal rendition of the map.
//!
//! Marker operations are only traced, panels are printed as tables, notifications and alerts
//! are written out as they come.  There is no map to move so `focus` just records the position.
//!

use std::io::Write;

use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{debug, info, trace, warn};

use fleetwatch_common::{MapTheme, Position};
use fleetwatch_engine::{EntityKind, FrameHandle, Marker, MarkerKey, MarkerStyle, Panel, Surface};

/// Writes everything the user should see into `out`, usually `stdout`.
///
#[derive(Debug)]
pub struct TermSurface<W: Write> {
    out: W,
    focus: Option<Position>,
    theme: MapTheme,
}

impl<W: Write> TermSurface<W> {
    pub fn new(out: W) -> Self {
        TermSurface {
            out,
            focus: None,
            theme: MapTheme::default(),
        }
    }

    pub fn focused(&self) -> Option<Position> {
        self.focus
    }

    pub fn theme(&self) -> MapTheme {
        self.theme
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// A write error on the terminal is not worth stopping the dashboard for.
    ///
    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!("can not write to terminal: {e}");
        }
    }
}

/// Panel as a two-column table.
///
pub fn panel_table(panel: &Panel) -> String {
    let mut builder = Builder::default();
    builder.push_record([panel.kind().to_string(), panel.id().to_string()]);
    for (name, value) in panel.rows() {
        builder.push_record([name.to_string(), value]);
    }
    builder.build().with(Style::rounded()).to_string()
}

impl<W: Write> Surface for TermSurface<W> {
    fn add_marker(&mut self, marker: &Marker) {
        debug!(
            "new {} marker {} at {},{}",
            marker.key.kind, marker.key.id, marker.position.lat, marker.position.lng
        );
    }

    fn move_marker(&mut self, key: &MarkerKey, position: Position) {
        trace!("move {} {} to {},{}", key.kind, key.id, position.lat, position.lng);
    }

    fn restyle_marker(&mut self, key: &MarkerKey, style: &MarkerStyle) {
        debug!("restyle {} {}: {style:?}", key.kind, key.id);
    }

    fn attach(&mut self, key: &MarkerKey) {
        trace!("attach {} {}", key.kind, key.id);
    }

    fn detach(&mut self, key: &MarkerKey) {
        trace!("detach {} {}", key.kind, key.id);
    }

    fn focus(&mut self, position: Position) {
        debug!("focus on {},{}", position.lat, position.lng);
        self.focus = Some(position);
    }

    fn show_panel(&mut self, panel: &Panel) {
        let table = panel_table(panel);
        self.emit(&table);
    }

    fn hide_panel(&mut self, kind: EntityKind) {
        self.emit(&format!("({kind} panel closed)"));
    }

    fn notify(&mut self, msg: &str) {
        info!("{msg}");
        self.emit(&format!("* {msg}"));
    }

    fn alert(&mut self, msg: &str) {
        warn!("{msg}");
        self.emit(&format!("!!! {msg} !!!"));
    }

    fn set_theme(&mut self, theme: MapTheme) {
        info!("theme: {theme}");
        self.theme = theme;
    }

    fn show_frame(&mut self, frame: &FrameHandle) {
        trace!("frame {frame}");
    }
}

#[cfg(test)]
mod tests {
    use fleetwatch_engine::{Drone, DronePanel};

    use super::*;

    fn output(s: TermSurface<Vec<u8>>) -> String {
        String::from_utf8(s.into_inner()).unwrap()
    }

    #[test]
    fn test_alert_and_notify() {
        let mut s = TermSurface::new(vec![]);
        s.notify("data stream connected");
        s.alert("No drones available for dispatch.");

        let out = output(s);
        assert!(out.contains("* data stream connected\n"));
        assert!(out.contains("!!! No drones available for dispatch. !!!\n"));
    }

    #[test]
    fn test_show_panel() {
        let drone = Drone {
            id: "D1".into(),
            position: Position::new(19.1, 77.3),
            battery: Some(15.),
            telemetry: Default::default(),
        };
        let panel = Panel::Drone(DronePanel::from(&drone));

        let mut s = TermSurface::new(vec![]);
        s.show_panel(&panel);

        let out = output(s);
        assert!(out.contains("D1"));
        assert!(out.contains("15% (low)"));
    }

    #[test]
    fn test_focus_and_theme() {
        let mut s = TermSurface::new(std::io::sink());
        assert_eq!(None, s.focused());

        s.focus(Position::new(1., 2.));
        s.set_theme(MapTheme::Light);

        assert_eq!(Some(Position::new(1., 2.)), s.focused());
        assert_eq!(MapTheme::Light, s.theme());
    }
}
