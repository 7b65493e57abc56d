//! Module describing all possible commands and sub-commands to the `fleetctl` main driver
//!
//! We have three main commands:
//!
//! - `watch`
//! - `admin`
//! - `officer`
//!
//! `watch` connects to the data stream (and the video stream if configured) and runs the live
//! dashboard in the terminal.  Marker and panel changes are logged, the console on `stdin`
//! accepts the same actions as the map would (select, dispatch, filter, theme…).
//!
//! `admin` drives the officer registration workflow on the backend, `officer` displays the full
//! record of one officer.
//!
//! `config` shows where the configuration file is expected and `completion` is here just to
//! configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// debug mode (hierarchical traces).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Also log into this directory.
    #[clap(short = 'L', long)]
    pub logdir: Option<String>,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `admin (list|approve ID)`
/// `completion SHELL`
/// `config`
/// `officer ID`
/// `version`
/// `watch [--no-video] [--theme T]`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Registration requests
    Admin(AdminOpts),
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Show configuration file location
    Config,
    /// Display one officer's full record
    Officer(OfficerOpts),
    /// List all package versions
    Version,
    /// Live dashboard
    Watch(WatchOpts),
}

// ------

/// Options for the live dashboard.
///
#[derive(Debug, Parser)]
pub struct WatchOpts {
    /// Do not connect to the video stream.
    #[clap(long)]
    pub no_video: bool,
    /// Override the backend base URL.
    #[clap(short = 'B', long)]
    pub base: Option<String>,
}

// ------

/// This contain only the `admin` sub-commands.
///
#[derive(Debug, Parser)]
pub struct AdminOpts {
    /// Sub-commands
    #[clap(subcommand)]
    pub subcmd: AdminSubCommand,
}

/// All `admin` sub-commands:
///
/// `admin list`
/// `admin approve ID`
///
#[derive(Debug, Parser)]
pub enum AdminSubCommand {
    /// List pending registration requests
    List,
    /// Approve one request
    Approve(ApproveOpts),
}

#[derive(Debug, Parser)]
pub struct ApproveOpts {
    /// Request ID
    pub id: String,
}

// ------

#[derive(Debug, Parser)]
pub struct OfficerOpts {
    /// Officer ID
    pub id: String,
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
