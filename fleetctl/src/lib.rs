//! Library part of the `fleetctl` utility.
//!
//! The live dashboard itself is in `fleetwatch-engine`, this is the terminal side of it: a
//! `Surface` printing panels and alerts, a `FrameSink` writing video frames into files and the
//! console turning `stdin` lines into user actions.  The `admin` and `officer` commands are thin
//! wrappers around the backend client.
//!

pub use cli::*;
pub use cmds::*;
pub use config::*;
pub use console::*;
pub use error::*;
pub use sink::*;
pub use surface::*;

mod cli;
mod cmds;
mod config;
mod console;
mod error;
mod sink;
mod surface;
