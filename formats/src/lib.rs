//! Definition of the data formats
//!
//! Three families of payloads go over the wire:
//!
//! - the structured-data stream messages (`Envelope` and the records it carries),
//! - the commands we send back on the same stream (`Command`),
//! - the request/response bodies of the backend REST calls (`OfficerDetail`, etc.).
//!
//! Records are deliberately lenient: every field the backend may omit is an `Option` so that
//! validation happens in the engine, one record at a time, instead of failing a whole batch.
//!

pub use backend::*;
pub use command::*;
pub use message::*;

mod backend;
mod command;
mod message;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
