//! Live-entity reconciliation and rendering core.
//!
//! Inbound stream messages go through the reconciliation engine into the `EntityStore`, the
//! `RenderAdapter` reflects every change onto a `Surface` (the "map") and the selection context
//! decides which panel is shown.  All of it lives in a `Dashboard`, driven one `Event` at a time.
//!
//! The streams themselves are kept alive by a `Supervisor` each, and the `Runner` glues the
//! supervisors and the dashboard together on a single-threaded runtime.
//!

pub use backend::*;
pub use dashboard::*;
pub use dispatch::*;
pub use error::*;
pub use link::*;
pub use panel::*;
pub use reconcile::*;
pub use render::*;
pub use runner::*;
pub use selection::*;
pub use stats::*;
pub use store::*;
pub use video::*;
pub use ws::*;

mod backend;
mod dashboard;
mod dispatch;
mod error;
mod link;
mod panel;
mod reconcile;
mod render;
mod runner;
mod selection;
mod stats;
mod store;
mod video;
mod ws;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}
