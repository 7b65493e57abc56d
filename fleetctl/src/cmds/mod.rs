pub use admin::*;
pub use officer::*;
pub use watch::*;

mod admin;
mod officer;
mod watch;
