//! Configuration for `fleetctl`.
//!
//! ```hcl
//! version  = 1
//! base_url = "http://10.0.0.5:8000"
//! data     = "/ws/locations"
//! video    = "/ws/video"
//! frames   = "/tmp/fleetwatch-frames"
//! ```
//!
//! `data` and `video` are paths on the backend host, the scheme becomes `ws` (or `wss` for an
//! `https` base).  Frames are only written if `frames` is set and the preferences live next to
//! the configuration file unless `prefs` says otherwise.
//!

use std::path::{Path, PathBuf};

use eyre::Result;
use serde::Deserialize;
use tracing::debug;

use fleetwatch_common::{Versioned, PREFS};

use crate::Status;

/// Current version
pub const CVERSION: usize = 1;

/// Default path of the structured-data stream.
const DEF_DATA: &str = "/ws/locations";

/// Configuration for the CLI tool.
///
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Always `CVERSION`.
    pub version: usize,
    /// Backend root, used for both REST and WebSockets.
    pub base_url: String,
    /// Data stream path.
    #[serde(default = "default_data")]
    pub data: String,
    /// Video stream path, no video if absent.
    pub video: Option<String>,
    /// Where frames are written.
    pub frames: Option<PathBuf>,
    /// Preferences file.
    pub prefs: Option<PathBuf>,
}

fn default_data() -> String {
    DEF_DATA.to_string()
}

impl Versioned for Config {
    const VERSION: usize = CVERSION;

    fn version(&self) -> usize {
        self.version
    }
}

impl Config {
    /// WebSocket URL for `path` on the backend host.
    ///
    pub fn ws_url(&self, base: &str, path: &str) -> Result<String> {
        let base = base.trim_end_matches('/');
        let rest = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(Status::BadBaseUrl(base.to_string()).into());
        };
        let path = path.trim_start_matches('/');
        let url = format!("{rest}/{path}");
        debug!("ws url = {url}");
        Ok(url)
    }

    pub fn data_url(&self, base: &str) -> Result<String> {
        self.ws_url(base, &self.data)
    }

    pub fn video_url(&self, base: &str) -> Result<Option<String>> {
        self.video
            .as_deref()
            .map(|path| self.ws_url(base, path))
            .transpose()
    }

    /// Preferences file, relative to `basedir` if not explicitly set.
    ///
    pub fn prefs_file(&self, basedir: &Path) -> PathBuf {
        match &self.prefs {
            Some(p) => p.clone(),
            None => basedir.join(PREFS),
        }
    }
}
