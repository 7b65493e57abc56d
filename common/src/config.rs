//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for various configuration files for
//! `fleetwatch`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.inner_mut()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use eyre::Result;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

use crate::makepath;

/// Config filename
const CONFIG: &str = "config.hcl";

/// Main name for the directory base
pub const TAG: &str = "fleetwatch";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown config file {0:?} and no default in {1:?}")]
    Missing(PathBuf, PathBuf),
    #[error("Bad config file version {found}, expected {expected}")]
    BadVersion { found: usize, expected: usize },
    #[error("No home directory, can not continue")]
    NoHome,
}

/// Every configuration file carries a `version` field that must match what the code expects.
///
pub trait Versioned {
    /// Supported version for this configuration struct.
    const VERSION: usize;

    /// Version found in the file.
    fn version(&self) -> usize;
}

/// Configuration file handle, storing where it was found and its parsed content.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    inner: T,
}

/// Returns the base configuration directory for `tag`:
/// - `$HOME/.config/<tag>` on UNIX
/// - `%LOCALAPPDATA%\<tag>` on Windows
///
#[tracing::instrument]
pub fn config_dir(tag: &str) -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or(ConfigError::NoHome)?;

    #[cfg(unix)]
    let base = base.home_dir().join(".config");

    #[cfg(windows)]
    let base = base.data_local_dir().to_path_buf();

    debug!("base = {base:?}");
    Ok(makepath!(base, tag))
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned,
{
    /// Returns the path of the default config directory
    ///
    pub fn config_path(&self) -> PathBuf {
        self.basedir.clone()
    }

    /// Project tag this file belongs to.
    ///
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the path of the default config file
    ///
    #[tracing::instrument]
    pub fn default_file() -> Result<PathBuf> {
        let cfg = config_dir(TAG)?.join(CONFIG);
        debug!("default = {cfg:?}");
        Ok(cfg)
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (base on $HOME or $LOCALAPPDATA)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&str>) -> Result<ConfigFile<T>> {
        let default = Self::default_file()?;

        let fname = match fname {
            Some(fname) => PathBuf::from(fname),
            None => default.clone(),
        };

        // Use a full path
        //
        let fname = if fname.exists() {
            fname.canonicalize()?
        } else {
            return Err(ConfigError::Missing(fname, default).into());
        };

        let basedir = fname
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        trace!("Loading config file {fname:?} from {basedir:?}");

        let data = fs::read_to_string(&fname)?;
        let inner = Self::parse(&data)?;

        Ok(ConfigFile {
            tag: String::from(TAG),
            basedir,
            inner,
        })
    }

    /// Parse HCL content and check its version.
    ///
    #[tracing::instrument(skip(data))]
    pub fn parse(data: &str) -> Result<T> {
        let data: T = hcl::from_str(data)?;
        debug!("struct data = {data:?}");

        if data.version() != T::VERSION {
            return Err(ConfigError::BadVersion {
                found: data.version(),
                expected: T::VERSION,
            }
            .into());
        }
        Ok(data)
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Return the inner configuration file as putable
    ///
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
