//! Persisted user preferences.
//!
//! There is only one for now, the map theme.  It is read at startup and written back on every
//! change, a missing or unreadable file gives the default theme.
//!

use std::fs;
use std::path::{Path, PathBuf};

use eyre::Result;
use serde::{Deserialize, Serialize};
use strum::{EnumString, VariantNames};
use tracing::{debug, trace, warn};

/// Preferences filename
pub const PREFS: &str = "prefs.hcl";

/// Visual theme of the map tiles.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    EnumString,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MapTheme {
    #[default]
    Dark,
    Light,
    Satellite,
}

/// On-disk form, kept as a string so that an unknown value does not prevent loading.
///
#[derive(Debug, Default, Deserialize, Serialize)]
struct PrefsFile {
    theme: Option<String>,
}

#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    theme: MapTheme,
}

impl Preferences {
    /// Read preferences from `path`, falling back to defaults.
    ///
    #[tracing::instrument]
    pub fn load(path: &Path) -> Self {
        trace!("enter");

        let theme = fs::read_to_string(path)
            .ok()
            .and_then(|data| hcl::from_str::<PrefsFile>(&data).ok())
            .and_then(|p| p.theme)
            .and_then(|t| match t.parse::<MapTheme>() {
                Ok(t) => Some(t),
                Err(_) => {
                    warn!("unknown theme {t}, using default");
                    None
                }
            })
            .unwrap_or_default();
        debug!("theme = {theme}");

        Preferences {
            path: path.to_path_buf(),
            theme,
        }
    }

    pub fn theme(&self) -> MapTheme {
        self.theme
    }

    /// Change the theme and persist it immediately.
    ///
    #[tracing::instrument(skip(self))]
    pub fn set_theme(&mut self, theme: MapTheme) -> Result<()> {
        self.theme = theme;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let data = hcl::to_string(&PrefsFile {
            theme: Some(theme.to_string()),
        })?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test_pretty_log::test]
    fn test_prefs_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let p = Preferences::load(&dir.path().join(PREFS));
        assert_eq!(MapTheme::Dark, p.theme());
    }

    #[test_pretty_log::test]
    fn test_prefs_write_then_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sub").join(PREFS);

        let mut p = Preferences::load(&path);
        p.set_theme(MapTheme::Satellite)?;

        let p = Preferences::load(&path);
        assert_eq!(MapTheme::Satellite, p.theme());
        Ok(())
    }

    #[test_pretty_log::test]
    fn test_prefs_unknown_theme() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PREFS);
        fs::write(&path, "theme = \"neon\"\n")?;

        let p = Preferences::load(&path);
        assert_eq!(MapTheme::Dark, p.theme());
        Ok(())
    }

    #[rstest]
    #[case("dark", MapTheme::Dark)]
    #[case("LIGHT", MapTheme::Light)]
    #[case("Satellite", MapTheme::Satellite)]
    fn test_theme_parse(#[case] s: &str, #[case] theme: MapTheme) {
        assert_eq!(theme, s.parse::<MapTheme>().unwrap());
    }
}
