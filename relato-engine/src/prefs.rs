//! Device-local playback preferences
//!
//! The catalog owns bookmarks; the device owns how it plays them back. Rate
//! and preferred voice survive restarts via a small TOML file. A missing or
//! unreadable file silently yields defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Preferences persisted per device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicePrefs {
    /// Playback rate to restore on startup
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Preferred narration voice, if the user has picked one
    #[serde(default)]
    pub voice: Option<String>,
}

fn default_rate() -> f64 {
    1.0
}

impl Default for DevicePrefs {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            voice: None,
        }
    }
}

impl DevicePrefs {
    /// Load preferences, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring malformed prefs file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                debug!("No prefs file at {:?} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Write preferences to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("Failed to serialize prefs: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
