//! Configuration for the playback engine
//!
//! Engine configuration is injected by the host at construction. A TOML
//! loader is provided for hosts that keep settings in a file; all fields
//! except `user_id` have built-in defaults.
//!
//! User identity is always explicit configuration, never ambient state the
//! engine invents on its own.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Identity forwarded to the catalog on every request
    pub user_id: String,

    /// Narration voice used for resume lookups and bookmark writes
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Narration style used for resume lookups and bookmark writes
    #[serde(default = "default_style")]
    pub style: String,

    /// Minimum spacing between bookmark writes for the same
    /// (book, chapter, voice, style) tuple
    #[serde(default = "default_bookmark_throttle_ms")]
    pub bookmark_throttle_ms: u64,

    /// Position drift (seconds) tolerated before a remote play event forces
    /// a local re-seek
    #[serde(default = "default_drift_tolerance_secs")]
    pub drift_tolerance_secs: f64,

    /// Lower bound for the playback rate
    #[serde(default = "default_min_rate")]
    pub min_rate: f64,

    /// Upper bound for the playback rate
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Where device preferences (rate, voice) are persisted; `None` disables
    /// preference persistence
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
}

fn default_voice() -> String {
    "onyx".to_string()
}

fn default_style() -> String {
    "learning".to_string()
}

fn default_bookmark_throttle_ms() -> u64 {
    2000
}

fn default_drift_tolerance_secs() -> f64 {
    2.0
}

fn default_min_rate() -> f64 {
    0.5
}

fn default_max_rate() -> f64 {
    3.0
}

fn default_event_capacity() -> usize {
    100
}

impl EngineConfig {
    /// Configuration with built-in defaults for the given user
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            voice: default_voice(),
            style: default_style(),
            bookmark_throttle_ms: default_bookmark_throttle_ms(),
            drift_tolerance_secs: default_drift_tolerance_secs(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            event_capacity: default_event_capacity(),
            prefs_path: None,
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub async fn load(path: &Path) -> Result<Self> {
        let toml_str = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded engine configuration from {:?}", path);
        Ok(config)
    }

    /// Bookmark throttle window as a Duration
    pub fn bookmark_throttle(&self) -> Duration {
        Duration::from_millis(self.bookmark_throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let config = EngineConfig::new("user-1");
        assert_eq!(config.voice, "onyx");
        assert_eq!(config.style, "learning");
        assert_eq!(config.bookmark_throttle_ms, 2000);
        assert_eq!(config.min_rate, 0.5);
        assert_eq!(config.max_rate, 3.0);
        assert!(config.prefs_path.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            user_id = "reader-7"
            voice = "nova"
            bookmark_throttle_ms = 1500
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.user_id, "reader-7");
        assert_eq!(config.voice, "nova");
        assert_eq!(config.bookmark_throttle(), Duration::from_millis(1500));
        // Untouched fields keep defaults
        assert_eq!(config.style, "learning");
        assert_eq!(config.event_capacity, 100);
    }

    #[test]
    fn missing_user_id_is_an_error() {
        let result = EngineConfig::from_toml_str("voice = \"nova\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
