//! Settings file parser for `~/.config/newsdeck/config.toml`.
//!
//! The file is optional and read-only: a missing or empty file yields
//! `Settings::default()`. Unknown keys are accepted but logged.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::{DEFAULT_USER_AGENT, MAX_ENTRIES};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// File exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Settings
// ============================================================================

/// Tunables that are not edited from the UI.
///
/// Any subset of keys can be given; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes between automatic refreshes of the displayed category. 0 disables.
    pub refresh_interval_minutes: u64,

    /// Bound on each feed request, for both display and validation.
    pub fetch_timeout_secs: u64,

    /// Articles kept per category after merging.
    pub max_entries_per_category: usize,

    /// `User-Agent` header sent with feed requests.
    pub user_agent: String,

    /// Key overrides, action name -> key string (e.g. `refresh = "F5"`).
    pub keybindings: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: 5,
            fetch_timeout_secs: 10,
            max_entries_per_category: MAX_ENTRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            keybindings: HashMap::new(),
        }
    }
}

const KNOWN_KEYS: [&str; 5] = [
    "refresh_interval_minutes",
    "fetch_timeout_secs",
    "max_entries_per_category",
    "user_agent",
    "keybindings",
];

impl Settings {
    /// Maximum settings file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Longest automatic refresh period (one day).
    pub const MAX_REFRESH_INTERVAL_MINUTES: u64 = 24 * 60;

    /// Longest per-request timeout (five minutes).
    pub const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

    /// Load settings from a TOML file.
    ///
    /// - Missing or whitespace-only file -> defaults
    /// - Invalid TOML or wrong value types -> `ConfigError::Parse`
    /// - Zero timeout or zero entry cap -> replaced by the default, with a warning
    /// - Refresh interval or timeout above its maximum -> clamped, with a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut settings: Settings = toml::from_str(&content)?;
        settings.sanitize();
        tracing::info!(
            path = %path.display(),
            refresh_minutes = settings.refresh_interval_minutes,
            timeout_secs = settings.fetch_timeout_secs,
            "Loaded configuration"
        );
        Ok(settings)
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.fetch_timeout_secs == 0 {
            tracing::warn!("fetch_timeout_secs must be positive, using default");
            self.fetch_timeout_secs = defaults.fetch_timeout_secs;
        }
        if self.fetch_timeout_secs > Self::MAX_FETCH_TIMEOUT_SECS {
            tracing::warn!(
                value = self.fetch_timeout_secs,
                max = Self::MAX_FETCH_TIMEOUT_SECS,
                "fetch_timeout_secs too large, clamping"
            );
            self.fetch_timeout_secs = Self::MAX_FETCH_TIMEOUT_SECS;
        }
        if self.refresh_interval_minutes > Self::MAX_REFRESH_INTERVAL_MINUTES {
            tracing::warn!(
                value = self.refresh_interval_minutes,
                max = Self::MAX_REFRESH_INTERVAL_MINUTES,
                "refresh_interval_minutes too large, clamping"
            );
            self.refresh_interval_minutes = Self::MAX_REFRESH_INTERVAL_MINUTES;
        }
        if self.max_entries_per_category == 0 {
            tracing::warn!("max_entries_per_category must be positive, using default");
            self.max_entries_per_category = defaults.max_entries_per_category;
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = defaults.user_agent;
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.min(Self::MAX_FETCH_TIMEOUT_SECS))
    }

    /// `None` when automatic refresh is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        let minutes = self
            .refresh_interval_minutes
            .min(Self::MAX_REFRESH_INTERVAL_MINUTES);
        (minutes > 0).then(|| Duration::from_secs(minutes * 60))
    }
}

// ============================================================================
// Tests
// ============================================================================
