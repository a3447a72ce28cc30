use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::session::budget::validate_limit;

/// File name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Default daily limit (30 minutes)
pub const DEFAULT_LIMIT_SECONDS: u32 = 30 * 60;

/// User settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Daily diary session limit in seconds (60..=1800)
    #[serde(default = "default_limit_seconds")]
    pub limit_seconds: u32,

    /// Send desktop notifications for the warning and expiry cues
    #[serde(default = "default_notifications")]
    pub notifications: bool,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_limit_seconds() -> u32 {
    DEFAULT_LIMIT_SECONDS
}

fn default_notifications() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit_seconds: default_limit_seconds(),
            notifications: default_notifications(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Default settings with the given daily limit
    pub fn with_limit(seconds: u32) -> Result<Self, SessionError> {
        Ok(Self {
            limit_seconds: validate_limit(seconds)?,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        validate_limit(self.limit_seconds).map(|_| ())
    }
}

/// Settings persisted as TOML in the data directory
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("No settings file at {}, using defaults", self.path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable settings, using defaults: {:#}", e);
                Settings::default()
            }
        }
    }

    /// Load settings from file
    pub fn try_load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", self.path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid settings file: {}", self.path.display()))?;

        Ok(Some(settings))
    }

    /// Save settings to file; invalid settings leave the file untouched
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;

        crate::platform::common::atomic_write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;

        Ok(())
    }

    /// Replace the daily limit, keeping the other settings
    pub fn set_limit(&self, seconds: u32) -> Result<Settings> {
        validate_limit(seconds)?;

        let mut settings = self.load();
        settings.limit_seconds = seconds;
        self.save(&settings)?;

        Ok(settings)
    }
}
