//! Persisted user settings.
//!
//! # Responsibility
//! - Load and save notification and logging preferences as JSON.
//!
//! # Invariants
//! - A missing settings file yields defaults, never an error.
//! - Saved files are always complete; writes go through a temp file and
//!   rename.
//! - `look_ahead_minutes` and `check_interval_secs` are never zero.

use crate::service::notification_engine::DEFAULT_LOOK_AHEAD_MINUTES;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// File name used when settings live next to the database.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notifications_enabled: bool,
    pub look_ahead_minutes: u32,
    pub check_interval_secs: u64,
    /// Overrides the build-mode default log level when set.
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            look_ahead_minutes: DEFAULT_LOOK_AHEAD_MINUTES,
            check_interval_secs: 60,
            log_level: None,
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings io failed: {err}"),
            Self::Parse(err) => write!(f, "settings file is not valid JSON: {err}"),
            Self::Invalid(details) => write!(f, "invalid settings: {details}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("event=settings_load module=settings status=ok source=default");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        info!("event=settings_load module=settings status=ok source=file");
        Ok(settings)
    }

    /// Writes settings to `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        self.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp_path, path)?;
        info!("event=settings_save module=settings status=ok");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.look_ahead_minutes == 0 {
            return Err(SettingsError::Invalid("look_ahead_minutes must be positive"));
        }
        if self.check_interval_secs == 0 {
            return Err(SettingsError::Invalid("check_interval_secs must be positive"));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsError};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"notifications_enabled": false}"#).expect("valid json");
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.look_ahead_minutes, 10);
        assert_eq!(settings.check_interval_secs, 60);
        assert_eq!(settings.log_level, None);
    }

    #[test]
    fn validate_rejects_zero_window_and_interval() {
        let zero_window = Settings {
            look_ahead_minutes: 0,
            ..Settings::default()
        };
        assert!(matches!(
            zero_window.validate(),
            Err(SettingsError::Invalid(_))
        ));

        let zero_interval = Settings {
            check_interval_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(
            zero_interval.validate(),
            Err(SettingsError::Invalid(_))
        ));
    }
}
