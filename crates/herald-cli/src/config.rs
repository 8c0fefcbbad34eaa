//! Configuration loading for the `herald` binary.
//!
//! Configuration comes from three layers, later layers overriding earlier
//! ones: built-in defaults, an optional `herald.toml` file, and `HERALD_*`
//! environment variables (a `.env` file is honored via dotenvy).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use herald_handlers::HandlerConfig;

/// File consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "herald.toml";

/// Top-level configuration for the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Calendar that events are created in and enumerated from.
    pub calendar: String,

    /// Start of the working day, 24h whole hour.
    pub business_hours_start: u32,

    /// End of the working day, 24h whole hour.
    pub business_hours_end: u32,

    /// Time limit for one osascript execution.
    pub backend_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: herald_handlers::config::DEFAULT_CALENDAR.to_string(),
            business_hours_start: 9,
            business_hours_end: 17,
            backend_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A `.env` next to the binary is a convenience, not a requirement.
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                        .with_context(|| format!("failed to load {DEFAULT_CONFIG_FILE}"))?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(calendar) = std::env::var("HERALD_CALENDAR") {
            config.calendar = calendar;
        }
        if let Ok(timeout) = std::env::var("HERALD_BACKEND_TIMEOUT_SECS") {
            config.backend_timeout_secs = timeout
                .parse()
                .context("HERALD_BACKEND_TIMEOUT_SECS is not a number")?;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// The slice of configuration the handlers consume.
    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            calendar_name: self.calendar.clone(),
            business_hours_start: self.business_hours_start,
            business_hours_end: self.business_hours_end,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let config = Config::default();
        assert_eq!(config.calendar, "Home");
        assert_eq!(config.backend_timeout_secs, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "calendar = \"Work\"\nbusiness-hours-start = 8\nbackend-timeout-secs = 5"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.calendar, "Work");
        assert_eq!(config.business_hours_start, 8);
        assert_eq!(config.business_hours_end, 17);
        assert_eq!(config.backend_timeout_secs, 5);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/herald.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn handler_config_carries_the_calendar() {
        let config = Config {
            calendar: "Side Projects".to_string(),
            ..Config::default()
        };
        let handler_config = config.handler_config();
        assert_eq!(handler_config.calendar_name, "Side Projects");
        assert_eq!(handler_config.business_hours_start, 9);
    }
}
