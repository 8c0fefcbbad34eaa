//! Static handler configuration.
//!
//! Read once at construction and passed by value to each handler that needs
//! it; nothing here is mutated during dispatch.

use serde::{Deserialize, Serialize};

/// Default calendar name used when no configuration file is present.
pub const DEFAULT_CALENDAR: &str = "Home";

/// Configuration shared by the calendar handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HandlerConfig {
    /// Name of the calendar that events are created in and enumerated from.
    pub calendar_name: String,

    /// Start of the working day, as a 24h whole hour.  Carried as part of
    /// the configuration surface; not consulted when generating outcomes.
    pub business_hours_start: u32,

    /// End of the working day, as a 24h whole hour.
    pub business_hours_end: u32,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            calendar_name: DEFAULT_CALENDAR.to_string(),
            business_hours_start: 9,
            business_hours_end: 17,
        }
    }
}
