//! Application settings loading from margem.toml
//!
//! Covers the tunables of the costing engine: the cost-alert threshold and
//! cooldown, the trial length, and the billing price-tier map that translates
//! provider price identifiers into plan types. Every section has defaults so
//! a missing file means stock behavior, not a crash.

use crate::errors::{Error, Result};
use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Configuration structure representing the entire margem.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    /// Cost alert tuning
    #[serde(default)]
    pub alerts: AlertSettings,
    /// Trial signup tuning
    #[serde(default)]
    pub trial: TrialSettings,
    /// Billing provider integration
    #[serde(default)]
    pub billing: BillingSettings,
}

/// Cost anomaly detector tuning
#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    /// Per-unit price increase, in percent, above which an alert fires
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: f64,
    /// Minimum minutes between two alerts for the same ingredient
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
}

/// Trial signup tuning
#[derive(Debug, Deserialize, Clone)]
pub struct TrialSettings {
    /// Days of access granted on trial signup
    #[serde(default = "default_trial_days")]
    pub days: i64,
}

/// Billing provider integration settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BillingSettings {
    /// Maps provider price identifiers to plan types (`"Monthly"` / `"Annual"`).
    /// Checkout events referencing an unmapped tier are rejected.
    #[serde(default)]
    pub price_tiers: HashMap<String, String>,
}

const fn default_threshold_percent() -> f64 {
    15.0
}

const fn default_cooldown_minutes() -> i64 {
    30
}

const fn default_trial_days() -> i64 {
    7
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            threshold_percent: default_threshold_percent(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self {
            days: default_trial_days(),
        }
    }
}

impl AlertSettings {
    /// The cooldown as a chrono duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::minutes(self.cooldown_minutes)
    }
}

impl TrialSettings {
    /// The trial length as a chrono duration.
    #[must_use]
    pub fn length(&self) -> Duration {
        Duration::days(self.days)
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse margem.toml: {e}"),
    })
}

/// Loads settings from the default location (./margem.toml), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("margem.toml");
    if path.exists() {
        load_settings(path)
    } else {
        Ok(Settings::default())
    }
}
