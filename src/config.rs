use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "RiskTriage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable pointing at a JSON `RiskConfig` file.
pub const CONFIG_ENV: &str = "RISK_TRIAGE_CONFIG";
/// Environment variable overriding the SQLite database path.
pub const DB_ENV: &str = "RISK_TRIAGE_DB";

/// Longest accepted critical window (one year).
pub const MAX_CRITICAL_WINDOW_HOURS: i64 = 24 * 365;
/// Longest accepted feature window.
pub const MAX_FEATURE_WINDOW_DAYS: i64 = 365;

/// Get the application data directory (~/RiskTriage/)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Directory holding the classifier artifact and its feature list.
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Default SQLite database location.
pub fn database_path() -> PathBuf {
    std::env::var_os(DB_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_data_dir().join("risk.db"))
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "risk_triage=info,warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {0}: {1}")]
    Read(String, String),

    #[error("Cannot parse config file {0}: {1}")]
    Parse(String, String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Thresholds and windows for the risk decision policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Non-high-risk records within the critical window that force a medium result.
    pub burden_threshold: usize,
    /// Look-back for the critical and burden overrides.
    pub critical_window_hours: i64,
    /// Look-back for feature extraction.
    pub feature_window_days: i64,
    /// Age fed to the classifier when the profile has none.
    pub default_age: i32,
    /// Probability strictly above this is high risk.
    pub high_threshold: f64,
    /// Probability strictly above this (and not high) is medium risk.
    pub medium_threshold: f64,
    /// Low-risk probabilities are compressed by this factor for display.
    pub low_score_factor: f64,
    pub model_dir: PathBuf,
    pub model_name: String,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            burden_threshold: 7,
            critical_window_hours: 24,
            feature_window_days: 7,
            default_age: 30,
            high_threshold: 0.70,
            medium_threshold: 0.30,
            low_score_factor: 0.3,
            model_dir: models_dir(),
            model_name: "risk_model".into(),
        }
    }
}

impl RiskConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e.to_string()))?;
        let config: RiskConfig = serde_json::from_str(&json)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `RISK_TRIAGE_CONFIG` if set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Look-back for the critical and burden overrides, clamped to the accepted range.
    pub fn critical_window(&self) -> Duration {
        Duration::hours(self.critical_window_hours.clamp(1, MAX_CRITICAL_WINDOW_HOURS))
    }

    /// Look-back for feature extraction, clamped to the accepted range.
    pub fn feature_window(&self) -> Duration {
        Duration::days(self.feature_window_days.clamp(1, MAX_FEATURE_WINDOW_DAYS))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.burden_threshold == 0 {
            return Err(ConfigError::Invalid("burden_threshold must be at least 1".into()));
        }
        if !(1..=MAX_CRITICAL_WINDOW_HOURS).contains(&self.critical_window_hours) {
            return Err(ConfigError::Invalid(format!(
                "critical_window_hours must be within 1..={MAX_CRITICAL_WINDOW_HOURS}, got {}",
                self.critical_window_hours
            )));
        }
        if !(1..=MAX_FEATURE_WINDOW_DAYS).contains(&self.feature_window_days) {
            return Err(ConfigError::Invalid(format!(
                "feature_window_days must be within 1..={MAX_FEATURE_WINDOW_DAYS}, got {}",
                self.feature_window_days
            )));
        }
        if !(0.0..=1.0).contains(&self.medium_threshold)
            || !(0.0..=1.0).contains(&self.high_threshold)
            || self.medium_threshold >= self.high_threshold
        {
            return Err(ConfigError::Invalid(format!(
                "thresholds must satisfy 0 <= medium ({}) < high ({}) <= 1",
                self.medium_threshold, self.high_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.low_score_factor) {
            return Err(ConfigError::Invalid("low_score_factor must be within [0, 1]".into()));
        }
        Ok(())
    }
}
