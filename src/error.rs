/// Error types shared across the station
use thiserror::Error;

/// Problems found while reading the station configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is not a valid value: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        ConfigError::Invalid {
            key,
            value: value.into(),
            reason,
        }
    }
}

/// Failures reported by an environmental sensor driver
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor rejected setting {setting}: {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },
    #[error("sensor bus error: {0}")]
    Bus(String),
    #[error("sensor not configured")]
    NotConfigured,
}

/// Failures writing a report to its sink
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Start-up failures of the station as a whole
#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error("pulse source error: {0}")]
    PulseSource(String),
    #[error("pulse counter modulus must be at least 2, got {0}")]
    InvalidModulus(u32),
}
