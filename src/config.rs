//! Application configuration
//!
//! Read from a TOML file (`~/.config/parking-tariff/config.toml` by default).
//! Every section and field is optional; a missing file yields defaults.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "text"   # or "json"
//!
//! [billing]
//! utc_offset_minutes = -360
//! schedule_iteration_cap = 10000
//! ```

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BillingClock, MAX_SCHEDULE_ITERATIONS};

/// Widest UTC offset in use anywhere (UTC+14)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Offset of the parking lot's wall clock from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Maximum schedule blocks visited per stay
    pub schedule_iteration_cap: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            schedule_iteration_cap: MAX_SCHEDULE_ITERATIONS,
        }
    }
}

impl BillingConfig {
    /// Billing clock for these settings. Out-of-range offsets fall back to UTC;
    /// [`AppConfig::validate`] reports them.
    pub fn clock(&self) -> BillingClock {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or(BillingClock::default().offset);
        BillingClock::new(offset, self.schedule_iteration_cap)
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.billing.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "billing.utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}, got {}",
                self.billing.utc_offset_minutes
            )));
        }
        if self.billing.schedule_iteration_cap == 0 {
            return Err(ConfigError::Invalid(
                "billing.schedule_iteration_cap must be positive".to_string(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be \"text\" or \"json\", got {other:?}"
            ))),
        }
    }
}

/// `~/.config/parking-tariff/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("parking-tariff").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup. `RUST_LOG` takes precedence over
/// `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
