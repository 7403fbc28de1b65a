//! Environment-driven bridge configuration.
//!
//! # Responsibility
//! - Resolve log level, log directory and flag overrides at startup.
//! - Apply the resolved settings to logging and a flag registry.
//!
//! Variables:
//! - `VMBRIDGE_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `VMBRIDGE_LOG_DIR`: absolute directory; file logging stays off if unset.
//! - `VMBRIDGE_FLAGS`: comma-separated override list, see
//!   [`parse_overrides`](crate::flags::overrides::parse_overrides).

use crate::flags::overrides::{parse_overrides, FlagOverride, OverrideParseError, OverrideReport};
use crate::flags::registry::FlagRegistry;
use crate::logging::{default_log_level, init_logging, normalize_level, LoggingError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "VMBRIDGE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "VMBRIDGE_LOG_DIR";
pub const ENV_FLAGS: &str = "VMBRIDGE_FLAGS";

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
    InvalidOverride(OverrideParseError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{ENV_LOG_LEVEL}: {err}"),
            Self::InvalidOverride(err) => write!(f, "{ENV_FLAGS}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(err) => Some(err),
            Self::InvalidOverride(err) => Some(err),
        }
    }
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub flag_overrides: Vec<FlagOverride>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            flag_overrides: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };
        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        let flag_overrides = match read(ENV_FLAGS) {
            Some(raw) => parse_overrides(&raw).map_err(ConfigError::InvalidOverride)?,
            None => Vec::new(),
        };

        Ok(Self {
            log_level,
            log_dir,
            flag_overrides,
        })
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is left off.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        init_logging(self.log_level, &log_dir.to_string_lossy())?;
        Ok(true)
    }

    /// Applies the configured overrides to `registry`.
    pub fn apply_flag_overrides(&self, registry: &FlagRegistry) -> OverrideReport {
        let report = registry.apply_overrides(&self.flag_overrides);
        for failure in &report.failures {
            warn!("event=flag_override module=config status=skipped reason=\"{failure}\"");
        }
        report
    }
}
