//! Configuration loading for instrument definitions.
//!
//! Configuration is loaded from a TOML file, with environment variable
//! overrides prefixed with `RFDRIVERS_`. Each instrument entry carries the
//! transport address, an optional timeout, and an opaque options table that is
//! forwarded to the transport untouched.
//!
//! ```toml
//! [instruments.siggen]
//! address = "TCPIP0::192.168.1.5::INSTR"
//! timeout_ms = 5000
//!
//! [instruments.awg]
//! address = "TCPIP0::192.168.1.7::INSTR"
//! timeout_ms = 10000
//! options = { io_protocol = "hislip" }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/instruments.toml";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File or environment parsing failed.
    #[error("configuration load error: {0}")]
    Load(#[from] figment::Error),
    /// Parsed fine but a value is logically invalid.
    #[error("configuration validation error: {0}")]
    Validation(String),
}

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Instrument definitions keyed by logical name.
    #[serde(default)]
    pub instruments: HashMap<String, InstrumentConfig>,
}

/// One instrument's transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Transport address, e.g. a VISA resource string.
    pub address: String,
    /// Transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Additional transport options, forwarded opaquely.
    #[serde(default)]
    pub options: HashMap<String, toml::Value>,
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl InstrumentConfig {
    /// Transport timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    /// Load settings from the default location with environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load settings from a specific TOML file with environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("RFDRIVERS_").split("_"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Look up one instrument's configuration by logical name.
    pub fn instrument(&self, name: &str) -> Option<&InstrumentConfig> {
        self.instruments.get(name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, config) in &self.instruments {
            if config.address.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "instrument '{}' has an empty address",
                    name
                )));
            }
            if config.timeout_ms == 0 {
                return Err(ConfigError::Validation(format!(
                    "instrument '{}' has a zero timeout",
                    name
                )));
            }
        }
        Ok(())
    }
}
