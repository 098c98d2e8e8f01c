//! Tektronix AWG70000-series arbitrary waveform generator drivers.
//!
//! [`Awg70000A`] is the shared multi-channel base driver; concrete models are
//! thin specializations that fix the channel count and forward everything
//! else. Waveform sequencing and per-channel control beyond the channel count
//! live outside this crate.
//!
//! ## Configuration
//!
//! ```toml
//! [instruments.awg]
//! address = "TCPIP0::192.168.1.7::INSTR"
//! timeout_ms = 10000
//! ```

use crate::adapters::ScpiTransport;
use crate::instrument::scpi::{Identity, ScpiInstrument};
use anyhow::{ensure, Result};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Construction options forwarded to the base driver.
#[derive(Debug, Clone)]
pub struct AwgOptions {
    /// Transport timeout.
    pub timeout: Duration,
    /// Additional transport options, forwarded opaquely.
    pub extra: HashMap<String, toml::Value>,
}

impl Default for AwgOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            extra: HashMap::new(),
        }
    }
}

/// Shared base driver for the AWG70000 series.
pub struct Awg70000A {
    scpi: ScpiInstrument,
    num_channels: usize,
    timeout: Duration,
}

impl Awg70000A {
    /// Connect to the instrument.
    ///
    /// The identification banner is requested and logged on connect. The
    /// series only ships with one or two channels; other counts are rejected.
    pub async fn connect(
        name: impl Into<String>,
        transport: Arc<dyn ScpiTransport>,
        num_channels: usize,
        options: AwgOptions,
    ) -> Result<Self> {
        ensure!(
            (1..=2).contains(&num_channels),
            "AWG70000 series has 1 or 2 channels, not {}",
            num_channels
        );
        let driver = Self {
            scpi: ScpiInstrument::new(name, transport),
            num_channels,
            timeout: options.timeout,
        };
        driver.scpi.log_connect_message().await?;
        Ok(driver)
    }

    /// Logical name of this instrument.
    pub fn name(&self) -> &str {
        self.scpi.name()
    }

    /// Number of output channels this model carries.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Transport timeout this driver was constructed with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query the identification banner.
    pub async fn identify(&self) -> Result<Identity> {
        self.scpi.identify().await
    }

    /// Reset the instrument (`*RST`).
    pub async fn reset(&self) -> Result<()> {
        self.scpi.reset().await
    }
}

/// Tektronix AWG70001B.
///
/// All the actual driver behaviour lives in [`Awg70000A`]; this type only
/// fixes the channel count to two and forwards everything else to the base.
pub struct TektronixAwg70001B {
    inner: Awg70000A,
}

impl TektronixAwg70001B {
    /// Connect to an AWG70001B. Default timeout is 10 seconds.
    pub async fn connect(
        name: impl Into<String>,
        transport: Arc<dyn ScpiTransport>,
        options: AwgOptions,
    ) -> Result<Self> {
        Ok(Self {
            inner: Awg70000A::connect(name, transport, 2, options).await?,
        })
    }

    /// Connect through a VISA transport described by a configuration entry.
    #[cfg(feature = "instrument_visa")]
    pub async fn connect_from_config(
        name: impl Into<String>,
        config: &crate::config::InstrumentConfig,
    ) -> Result<Self> {
        let transport = crate::adapters::VisaTransport::from_config(config)?;
        let options = AwgOptions {
            timeout: config.timeout(),
            extra: config.options.clone(),
        };
        Self::connect(name, Arc::new(transport), options).await
    }
}

impl Deref for TektronixAwg70001B {
    type Target = Awg70000A;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AwgOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert!(options.extra.is_empty());
    }
}
