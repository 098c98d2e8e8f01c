//! Agilent E8267C signal generator driver.
//!
//! The driver declares its controls as a static table of
//! [`ParameterSpec`] descriptors and exposes a typed accessor pair per
//! parameter. On construction the output power and power offset are forced to
//! zero before anything else touches the instrument, then the identification
//! banner is requested and logged.
//!
//! ## Configuration
//!
//! ```toml
//! [instruments.siggen]
//! address = "TCPIP0::192.168.1.5::INSTR"
//! timeout_ms = 5000
//! ```

use crate::adapters::ScpiTransport;
use crate::error::DriverError;
use crate::instrument::scpi::{Identity, ScpiInstrument};
use crate::parameter::{ParameterSpec, Switch, Vals};
use anyhow::Result;
use std::sync::Arc;

/// Frequency mode tokens accepted by `FREQ:MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyMode {
    /// Fixed frequency.
    Fixed,
    /// Continuous wave.
    Cw,
    /// Sweep.
    Sweep,
    /// List mode.
    List,
}

impl FrequencyMode {
    /// Wire token for this mode.
    pub fn as_scpi(self) -> &'static str {
        match self {
            FrequencyMode::Fixed => "FIX",
            FrequencyMode::Cw => "CW",
            FrequencyMode::Sweep => "SWE",
            FrequencyMode::List => "LIST",
        }
    }

    /// Parse an instrument reply token.
    pub fn from_scpi(token: &str) -> Option<Self> {
        match token.trim() {
            "FIX" => Some(FrequencyMode::Fixed),
            "CW" => Some(FrequencyMode::Cw),
            "SWE" => Some(FrequencyMode::Sweep),
            "LIST" => Some(FrequencyMode::List),
            _ => None,
        }
    }
}

// Conversion helpers for the phase parameter. Both converters are kept even
// though the exposed and wire values are documented in degrees; the pair
// matches the instrument's observed behaviour and must round-trip unchanged.
fn deg_to_rad(angle_deg: f64) -> f64 {
    angle_deg.to_radians()
}

fn rad_to_deg(angle_rad: f64) -> f64 {
    angle_rad.to_degrees()
}

/// Output frequency in Hz.
pub const FREQUENCY: ParameterSpec = ParameterSpec {
    name: "frequency",
    label: "Frequency",
    unit: "Hz",
    get_cmd: "FREQ?",
    set_cmd: "FREQ {value}",
    vals: Vals::Numbers {
        min: 100e3,
        max: 40e9,
    },
    get_parser: None,
    set_parser: None,
};

/// Frequency offset in Hz.
pub const FREQ_OFFSET: ParameterSpec = ParameterSpec {
    name: "freq_offset",
    label: "Frequency offset",
    unit: "Hz",
    get_cmd: "FREQ:OFFS?",
    set_cmd: "FREQ:OFFS {value}",
    vals: Vals::Numbers {
        min: -200e9,
        max: 200e9,
    },
    get_parser: None,
    set_parser: None,
};

/// Frequency mode (FIX, CW, SWE, LIST).
pub const FREQ_MODE: ParameterSpec = ParameterSpec {
    name: "freq_mode",
    label: "Frequency mode",
    unit: "",
    get_cmd: "FREQ:MODE?",
    set_cmd: "FREQ:MODE {value}",
    vals: Vals::Enumerated(&["FIX", "CW", "SWE", "LIST"]),
    get_parser: None,
    set_parser: None,
};

/// Internal pulse modulation width.
pub const PULSE_WIDTH: ParameterSpec = ParameterSpec {
    name: "pulse_width",
    label: "Pulse width",
    unit: "ns",
    get_cmd: "PULM:INT:PWID?",
    set_cmd: "PULM:INT:PWID {value}",
    vals: Vals::Numbers {
        min: 10e-9,
        max: 20e-9,
    },
    get_parser: None,
    set_parser: None,
};

/// Carrier phase in degrees.
pub const PHASE: ParameterSpec = ParameterSpec {
    name: "phase",
    label: "Phase",
    unit: "deg",
    get_cmd: "PHAS?",
    set_cmd: "PHAS {value}",
    vals: Vals::Numbers {
        min: -180.0,
        max: 179.0,
    },
    get_parser: Some(rad_to_deg),
    set_parser: Some(deg_to_rad),
};

/// Output power in dBm.
pub const POWER: ParameterSpec = ParameterSpec {
    name: "power",
    label: "Power",
    unit: "dBm",
    get_cmd: "POW?",
    set_cmd: "POW {value}",
    vals: Vals::Numbers {
        min: -135.0,
        max: 25.0,
    },
    get_parser: None,
    set_parser: None,
};

/// Power offset in dBm.
pub const POWER_OFFSET: ParameterSpec = ParameterSpec {
    name: "power_offset",
    label: "Power offset",
    unit: "dBm",
    get_cmd: "POW:OFFS?",
    set_cmd: "POW:OFFS {value}",
    vals: Vals::Numbers {
        min: -200.0,
        max: 200.0,
    },
    get_parser: None,
    set_parser: None,
};

/// RF output enable.
pub const OUTPUT_RF: ParameterSpec = ParameterSpec {
    name: "output_rf",
    label: "RF output",
    unit: "",
    get_cmd: "OUTP?",
    set_cmd: "OUTP {value}",
    vals: Vals::OnOff,
    get_parser: None,
    set_parser: None,
};

/// RF modulation enable.
pub const MODULATION_RF: ParameterSpec = ParameterSpec {
    name: "modulation_rf",
    label: "RF modulation",
    unit: "",
    get_cmd: "OUTP:MOD?",
    set_cmd: "OUTP:MOD {value}",
    vals: Vals::OnOff,
    get_parser: None,
    set_parser: None,
};

/// Every parameter the driver declares, for enumeration and tests.
pub const PARAMETERS: &[&ParameterSpec] = &[
    &FREQUENCY,
    &FREQ_OFFSET,
    &FREQ_MODE,
    &PULSE_WIDTH,
    &PHASE,
    &POWER,
    &POWER_OFFSET,
    &OUTPUT_RF,
    &MODULATION_RF,
];

/// Agilent E8267C signal generator.
pub struct AgilentE8267C {
    scpi: ScpiInstrument,
}

impl AgilentE8267C {
    /// Connect to the instrument.
    ///
    /// Power and power offset are reset to zero before any other interaction,
    /// then the identification banner is requested and logged.
    pub async fn connect(
        name: impl Into<String>,
        transport: Arc<dyn ScpiTransport>,
    ) -> Result<Self> {
        let driver = Self {
            scpi: ScpiInstrument::new(name, transport),
        };
        // Reset output levels on every reconnect.
        driver.set_power(0.0).await?;
        driver.set_power_offset(0.0).await?;
        driver.scpi.log_connect_message().await?;
        Ok(driver)
    }

    /// Connect through a VISA transport described by a configuration entry.
    #[cfg(feature = "instrument_visa")]
    pub async fn connect_from_config(
        name: impl Into<String>,
        config: &crate::config::InstrumentConfig,
    ) -> Result<Self> {
        let transport = crate::adapters::VisaTransport::from_config(config)?;
        Self::connect(name, Arc::new(transport)).await
    }

    /// Logical name of this instrument.
    pub fn name(&self) -> &str {
        self.scpi.name()
    }

    /// Query the output frequency in Hz.
    pub async fn frequency(&self) -> Result<f64> {
        self.scpi.get_number(&FREQUENCY).await
    }

    /// Set the output frequency in Hz. Valid range: 100 kHz to 40 GHz.
    pub async fn set_frequency(&self, hz: f64) -> Result<()> {
        self.scpi.set_number(&FREQUENCY, hz).await
    }

    /// Query the frequency offset in Hz.
    pub async fn freq_offset(&self) -> Result<f64> {
        self.scpi.get_number(&FREQ_OFFSET).await
    }

    /// Set the frequency offset in Hz.
    pub async fn set_freq_offset(&self, hz: f64) -> Result<()> {
        self.scpi.set_number(&FREQ_OFFSET, hz).await
    }

    /// Query the frequency mode.
    pub async fn freq_mode(&self) -> Result<FrequencyMode> {
        let token = self.scpi.get_token(&FREQ_MODE).await?;
        FrequencyMode::from_scpi(&token).ok_or_else(|| {
            DriverError::InvalidReply {
                command: FREQ_MODE.get_cmd.to_string(),
                reply: token,
            }
            .into()
        })
    }

    /// Set the frequency mode.
    pub async fn set_freq_mode(&self, mode: FrequencyMode) -> Result<()> {
        self.scpi.set_token(&FREQ_MODE, mode.as_scpi()).await
    }

    /// Query the internal pulse modulation width.
    pub async fn pulse_width(&self) -> Result<f64> {
        self.scpi.get_number(&PULSE_WIDTH).await
    }

    /// Set the internal pulse modulation width.
    pub async fn set_pulse_width(&self, width: f64) -> Result<()> {
        self.scpi.set_number(&PULSE_WIDTH, width).await
    }

    /// Query the carrier phase in degrees.
    pub async fn phase(&self) -> Result<f64> {
        self.scpi.get_number(&PHASE).await
    }

    /// Set the carrier phase in degrees. Valid range: -180 to 179.
    pub async fn set_phase(&self, degrees: f64) -> Result<()> {
        self.scpi.set_number(&PHASE, degrees).await
    }

    /// Query the output power in dBm.
    pub async fn power(&self) -> Result<f64> {
        self.scpi.get_number(&POWER).await
    }

    /// Set the output power in dBm. Valid range: -135 to 25.
    pub async fn set_power(&self, dbm: f64) -> Result<()> {
        self.scpi.set_number(&POWER, dbm).await
    }

    /// Query the power offset in dBm.
    pub async fn power_offset(&self) -> Result<f64> {
        self.scpi.get_number(&POWER_OFFSET).await
    }

    /// Set the power offset in dBm.
    pub async fn set_power_offset(&self, dbm: f64) -> Result<()> {
        self.scpi.set_number(&POWER_OFFSET, dbm).await
    }

    /// Query the RF output state.
    pub async fn output_rf(&self) -> Result<Switch> {
        self.scpi.get_switch(&OUTPUT_RF).await
    }

    /// Enable or disable the RF output.
    pub async fn set_output_rf(&self, state: Switch) -> Result<()> {
        self.scpi.set_switch(&OUTPUT_RF, state).await
    }

    /// Query the RF modulation state.
    pub async fn modulation_rf(&self) -> Result<Switch> {
        self.scpi.get_switch(&MODULATION_RF).await
    }

    /// Enable or disable RF modulation.
    pub async fn set_modulation_rf(&self, state: Switch) -> Result<()> {
        self.scpi.set_switch(&MODULATION_RF, state).await
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_table_commands() {
        // Every declared get command ends with '?', every set command carries
        // the value placeholder.
        for spec in PARAMETERS {
            assert!(spec.get_cmd.ends_with('?'), "{}", spec.name);
            assert!(spec.set_cmd.contains("{value}"), "{}", spec.name);
        }
    }

    #[test]
    fn test_parameter_names_unique() {
        let mut names: Vec<_> = PARAMETERS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PARAMETERS.len());
    }

    #[test]
    fn test_frequency_mode_tokens() {
        for mode in [
            FrequencyMode::Fixed,
            FrequencyMode::Cw,
            FrequencyMode::Sweep,
            FrequencyMode::List,
        ] {
            assert_eq!(FrequencyMode::from_scpi(mode.as_scpi()), Some(mode));
            assert!(FREQ_MODE.validate_token(mode.as_scpi()).is_ok());
        }
        assert_eq!(FrequencyMode::from_scpi("AUTO"), None);
    }

    #[test]
    fn test_phase_converters_round_trip() {
        let set = PHASE.set_parser.unwrap();
        let get = PHASE.get_parser.unwrap();
        for degrees in [-180.0, -90.0, 0.0, 45.0, 179.0] {
            let round_trip = get(set(degrees));
            assert!((round_trip - degrees).abs() < 1e-9);
        }
    }
}
