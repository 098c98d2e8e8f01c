//! Declarative SCPI parameter descriptors.
//!
//! Each driver declares a static table of [`ParameterSpec`] entries, one per
//! instrument control. A descriptor carries the query/set command pair, the
//! legal-value predicate checked before anything is transmitted, and optional
//! numeric converters applied on read and write. The generic get/set routines
//! in [`crate::instrument`] consume these tables, so adding a parameter to a
//! driver is one table entry plus a typed accessor.
//!
//! Set-command templates use a `{value}` placeholder rendered with `strfmt`:
//!
//! ```text
//! get_cmd: "FREQ?"          set_cmd: "FREQ {value}"
//! ```

use crate::error::{DriverError, DriverResult};
use std::collections::HashMap;
use std::fmt;
use strfmt::strfmt;

/// Legal-value predicate for a parameter.
#[derive(Debug, Clone, Copy)]
pub enum Vals {
    /// Any value is accepted.
    Any,
    /// Inclusive numeric range: `min <= value <= max`.
    Numbers {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
    /// Value must be one of the listed tokens, exactly.
    Enumerated(&'static [&'static str]),
    /// Two-state control: ON/OFF exposed, `1`/`0` on the wire.
    OnOff,
}

/// Static descriptor for one instrument parameter.
///
/// Declared once per driver as a `const` item and never mutated. The optional
/// `get_parser`/`set_parser` converters are pure numeric functions; validation
/// always runs against the caller-facing value, before `set_parser` is applied.
pub struct ParameterSpec {
    /// Identifier used in error messages and logs.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Unit of the caller-facing value (empty when unitless).
    pub unit: &'static str,
    /// Query command string.
    pub get_cmd: &'static str,
    /// Set command template with a `{value}` placeholder.
    pub set_cmd: &'static str,
    /// Legal-value predicate.
    pub vals: Vals,
    /// Converter applied to the parsed reply on read.
    pub get_parser: Option<fn(f64) -> f64>,
    /// Converter applied to the value before it is formatted for transmission.
    pub set_parser: Option<fn(f64) -> f64>,
}

impl ParameterSpec {
    /// Check a numeric value against the declared range.
    pub fn validate_number(&self, value: f64) -> DriverResult<()> {
        if let Vals::Numbers { min, max } = self.vals {
            if !(min..=max).contains(&value) {
                return Err(DriverError::OutOfRange {
                    name: self.name,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a token against the declared enumerated set.
    pub fn validate_token(&self, token: &str) -> DriverResult<()> {
        if let Vals::Enumerated(allowed) = self.vals {
            if !allowed.contains(&token) {
                return Err(DriverError::InvalidChoice {
                    name: self.name,
                    value: token.to_string(),
                    allowed,
                });
            }
        }
        Ok(())
    }

    /// Render the set-command template with the wire value substituted.
    pub fn format_set(&self, value: &str) -> DriverResult<String> {
        let mut vars = HashMap::new();
        vars.insert("value".to_string(), value.to_string());
        strfmt(self.set_cmd, &vars).map_err(|e| DriverError::CommandFormat(e.to_string()))
    }
}

impl fmt::Debug for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSpec")
            .field("name", &self.name)
            .field("get_cmd", &self.get_cmd)
            .field("set_cmd", &self.set_cmd)
            .field("vals", &self.vals)
            .finish()
    }
}

/// Two-state instrument control exposed as ON/OFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// Output disabled (`0` on the wire).
    Off,
    /// Output enabled (`1` on the wire).
    On,
}

impl Switch {
    /// Wire token transmitted to the instrument.
    pub fn as_wire(self) -> &'static str {
        match self {
            Switch::Off => "0",
            Switch::On => "1",
        }
    }

    /// Parse an instrument reply. Accepts the numeric wire form as well as
    /// the spelled-out tokens some firmware revisions echo.
    pub fn from_wire(reply: &str) -> Option<Self> {
        match reply.trim() {
            "0" | "OFF" => Some(Switch::Off),
            "1" | "ON" => Some(Switch::On),
            _ => None,
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Switch::Off => write!(f, "OFF"),
            Switch::On => write!(f, "ON"),
        }
    }
}
