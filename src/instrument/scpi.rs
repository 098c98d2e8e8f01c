//! Common SCPI communication abstractions.
//!
//! This module provides the shared plumbing for table-driven SCPI drivers:
//! generic get/set routines that consume [`ParameterSpec`] descriptors,
//! `*IDN?` identification, and `*RST` reset. Validation always runs before a
//! command is formatted, so a rejected value produces no wire traffic.

use crate::adapters::ScpiTransport;
use crate::error::DriverError;
use crate::parameter::{ParameterSpec, Switch};
use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

/// Identification banner reported by `*IDN?`.
///
/// The reply is a comma-separated list of vendor, model, serial number, and
/// firmware revision; fields the instrument leaves out are reported as `n/a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Manufacturer name.
    pub vendor: String,
    /// Model number.
    pub model: String,
    /// Serial number.
    pub serial: String,
    /// Firmware revision.
    pub firmware: String,
}

impl Identity {
    /// Parse a raw `*IDN?` reply.
    pub fn parse(reply: &str) -> Self {
        let mut parts = reply.trim().splitn(4, ',').map(|p| p.trim().to_string());
        let mut next = || {
            parts
                .next()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "n/a".to_string())
        };
        Identity {
            vendor: next(),
            model: next(),
            serial: next(),
            firmware: next(),
        }
    }
}

/// Shared state and generic operations for a table-driven SCPI instrument.
pub struct ScpiInstrument {
    name: String,
    transport: Arc<dyn ScpiTransport>,
}

impl ScpiInstrument {
    /// Create an instrument handle over a transport.
    pub fn new(name: impl Into<String>, transport: Arc<dyn ScpiTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }

    /// Logical name of this instrument.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query a numeric parameter.
    ///
    /// Parses the reply as a float and applies the descriptor's `get_parser`,
    /// if any. A reply that does not parse surfaces as
    /// [`DriverError::InvalidReply`].
    pub async fn get_number(&self, spec: &ParameterSpec) -> Result<f64> {
        let reply = self
            .transport
            .query(spec.get_cmd)
            .await
            .with_context(|| format!("failed to query {} on '{}'", spec.name, self.name))?;
        let value = reply
            .trim()
            .parse::<f64>()
            .map_err(|_| DriverError::InvalidReply {
                command: spec.get_cmd.to_string(),
                reply: reply.trim().to_string(),
            })?;
        Ok(match spec.get_parser {
            Some(parse) => parse(value),
            None => value,
        })
    }

    /// Set a numeric parameter.
    ///
    /// The caller-facing value is validated against the descriptor's range
    /// before the `set_parser` converter and command formatting run; a
    /// rejected value transmits nothing.
    pub async fn set_number(&self, spec: &ParameterSpec, value: f64) -> Result<()> {
        spec.validate_number(value)?;
        let wire = match spec.set_parser {
            Some(convert) => convert(value),
            None => value,
        };
        let command = spec.format_set(&wire.to_string())?;
        self.transport
            .command(&command)
            .await
            .with_context(|| format!("failed to set {} on '{}'", spec.name, self.name))
    }

    /// Query an enumerated parameter, returning the raw token.
    pub async fn get_token(&self, spec: &ParameterSpec) -> Result<String> {
        let reply = self
            .transport
            .query(spec.get_cmd)
            .await
            .with_context(|| format!("failed to query {} on '{}'", spec.name, self.name))?;
        Ok(reply.trim().to_string())
    }

    /// Set an enumerated parameter from a token.
    ///
    /// The token is validated against the descriptor's set before anything is
    /// transmitted.
    pub async fn set_token(&self, spec: &ParameterSpec, token: &str) -> Result<()> {
        spec.validate_token(token)?;
        let command = spec.format_set(token)?;
        self.transport
            .command(&command)
            .await
            .with_context(|| format!("failed to set {} on '{}'", spec.name, self.name))
    }

    /// Query an ON/OFF parameter.
    pub async fn get_switch(&self, spec: &ParameterSpec) -> Result<Switch> {
        let reply = self
            .transport
            .query(spec.get_cmd)
            .await
            .with_context(|| format!("failed to query {} on '{}'", spec.name, self.name))?;
        Switch::from_wire(&reply).ok_or_else(|| {
            DriverError::InvalidReply {
                command: spec.get_cmd.to_string(),
                reply: reply.trim().to_string(),
            }
            .into()
        })
    }

    /// Set an ON/OFF parameter.
    pub async fn set_switch(&self, spec: &ParameterSpec, state: Switch) -> Result<()> {
        let command = spec.format_set(state.as_wire())?;
        self.transport
            .command(&command)
            .await
            .with_context(|| format!("failed to set {} on '{}'", spec.name, self.name))
    }

    /// Query and parse the `*IDN?` identification banner.
    pub async fn identify(&self) -> Result<Identity> {
        let reply = self
            .transport
            .query("*IDN?")
            .await
            .with_context(|| format!("failed to identify '{}'", self.name))?;
        Ok(Identity::parse(&reply))
    }

    /// Query the identification banner and log the connect message.
    pub async fn log_connect_message(&self) -> Result<Identity> {
        let identity = self.identify().await?;
        info!(
            "Connected '{}' to: {} {} (serial {}, firmware {})",
            self.name, identity.vendor, identity.model, identity.serial, identity.firmware
        );
        Ok(identity)
    }

    /// Issue the standard instrument reset command (`*RST`).
    pub async fn reset(&self) -> Result<()> {
        self.transport
            .command("*RST")
            .await
            .with_context(|| format!("failed to reset '{}'", self.name))
    }
}
