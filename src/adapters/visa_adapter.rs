//! VISA transport implementation.
//!
//! This module provides a [`ScpiTransport`] implementation for devices that
//! support the VISA (Virtual Instrument Software Architecture) standard. It
//! uses the `visa-rs` crate to communicate with the VISA library.
//!
//! Commands are newline-terminated ASCII; replies are read in a single buffer
//! and trimmed. VISA calls are synchronous, so they run inside
//! `spawn_blocking` to keep the async executor free.

use super::ScpiTransport;
use crate::config::InstrumentConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use std::ffi::CString;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use visa_rs::prelude::*;

/// A [`ScpiTransport`] implementation for VISA devices.
#[derive(Clone)]
pub struct VisaTransport {
    resource: String,
    session: Arc<Mutex<Instrument>>,
    timeout: Duration,
}

impl VisaTransport {
    /// Open a VISA session for the given resource string.
    pub fn open(resource: &str, timeout: Duration) -> Result<Self> {
        let rm = DefaultRM::new().context("Failed to open VISA resource manager")?;
        let c_string = CString::new(resource).context("Failed to create CString")?;
        let visa_string = visa_rs::VisaString::from(c_string);
        let session = rm
            .open(&visa_string, AccessMode::NO_LOCK, TIMEOUT_IMMEDIATE)
            .with_context(|| format!("Failed to open VISA resource '{}'", resource))?;

        Ok(Self {
            resource: resource.to_string(),
            session: Arc::new(Mutex::new(session)),
            timeout,
        })
    }

    /// Open a VISA session from an instrument configuration entry.
    ///
    /// The `address` field is the VISA resource string; `timeout_ms` and any
    /// extra `options` are forwarded opaquely to the session.
    pub fn from_config(config: &InstrumentConfig) -> Result<Self> {
        let transport = Self::open(&config.address, config.timeout())?;
        for (key, value) in &config.options {
            debug!("VISA option '{}' = {} (forwarded)", key, value);
        }
        Ok(transport)
    }

    /// The VISA resource string this transport was opened with.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn blocking_query(&self, command: &str) -> Result<String> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("VISA session lock poisoned"))?;
        session
            .write_all(format!("{}\n", command).as_bytes())
            .with_context(|| format!("Failed to write '{}' to '{}'", command, self.resource))?;
        let mut buf = [0u8; 1024];
        let bytes_read = session
            .read(&mut buf)
            .with_context(|| format!("Failed to read reply to '{}'", command))?;
        Ok(String::from_utf8_lossy(&buf[..bytes_read]).trim().to_string())
    }

    fn blocking_command(&self, command: &str) -> Result<()> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("VISA session lock poisoned"))?;
        session
            .write_all(format!("{}\n", command).as_bytes())
            .with_context(|| format!("Failed to write '{}' to '{}'", command, self.resource))?;
        Ok(())
    }
}

#[async_trait]
impl ScpiTransport for VisaTransport {
    async fn query(&self, command: &str) -> Result<String> {
        let transport = self.clone();
        let command = command.to_string();
        let timeout = self.timeout;
        let reply = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || transport.blocking_query(&command)),
        )
        .await
        .map_err(|_| anyhow!("VISA query timed out after {:?}", timeout))??;
        reply
    }

    async fn command(&self, command: &str) -> Result<()> {
        let transport = self.clone();
        let command = command.to_string();
        tokio::task::spawn_blocking(move || transport.blocking_command(&command)).await?
    }
}
