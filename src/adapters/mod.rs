//! Transport implementations for SCPI instruments.
//!
//! This module defines the [`ScpiTransport`] trait, the low-level I/O seam the
//! drivers talk through, together with its implementations: a mock transport
//! for tests and a VISA transport for real hardware (behind the
//! `instrument_visa` feature).

pub mod mock_adapter;
#[cfg(feature = "instrument_visa")]
pub mod visa_adapter;

pub use mock_adapter::MockTransport;
#[cfg(feature = "instrument_visa")]
pub use visa_adapter::VisaTransport;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for SCPI communication transports.
///
/// Abstracts the underlying communication mechanism (VISA, serial, TCP) to
/// enable protocol-agnostic SCPI operations. Implementations own line
/// termination, timeouts, and serialization across concurrent callers.
#[async_trait]
pub trait ScpiTransport: Send + Sync {
    /// Send a query command and return the response.
    async fn query(&self, command: &str) -> Result<String>;

    /// Send a command without expecting a response.
    async fn command(&self, command: &str) -> Result<()>;
}
