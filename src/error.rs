//! Custom error types for the driver library.
//!
//! This module defines the primary error type, `DriverError`. Using the
//! `thiserror` crate, it provides a consistent way to report the failures this
//! library can produce on its own: parameter validation rejections, malformed
//! instrument replies, and command template errors. Transport failures are
//! propagated as `anyhow::Error` with context attached, so driver methods
//! return `anyhow::Result` and callers can downcast to `DriverError` when they
//! need to distinguish a validation failure from a communication problem.

use thiserror::Error;

/// Convenience alias for results using the library error type.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Errors produced by the driver library itself.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A numeric write was outside the parameter's declared range. Raised
    /// before any command is transmitted.
    #[error("parameter '{name}': value {value} outside allowed range [{min}, {max}]")]
    OutOfRange {
        /// Parameter that rejected the value.
        name: &'static str,
        /// The offending value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// An enumerated write used a token outside the parameter's declared set.
    /// Raised before any command is transmitted.
    #[error("parameter '{name}': '{value}' is not one of {allowed:?}")]
    InvalidChoice {
        /// Parameter that rejected the token.
        name: &'static str,
        /// The offending token.
        value: String,
        /// Tokens the parameter accepts.
        allowed: &'static [&'static str],
    },

    /// The instrument replied with something the driver could not parse.
    #[error("malformed reply to '{command}': '{reply}'")]
    InvalidReply {
        /// Query that produced the reply.
        command: String,
        /// The reply as received (trimmed).
        reply: String,
    },

    /// A set-command template could not be rendered.
    #[error("command template error: {0}")]
    CommandFormat(String),
}
