//! Instrument drivers for RF bench equipment.
//!
//! This library contains table-driven SCPI drivers for the Agilent E8267C
//! signal generator and the Tektronix AWG70000 series of arbitrary waveform
//! generators, the transport abstractions they talk through, and a scoped
//! guard that defers keyboard-interrupt delivery during critical sections.

pub mod adapters;
pub mod config;
pub mod error;
pub mod instrument;
#[cfg(unix)]
pub mod interrupt;
pub mod parameter;

pub use error::{DriverError, DriverResult};
