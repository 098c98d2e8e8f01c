//! Instrument drivers.
//!
//! Each driver owns a [`ScpiInstrument`](scpi::ScpiInstrument) for the shared
//! table-driven plumbing and exposes typed accessors for its parameters:
//! - `scpi`: generic get/set routines, identification, reset
//! - `e8267c`: Agilent E8267C signal generator
//! - `awg70000a`: Tektronix AWG70000-series arbitrary waveform generators

pub mod awg70000a;
pub mod e8267c;
pub mod scpi;

pub use awg70000a::{Awg70000A, AwgOptions, TektronixAwg70001B};
pub use e8267c::{AgilentE8267C, FrequencyMode};
pub use scpi::{Identity, ScpiInstrument};
