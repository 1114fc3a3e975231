//! Board-agnostic core logic for the signal I/O firmware
//!
//! This crate contains everything that does not touch registers directly:
//!
//! - Cycle timer (wraparound-safe goals and busy-waits on a free-running counter)
//! - One-wire color protocol transmitter and palette
//! - Acquisition pipeline (scan bring-up, boxcar filter, shared outputs)
//! - Busy-time accounting
//! - Configuration type definitions and validation
//!
//! Hardware is reached only through the traits in `cadence-hal`, so every
//! module here runs under `cargo test` on the host.

#![no_std]
#![deny(unsafe_code)]

pub mod acquisition;
pub mod config;
pub mod led;
pub mod load;
pub mod timer;

#[cfg(test)]
mod testing;

pub use acquisition::{Acquisition, AcquisitionError, InitStatus, InitStep, ScanReadings};
pub use config::{BoardConfig, ConfigError};
pub use led::{ColorTransmitter, PaletteColor, Rgb24, StatusLed};
pub use load::LoadMeter;
pub use timer::{CycleGoal, CycleTimer};
