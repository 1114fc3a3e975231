//! Cadence Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the signal I/O core needs,
//! as traits that chip-specific HALs implement. The core never touches a
//! register directly; it only sees these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (cadence-firmware)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-core (timer, LED, acquisition) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cadence-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ cadence-hal-  │
//!             │   stm32f4     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Push-pull digital output
//! - [`cycle::CycleCounter`] - Free-running core clock cycle counter
//! - [`adc::ScanConverter`] - Multi-channel continuous-scan ADC
//! - [`dma::CircularDma`] - Circular peripheral-to-memory DMA stream

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod cycle;
pub mod dma;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{SampleTime, ScanConverter};
pub use cycle::CycleCounter;
pub use dma::CircularDma;
pub use gpio::OutputPin;
