//! STM32F4-specific HAL for the Cadence firmware
//!
//! Implementations of the `cadence-hal` traits for the STM32F405:
//!
//! - [`dwt::DwtCounter`] - core cycle counter
//! - [`gpio::PushPullPin`] - erased push-pull output
//! - [`adc::Adc1Scan`] - ADC1 in continuous scan mode
//! - [`dma::Dma2Stream0`] - DMA2 stream 0, circular, ADC1 request
//! - [`rcc`] - 168 MHz clock tree bring-up from a 12 MHz crystal
//!
//! Clocks and pins go through `stm32f4xx-hal`. The HAL has no circular
//! scan-to-DMA mode that hands the buffer back per pass, so ADC1 and DMA2
//! are programmed through its PAC, with the bit positions named in each
//! module.
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod adc;
pub mod dma;
pub mod dwt;
pub mod gpio;
pub mod rcc;

pub use adc::{Adc1Scan, AdcError};
pub use dma::{Dma2Stream0, DmaError};
pub use dwt::DwtCounter;
pub use gpio::PushPullPin;
pub use rcc::{ClockConfig, ClockError};

/// Spin-loop iterations allowed while waiting on a hardware flag
pub(crate) const READY_TIMEOUT: u32 = 100_000;

/// Spin until `ready` returns true or the timeout runs out
pub(crate) fn wait_for(mut ready: impl FnMut() -> bool) -> bool {
    for _ in 0..READY_TIMEOUT {
        if ready() {
            return true;
        }
        core::hint::spin_loop();
    }
    false
}
