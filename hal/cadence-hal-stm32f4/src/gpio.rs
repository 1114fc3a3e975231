//! GPIO for STM32F4
//!
//! Pins come from the HAL already in push-pull output mode and are erased
//! here, so the core can hold them without port and pin in the type. The
//! HAL drives them through the set/reset register, which never races an
//! interrupt touching the same port.

use cadence_hal::OutputPin;
use stm32f4xx_hal::gpio::{ErasedPin, Output, Pin, PushPull, Speed};

/// Push-pull output pin at very high slew rate
pub struct PushPullPin {
    pin: ErasedPin<Output<PushPull>>,
}

impl PushPullPin {
    /// Take an output pin, drive it low and raise its slew rate
    pub fn new<const P: char, const N: u8>(mut pin: Pin<P, N, Output<PushPull>>) -> Self {
        pin.set_low();
        pin.set_speed(Speed::VeryHigh);
        Self { pin: pin.erase() }
    }
}

impl OutputPin for PushPullPin {
    #[inline(always)]
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    #[inline(always)]
    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
