//! Plain on/off status LED

use cadence_hal::OutputPin;

/// Single-color indicator LED on an active-high pin
pub struct StatusLed<P> {
    pin: P,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self { pin }
    }

    pub fn on(&mut self) {
        self.pin.set_high();
    }

    pub fn off(&mut self) {
        self.pin.set_low();
    }

    pub fn toggle(&mut self) {
        self.pin.toggle();
    }

    pub fn is_on(&self) -> bool {
        self.pin.is_set_high()
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
