//! One-wire color transmitter
//!
//! Bit-bangs a 24-bit frame with the cycle timer measuring every pulse.
//! The bit loop runs with interrupts masked: a preemption in the middle of
//! a pulse stretches it, and the receiving device reads a stretched low
//! phase as a reset. The latch gap afterwards has no edges in it, so it
//! runs with interrupts enabled again.

use cadence_hal::{CycleCounter, OutputPin};

use crate::timer::CycleTimer;

use super::{PaletteColor, PulseTiming, Rgb24, FRAME_BITS};

/// First bit on the wire
const FRAME_MSB: u32 = 1 << (FRAME_BITS - 1);

/// Color LED driver
///
/// Stateless between calls: the line is low before and after every frame.
/// Must not be called from two execution contexts at once.
pub struct ColorTransmitter<P> {
    pin: P,
    timing: PulseTiming,
}

impl<P: OutputPin> ColorTransmitter<P> {
    /// Take the data pin, drive it low and compute the timing table for
    /// the default protocol timing at `clock_hz`
    pub fn init(pin: P, clock_hz: u32) -> Self {
        Self::new(pin, PulseTiming::from_clock(clock_hz))
    }

    /// Take the data pin with a precomputed timing table
    pub fn new(mut pin: P, timing: PulseTiming) -> Self {
        pin.set_low();
        Self { pin, timing }
    }

    /// Current timing table
    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    /// Replace the timing table after a clock change
    pub fn set_timing(&mut self, timing: PulseTiming) {
        self.timing = timing;
    }

    /// Send one frame and wait out the latch gap
    ///
    /// Blocks for [`PulseTiming::frame_cycles`] plus loop overhead.
    pub fn transmit<C: CycleCounter>(&mut self, timer: &CycleTimer<C>, color: Rgb24) {
        let timing = self.timing;
        let pin = &mut self.pin;
        let mut bits = color.packed();

        critical_section::with(|_| {
            for _ in 0..FRAME_BITS {
                pin.set_high();
                if bits & FRAME_MSB != 0 {
                    timer.sleep(timing.t1h);
                    pin.set_low();
                    timer.sleep(timing.t1l);
                } else {
                    timer.sleep(timing.t0h);
                    pin.set_low();
                    timer.sleep(timing.t0l);
                }
                bits <<= 1;
            }
        });

        timer.sleep(timing.trst);
    }

    /// Send a palette entry; `index` wraps modulo 8
    pub fn set_indexed<C: CycleCounter>(
        &mut self,
        timer: &CycleTimer<C>,
        index: u8,
    ) -> PaletteColor {
        let entry = PaletteColor::from_index(index);
        self.transmit(timer, entry.color());
        entry
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
