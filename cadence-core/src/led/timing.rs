//! Pulse timing table
//!
//! Computed once from the measured core clock. Bit pulses are shortened by
//! the configured overhead; the latch gap is not, since nothing runs
//! between its start and the end of the transmit call.

use crate::config::PulseTimingConfig;
use crate::timer::ns_to_cycles;

use super::{Rgb24, FRAME_BITS};

/// Pulse durations in core clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming {
    /// '0' bit high time
    pub t0h: u32,
    /// '0' bit low time
    pub t0l: u32,
    /// '1' bit high time
    pub t1h: u32,
    /// '1' bit low time
    pub t1l: u32,
    /// Latch gap after the frame
    pub trst: u32,
}

impl PulseTiming {
    /// Table for the default protocol timing at `clock_hz`
    pub fn from_clock(clock_hz: u32) -> Self {
        Self::from_config(clock_hz, &PulseTimingConfig::default())
    }

    /// Table for `config` at `clock_hz`
    pub fn from_config(clock_hz: u32, config: &PulseTimingConfig) -> Self {
        let bit = |ns| ns_to_cycles(ns, clock_hz).saturating_sub(config.overhead_cycles);
        Self {
            t0h: bit(config.t0h_ns),
            t0l: bit(config.t0l_ns),
            t1h: bit(config.t1h_ns),
            t1l: bit(config.t1l_ns),
            trst: ns_to_cycles(config.reset_ns, clock_hz),
        }
    }

    /// High phase length for a bit value
    pub fn high_cycles(&self, bit: bool) -> u32 {
        if bit {
            self.t1h
        } else {
            self.t0h
        }
    }

    /// Low phase length for a bit value
    pub fn low_cycles(&self, bit: bool) -> u32 {
        if bit {
            self.t1l
        } else {
            self.t0l
        }
    }

    /// Nominal length of a full frame for `color`, latch gap included
    ///
    /// Saturates at `u32::MAX`.
    pub fn frame_cycles(&self, color: Rgb24) -> u32 {
        let ones = color.packed().count_ones() as u64;
        let zeros = FRAME_BITS as u64 - ones;
        let one = self.t1h as u64 + self.t1l as u64;
        let zero = self.t0h as u64 + self.t0l as u64;
        let total = ones * one + zeros * zero + self.trst as u64;
        total.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_at_168mhz() {
        let t = PulseTiming::from_clock(168_000_000);
        assert_eq!(t.t0h, 64);
        assert_eq!(t.t0l, 316);
        assert_eq!(t.t1h, 182);
        assert_eq!(t.t1l, 198);
        assert_eq!(t.trst, 8400);
    }

    #[test]
    fn test_overhead_saturates() {
        let t = PulseTiming::from_clock(16_000_000);
        // 500ns at 16 MHz is 8 cycles, below the overhead
        assert_eq!(t.t0h, 0);
        assert_eq!(t.trst, 800);
    }

    #[test]
    fn test_frame_cycles_closed_form() {
        let t = PulseTiming::from_clock(168_000_000);
        let zero_bit = t.t0h + t.t0l;
        let one_bit = t.t1h + t.t1l;

        assert_eq!(t.frame_cycles(Rgb24::new(0)), 24 * zero_bit + t.trst);
        assert_eq!(t.frame_cycles(Rgb24::new(0xFFFFFF)), 24 * one_bit + t.trst);
        assert_eq!(
            t.frame_cycles(Rgb24::new(0x010101)),
            3 * one_bit + 21 * zero_bit + t.trst
        );
    }

    #[test]
    fn test_frame_cycles_saturates() {
        let t = PulseTiming {
            t0h: u32::MAX / 2,
            t0l: u32::MAX / 2,
            t1h: u32::MAX,
            t1l: u32::MAX,
            trst: u32::MAX,
        };
        assert_eq!(t.frame_cycles(Rgb24::new(0x0000FF)), u32::MAX);
        assert_eq!(t.frame_cycles(Rgb24::new(0)), u32::MAX);
    }
}
