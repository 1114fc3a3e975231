//! Interrupt load measurement
//!
//! Tracks how many cycles a recurring piece of code spends active versus
//! the full period between its successive starts.

use cadence_hal::CycleCounter;

use crate::timer::CycleTimer;

/// One active/total measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadMeasurement {
    /// Cycles between `start` and `end` of the last run
    pub active_cycles: u32,
    /// Cycles between the last two `start` calls
    pub total_cycles: u32,
}

impl LoadMeasurement {
    /// Active share of the period in tenths of a percent
    ///
    /// Zero until two periods have been observed.
    pub fn permille(&self) -> u16 {
        if self.total_cycles == 0 {
            return 0;
        }
        let permille = self.active_cycles as u64 * 1000 / self.total_cycles as u64;
        permille.min(1000) as u16
    }
}

/// Active/total cycle meter
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadMeter {
    last_start: Option<u32>,
    measurement: LoadMeasurement,
}

impl LoadMeter {
    /// Create an idle meter
    pub const fn new() -> Self {
        Self {
            last_start: None,
            measurement: LoadMeasurement {
                active_cycles: 0,
                total_cycles: 0,
            },
        }
    }

    /// Mark the start of an active period
    pub fn start<C: CycleCounter>(&mut self, timer: &CycleTimer<C>) {
        let now = timer.now();
        if let Some(previous) = self.last_start {
            self.measurement.total_cycles = now.wrapping_sub(previous);
        }
        self.last_start = Some(now);
    }

    /// Mark the end of the active period
    pub fn end<C: CycleCounter>(&mut self, timer: &CycleTimer<C>) {
        if let Some(start) = self.last_start {
            self.measurement.active_cycles = timer.elapsed_since(start);
        }
    }

    /// Latest measurement
    pub fn measurement(&self) -> LoadMeasurement {
        self.measurement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimCounter;
    use core::cell::Cell;

    #[test]
    fn test_active_and_total() {
        let clock = Cell::new(1_000);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), 168_000_000);
        let mut meter = LoadMeter::new();

        meter.start(&timer);
        clock.set(1_050);
        meter.end(&timer);
        // First period: no total yet
        assert_eq!(meter.measurement().active_cycles, 50);
        assert_eq!(meter.measurement().total_cycles, 0);
        assert_eq!(meter.measurement().permille(), 0);

        clock.set(2_000);
        meter.start(&timer);
        clock.set(2_100);
        meter.end(&timer);

        let m = meter.measurement();
        assert_eq!(m.active_cycles, 100);
        assert_eq!(m.total_cycles, 1_000);
        assert_eq!(m.permille(), 100);
    }

    #[test]
    fn test_end_without_start() {
        let clock = Cell::new(7);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), 168_000_000);
        let mut meter = LoadMeter::new();

        meter.end(&timer);
        assert_eq!(meter.measurement(), LoadMeasurement::default());
    }

    #[test]
    fn test_measure_across_wrap() {
        let clock = Cell::new(u32::MAX - 9);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), 168_000_000);
        let mut meter = LoadMeter::new();

        meter.start(&timer);
        clock.set(10);
        meter.end(&timer);
        assert_eq!(meter.measurement().active_cycles, 20);
    }
}
