//! Cycle timer
//!
//! Converts wall-clock durations into core clock cycles and spins on the
//! free-running cycle counter until a goal is reached. This is the only
//! time base the transmitter and load meter use.

use cadence_hal::CycleCounter;

/// Largest delta a goal may be set ahead of the counter
///
/// Goals are compared by signed difference, so anything past half the
/// counter period would read as already reached.
pub const MAX_GOAL_CYCLES: u32 = i32::MAX as u32;

/// A future counter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleGoal(u32);

impl CycleGoal {
    /// Goal at an absolute counter value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw counter value of the goal
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Check the goal against a counter reading
    ///
    /// Uses the signed distance between the two, which stays correct when
    /// the counter wraps once between setting the goal and reaching it.
    pub fn is_reached_at(self, now: u32) -> bool {
        (now.wrapping_sub(self.0) as i32) >= 0
    }
}

/// Convert a duration in nanoseconds to cycles, rounded to nearest
pub fn ns_to_cycles(ns: u32, clock_hz: u32) -> u32 {
    let cycles = (ns as u64 * clock_hz as u64 + 500_000_000) / 1_000_000_000;
    cycles.min(MAX_GOAL_CYCLES as u64) as u32
}

/// Cycle-counter based timer
#[derive(Debug, Clone, Copy)]
pub struct CycleTimer<C> {
    counter: C,
    clock_hz: u32,
}

impl<C: CycleCounter> CycleTimer<C> {
    /// Create a timer over `counter` running at `clock_hz`
    ///
    /// The counter is not started; call [`CycleTimer::enable`].
    pub fn new(counter: C, clock_hz: u32) -> Self {
        Self { counter, clock_hz }
    }

    /// Start the underlying counter (idempotent)
    pub fn enable(&mut self) {
        self.counter.enable();
    }

    /// Core clock frequency in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Current counter reading
    pub fn now(&self) -> u32 {
        self.counter.now()
    }

    /// Cycles elapsed since an earlier reading
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.counter.now().wrapping_sub(start)
    }

    /// Cycles in `ns` nanoseconds
    pub fn cycles_from_ns(&self, ns: u32) -> u32 {
        ns_to_cycles(ns, self.clock_hz)
    }

    /// Cycles in `ms` milliseconds, clamped to [`MAX_GOAL_CYCLES`]
    pub fn cycles_from_ms(&self, ms: u32) -> u32 {
        let cycles = ms as u64 * self.clock_hz as u64 / 1000;
        cycles.min(MAX_GOAL_CYCLES as u64) as u32
    }

    /// Cycles in `secs` seconds, clamped to [`MAX_GOAL_CYCLES`]
    pub fn cycles_from_secs(&self, secs: u32) -> u32 {
        let cycles = secs as u64 * self.clock_hz as u64;
        cycles.min(MAX_GOAL_CYCLES as u64) as u32
    }

    /// Goal `cycles` from now, clamped to [`MAX_GOAL_CYCLES`]
    pub fn goal_from_cycles(&self, cycles: u32) -> CycleGoal {
        let cycles = cycles.min(MAX_GOAL_CYCLES);
        CycleGoal(self.counter.now().wrapping_add(cycles))
    }

    /// Goal `ms` milliseconds from now
    pub fn goal_from_ms(&self, ms: u32) -> CycleGoal {
        self.goal_from_cycles(self.cycles_from_ms(ms))
    }

    /// Check if the counter has reached `goal`
    pub fn reached(&self, goal: CycleGoal) -> bool {
        goal.is_reached_at(self.counter.now())
    }

    /// Busy-wait for `cycles`, at most [`MAX_GOAL_CYCLES`]
    ///
    /// Never yields. Only intended for sub-millisecond waits and explicit
    /// blocking delays.
    pub fn sleep(&self, cycles: u32) {
        let goal = self.goal_from_cycles(cycles);
        while !self.reached(goal) {
            core::hint::spin_loop();
        }
    }

    /// Busy-wait for `ms` milliseconds
    pub fn delay_ms(&self, ms: u32) {
        let goal = self.goal_from_ms(ms);
        while !self.reached(goal) {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimCounter;
    use core::cell::Cell;

    const CLOCK_HZ: u32 = 168_000_000;

    #[test]
    fn test_goal_zero_reached_immediately() {
        let clock = Cell::new(1234);
        let timer = CycleTimer::new(SimCounter::new(&clock), CLOCK_HZ);

        let goal = timer.goal_from_cycles(0);
        assert!(timer.reached(goal));
    }

    #[test]
    fn test_not_reached_until_elapsed() {
        let clock = Cell::new(0);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), CLOCK_HZ);

        let goal = timer.goal_from_cycles(100);
        clock.set(99);
        assert!(!timer.reached(goal));
        clock.set(100);
        assert!(timer.reached(goal));
        clock.set(5_000);
        assert!(timer.reached(goal));
    }

    #[test]
    fn test_reached_across_wraparound() {
        let clock = Cell::new(u32::MAX - 5);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), CLOCK_HZ);

        let goal = timer.goal_from_cycles(10);
        assert_eq!(goal.raw(), 4);

        // A plain `now >= goal` would call this reached already
        assert!(!timer.reached(goal));
        clock.set(u32::MAX);
        assert!(!timer.reached(goal));
        clock.set(3);
        assert!(!timer.reached(goal));
        clock.set(4);
        assert!(timer.reached(goal));
        clock.set(1_000_000);
        assert!(timer.reached(goal));
    }

    #[test]
    fn test_sleep_waits_requested_cycles() {
        let clock = Cell::new(u32::MAX - 50);
        let timer = CycleTimer::new(SimCounter::new(&clock), CLOCK_HZ);

        let start = clock.get();
        timer.sleep(200);
        let elapsed = clock.get().wrapping_sub(start);
        assert!(elapsed >= 200);
        assert!(elapsed <= 202);
    }

    #[test]
    fn test_goal_capped_at_half_period() {
        let clock = Cell::new(0);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), CLOCK_HZ);

        let goal = timer.goal_from_cycles(3_000_000_000);
        assert_eq!(goal.raw(), MAX_GOAL_CYCLES);
        assert!(!timer.reached(goal));
        clock.set(MAX_GOAL_CYCLES - 1);
        assert!(!timer.reached(goal));
        clock.set(MAX_GOAL_CYCLES);
        assert!(timer.reached(goal));
    }

    #[test]
    fn test_long_sleep_runs_to_cap() {
        let clock = Cell::new(0);
        let timer = CycleTimer::new(SimCounter::stepping(&clock, 1 << 24), CLOCK_HZ);

        timer.sleep(3_000_000_000);
        let elapsed = clock.get();
        assert!(elapsed >= MAX_GOAL_CYCLES);
        assert!(elapsed <= MAX_GOAL_CYCLES + 2 * (1 << 24));
    }

    #[test]
    fn test_duration_conversion() {
        let clock = Cell::new(0);
        let timer = CycleTimer::new(SimCounter::new(&clock), CLOCK_HZ);

        assert_eq!(timer.cycles_from_ms(1), 168_000);
        assert_eq!(timer.cycles_from_ns(1200), 202);
        assert_eq!(timer.cycles_from_secs(2), 336_000_000);
        // 20s at 168 MHz is past half the counter period
        assert_eq!(timer.cycles_from_secs(20), MAX_GOAL_CYCLES);
    }

    #[test]
    fn test_goal_from_ms() {
        let clock = Cell::new(10);
        let timer = CycleTimer::new(SimCounter::frozen(&clock), 1_000_000);

        let goal = timer.goal_from_ms(5);
        assert_eq!(goal.raw(), 5_010);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let clock = Cell::new(0);
        let mut timer = CycleTimer::new(SimCounter::new(&clock), CLOCK_HZ);

        timer.enable();
        timer.enable();
        assert_eq!(timer.counter.enable_calls(), 2);
        assert!(timer.counter.is_enabled());
    }
}
