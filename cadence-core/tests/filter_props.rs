//! Property tests for the boxcar filter and cycle goal arithmetic

use cadence_core::acquisition::{FilterBank, ScanFilter, NUM_CHANNELS, WINDOW_LEN};
use cadence_core::timer::CycleGoal;
use proptest::prelude::*;

fn passes() -> impl Strategy<Value = Vec<[u16; NUM_CHANNELS]>> {
    prop::collection::vec(prop::array::uniform5(0u16..=4095), 1..200)
}

proptest! {
    /// Accumulator always equals the sum of the last K inputs
    #[test]
    fn accumulator_is_window_sum(inputs in passes()) {
        let mut bank = ScanFilter::new();
        for (i, raw) in inputs.iter().enumerate() {
            bank.update(raw);

            let start = (i + 1).saturating_sub(WINDOW_LEN);
            for c in 0..NUM_CHANNELS {
                let sum: i32 = inputs[start..=i].iter().map(|p| p[c] as i32).sum();
                prop_assert_eq!(bank.accumulators()[c], sum);
            }
        }
    }

    /// Outputs are the window sum over K and stay inside the converter range
    #[test]
    fn output_is_decimated_sum(inputs in passes()) {
        let mut bank = ScanFilter::new();
        for raw in &inputs {
            let out = bank.update(raw);
            for c in 0..NUM_CHANNELS {
                prop_assert!(bank.accumulators()[c] >= 0);
                prop_assert_eq!(out[c] as i32, bank.accumulators()[c] >> 5);
                prop_assert!(out[c] <= 4095);
            }
        }
    }

    /// A constant input reads back exactly once the window has filled
    #[test]
    fn constant_input_converges(value in 0u16..=4095, extra in 0usize..64) {
        let mut bank = FilterBank::<1, WINDOW_LEN>::new();
        let mut out = [0];
        for _ in 0..WINDOW_LEN + extra {
            out = bank.update(&[value]);
        }
        prop_assert!(bank.is_primed());
        prop_assert_eq!(out[0], value);
    }

    /// A goal is reached from its own instant onward, across wraparound
    #[test]
    fn goal_reached_from_its_instant(goal in any::<u32>(), offset in 0u32..=i32::MAX as u32) {
        let goal = CycleGoal::new(goal);
        prop_assert!(goal.is_reached_at(goal.raw().wrapping_add(offset)));
    }

    /// A goal is not reached before its instant, across wraparound
    #[test]
    fn goal_not_reached_early(goal in any::<u32>(), early in 1u32..=i32::MAX as u32) {
        let goal = CycleGoal::new(goal);
        prop_assert!(!goal.is_reached_at(goal.raw().wrapping_sub(early)));
    }
}
