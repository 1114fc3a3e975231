//! Free-running cycle counter abstraction

/// Width of the hardware counter in bits
///
/// All goal arithmetic wraps at this width.
pub const COUNTER_BITS: u32 = 32;

/// Hardware counter that increments once per core clock cycle
///
/// On Cortex-M this is the DWT `CYCCNT` register. The counter wraps
/// silently at [`COUNTER_BITS`]; consumers must compare readings with
/// wrapping arithmetic.
pub trait CycleCounter {
    /// Start the counter
    ///
    /// Calling this on an already running counter has no effect.
    fn enable(&mut self);

    /// Current counter value
    fn now(&self) -> u32;
}
