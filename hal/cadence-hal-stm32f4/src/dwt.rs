//! DWT cycle counter

use cadence_hal::CycleCounter;
use cortex_m::peripheral::DWT;

/// The Cortex-M4 DWT `CYCCNT` register
///
/// Zero-sized: every copy reads the same hardware counter, so a timer built
/// on it can be shared between the main loop and interrupt handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DwtCounter;

impl DwtCounter {
    pub const fn new() -> Self {
        Self
    }
}

impl CycleCounter for DwtCounter {
    /// Turn on trace and start `CYCCNT`
    ///
    /// Idempotent; calling it again leaves a running counter running.
    fn enable(&mut self) {
        // SAFETY: only DCB.DEMCR.TRCENA and DWT.CTRL.CYCCNTENA are set, both
        // with read-modify-write. Nothing else in the firmware owns the DCB or
        // DWT.
        let mut core = unsafe { cortex_m::Peripherals::steal() };
        core.DCB.enable_trace();
        core.DWT.enable_cycle_counter();
    }

    #[inline(always)]
    fn now(&self) -> u32 {
        DWT::cycle_count()
    }
}
