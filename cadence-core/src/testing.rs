//! Mock hardware for unit tests

#![allow(unsafe_code)]

extern crate std;

use core::cell::Cell;

use cadence_hal::{CircularDma, CycleCounter, OutputPin, SampleTime, ScanConverter};
use heapless::Vec;

std::thread_local! {
    static MASK_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Host stand-in for interrupt masking
///
/// Counts critical section nesting on the current test thread, so mocks can
/// tell whether they are being driven from inside one.
struct TestCriticalSection;
critical_section::set_impl!(TestCriticalSection);

unsafe impl critical_section::Impl for TestCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        MASK_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Default::default()
    }

    unsafe fn release(_: critical_section::RawRestoreState) {
        MASK_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Check if the current thread is inside a critical section
pub(crate) fn interrupts_masked() -> bool {
    MASK_DEPTH.with(|depth| depth.get() > 0)
}

/// Cycle counter backed by a shared cell
///
/// Each read advances the cell by `step`, so busy-waits terminate.
pub(crate) struct SimCounter<'a> {
    clock: &'a Cell<u32>,
    step: u32,
    enabled: bool,
    enable_calls: u32,
    unmasked_reads: Option<&'a Cell<u32>>,
}

impl<'a> SimCounter<'a> {
    /// Counter that ticks once per read
    pub(crate) fn new(clock: &'a Cell<u32>) -> Self {
        Self {
            clock,
            step: 1,
            enabled: false,
            enable_calls: 0,
            unmasked_reads: None,
        }
    }

    /// Counter that only moves when the test sets the cell
    pub(crate) fn frozen(clock: &'a Cell<u32>) -> Self {
        Self::stepping(clock, 0)
    }

    /// Counter that advances by `step` per read
    pub(crate) fn stepping(clock: &'a Cell<u32>, step: u32) -> Self {
        Self {
            step,
            ..Self::new(clock)
        }
    }

    /// Count reads made outside any critical section into `reads`
    pub(crate) fn counting_unmasked(mut self, reads: &'a Cell<u32>) -> Self {
        self.unmasked_reads = Some(reads);
        self
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn enable_calls(&self) -> u32 {
        self.enable_calls
    }
}

impl CycleCounter for SimCounter<'_> {
    fn enable(&mut self) {
        self.enabled = true;
        self.enable_calls += 1;
    }

    fn now(&self) -> u32 {
        if let Some(reads) = self.unmasked_reads {
            if !interrupts_masked() {
                reads.set(reads.get() + 1);
            }
        }
        let now = self.clock.get();
        self.clock.set(now.wrapping_add(self.step));
        now
    }
}

/// Level change seen by a [`RecordingPin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub(crate) high: bool,
    pub(crate) at: u32,
    /// Written from inside a critical section
    pub(crate) masked: bool,
}

/// Output pin that timestamps every write against the shared clock
pub(crate) struct RecordingPin<'a> {
    clock: &'a Cell<u32>,
    high: bool,
    pub(crate) edges: Vec<Edge, 64>,
}

impl<'a> RecordingPin<'a> {
    pub(crate) fn new(clock: &'a Cell<u32>) -> Self {
        Self {
            clock,
            high: false,
            edges: Vec::new(),
        }
    }

    fn record(&mut self, high: bool) {
        self.high = high;
        let _ = self.edges.push(Edge {
            high,
            at: self.clock.get(),
            masked: interrupts_masked(),
        });
    }
}

impl OutputPin for RecordingPin<'_> {
    fn set_high(&mut self) {
        self.record(true);
    }

    fn set_low(&mut self) {
        self.record(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Configuration failure injected into [`MockAdc`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

/// Scan converter that records its configuration
pub(crate) struct MockAdc {
    pub(crate) fail_scan: bool,
    pub(crate) fail_rank: Option<usize>,
    pub(crate) ranks: [Option<(u8, SampleTime)>; 8],
    pub(crate) scan_len: usize,
    pub(crate) started: bool,
}

impl MockAdc {
    pub(crate) const DATA_REGISTER: u32 = 0x4001_204C;

    pub(crate) fn new() -> Self {
        Self {
            fail_scan: false,
            fail_rank: None,
            ranks: [None; 8],
            scan_len: 0,
            started: false,
        }
    }
}

impl ScanConverter for MockAdc {
    type Error = MockError;

    fn configure_scan(&mut self, ranks: usize) -> Result<(), MockError> {
        if self.fail_scan {
            return Err(MockError);
        }
        self.scan_len = ranks;
        Ok(())
    }

    fn configure_rank(
        &mut self,
        rank: usize,
        channel: u8,
        sample_time: SampleTime,
    ) -> Result<(), MockError> {
        if self.fail_rank == Some(rank) {
            return Err(MockError);
        }
        self.ranks[rank] = Some((channel, sample_time));
        Ok(())
    }

    fn data_register(&self) -> u32 {
        Self::DATA_REGISTER
    }

    fn start(&mut self) {
        self.started = true;
    }
}

/// DMA stream whose buffer the test writes directly
pub(crate) struct MockDma<const N: usize> {
    pub(crate) buffer: [u16; N],
    pub(crate) fail_configure: bool,
    pub(crate) source: Option<u32>,
    pub(crate) irq_enabled: bool,
    pub(crate) running: bool,
    pub(crate) complete: bool,
}

impl<const N: usize> MockDma<N> {
    pub(crate) fn new() -> Self {
        Self {
            buffer: [0; N],
            fail_configure: false,
            source: None,
            irq_enabled: false,
            running: false,
            complete: false,
        }
    }

    /// Simulate the hardware finishing a pass
    pub(crate) fn complete_pass(&mut self, samples: [u16; N]) {
        self.buffer = samples;
        self.complete = true;
    }
}

impl<const N: usize> CircularDma for MockDma<N> {
    type Error = MockError;

    fn len(&self) -> usize {
        N
    }

    fn configure_circular(&mut self, source: u32) -> Result<(), MockError> {
        if self.fail_configure {
            return Err(MockError);
        }
        self.source = Some(source);
        Ok(())
    }

    fn enable_transfer_complete_interrupt(&mut self) {
        self.irq_enabled = true;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn transfer_complete(&self) -> bool {
        self.complete
    }

    fn clear_transfer_complete(&mut self) {
        self.complete = false;
    }

    fn read_pass(&self, out: &mut [u16]) {
        let n = out.len().min(N);
        out[..n].copy_from_slice(&self.buffer[..n]);
    }
}
