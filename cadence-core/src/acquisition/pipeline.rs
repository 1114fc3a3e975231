//! Acquisition pipeline bring-up and end-of-pass handling

use cadence_hal::{CircularDma, ScanConverter};

use crate::config::ScanConfig;

use super::{AcquisitionError, ScanFilter, ScanReadings, NUM_CHANNELS};

/// One configuration step of [`Acquisition::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Converter scan/continuous/DMA-request setup
    Converter,
    /// Channel assignment for one rank (0-based)
    Rank(u8),
    /// DMA stream setup
    Dma,
}

impl InitStep {
    /// Every step, in execution order
    pub const ALL: [InitStep; NUM_CHANNELS + 2] = [
        InitStep::Converter,
        InitStep::Rank(0),
        InitStep::Rank(1),
        InitStep::Rank(2),
        InitStep::Rank(3),
        InitStep::Rank(4),
        InitStep::Dma,
    ];

    /// Bit this step sets in [`InitStatus`] when it fails
    pub const fn bit(self) -> u8 {
        match self {
            InitStep::Converter => 1 << 0,
            InitStep::Rank(rank) => 1 << (1 + rank),
            InitStep::Dma => 1 << (1 + NUM_CHANNELS as u8),
        }
    }
}

/// Bitmask of failed configuration steps
///
/// Zero means every step succeeded. A failed step does not stop the ones
/// after it, so the mask can carry several bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitStatus(u8);

impl InitStatus {
    /// Every step succeeded
    pub const OK: InitStatus = InitStatus(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Check if `step` failed
    pub const fn has_failed(self, step: InitStep) -> bool {
        self.0 & step.bit() != 0
    }

    /// Failed steps, in execution order
    pub fn failed_steps(self) -> impl Iterator<Item = InitStep> {
        InitStep::ALL
            .into_iter()
            .filter(move |step| self.has_failed(*step))
    }

    fn record(&mut self, step: InitStep) {
        self.0 |= step.bit();
    }
}

/// ADC + DMA + filter pipeline
///
/// Owns the converter and DMA stream, so only one pipeline can exist per
/// peripheral pair. The filtered outputs live outside it, in a
/// [`ScanReadings`] shared with whoever polls them.
pub struct Acquisition<'a, A, D> {
    adc: A,
    dma: D,
    scan: ScanConfig,
    filter: ScanFilter,
    raw: [u16; NUM_CHANNELS],
    output: &'a ScanReadings,
}

impl<'a, A: ScanConverter, D: CircularDma> Acquisition<'a, A, D> {
    /// Assemble the pipeline; nothing is touched until [`Acquisition::init`]
    pub fn new(adc: A, dma: D, scan: ScanConfig, output: &'a ScanReadings) -> Self {
        Self {
            adc,
            dma,
            scan,
            filter: ScanFilter::new(),
            raw: [0; NUM_CHANNELS],
            output,
        }
    }

    /// Configure the converter and DMA, clear all filter state and start
    /// scanning
    ///
    /// Every step runs even if an earlier one failed; the returned mask
    /// names each one that did. Acting on a failure is up to the caller.
    pub fn init(&mut self) -> InitStatus {
        let mut status = InitStatus::OK;

        self.filter.reset();
        self.raw = [0; NUM_CHANNELS];
        self.output.clear();

        if self.adc.configure_scan(NUM_CHANNELS).is_err() {
            status.record(InitStep::Converter);
        }

        for (rank, &channel) in self.scan.channels.iter().enumerate() {
            if self
                .adc
                .configure_rank(rank, channel, self.scan.sample_time)
                .is_err()
            {
                status.record(InitStep::Rank(rank as u8));
            }
        }

        let source = self.adc.data_register();
        if self.dma.len() != NUM_CHANNELS || self.dma.configure_circular(source).is_err() {
            status.record(InitStep::Dma);
        }

        self.dma.enable_transfer_complete_interrupt();
        self.dma.start();
        self.adc.start();

        status
    }

    /// End-of-pass interrupt body
    ///
    /// Returns false without touching anything if the transfer-complete
    /// flag was not set (spurious or shared vector).
    pub fn on_scan_complete(&mut self) -> bool {
        if !self.dma.transfer_complete() {
            return false;
        }
        self.dma.clear_transfer_complete();

        self.dma.read_pass(&mut self.raw);
        let filtered = self.filter.update(&self.raw);
        self.output
            .publish(&filtered, self.filter.passes(), self.filter.is_primed());

        true
    }

    /// Last filtered value for `channel`
    pub fn read(&self, channel: usize) -> Result<u16, AcquisitionError> {
        self.output.read(channel)
    }

    /// Filter state
    pub fn filter(&self) -> &ScanFilter {
        &self.filter
    }

    /// Shared outputs
    pub fn output(&self) -> &'a ScanReadings {
        self.output
    }

    /// Scan configuration in use
    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }
}
