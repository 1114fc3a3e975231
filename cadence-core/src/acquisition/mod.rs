//! Analog acquisition pipeline
//!
//! The converter scans a fixed list of channels forever; a circular DMA
//! stream drops each scan into a small buffer and raises an interrupt at
//! the end of every pass. The interrupt feeds a per-channel boxcar filter
//! and publishes one decimated value per channel.
//!
//! ```text
//!  ADC scan ──► DMA (circular) ──► end-of-pass IRQ ──► FilterBank ──► FilteredReadings
//!  (hardware)     (hardware)        on_scan_complete      (ISR)        (read by anyone)
//! ```

pub mod filter;
pub mod output;
pub mod pipeline;

pub use filter::FilterBank;
pub use output::FilteredReadings;
pub use pipeline::{Acquisition, InitStatus, InitStep};

/// Channels in one scan pass
pub const NUM_CHANNELS: usize = 5;

/// Boxcar window length in scan passes
pub const WINDOW_LEN: usize = 32;

/// Filter bank used by the scan pipeline
pub type ScanFilter = FilterBank<NUM_CHANNELS, WINDOW_LEN>;

/// Filtered outputs shared with the foreground
pub type ScanReadings = FilteredReadings<NUM_CHANNELS>;

/// Errors reading acquisition results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionError {
    /// Channel index past the end of the scan
    InvalidChannel(usize),
}
