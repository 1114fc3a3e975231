//! Filtered output buffer
//!
//! Written only by the end-of-pass interrupt, read by the foreground
//! without locking. Each channel is its own atomic word, so a single read
//! never tears; a reader walking several channels may see some from the
//! current pass and some from the previous one.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use super::AcquisitionError;

/// Latest filtered value per channel plus warm-up state
pub struct FilteredReadings<const N: usize> {
    values: [AtomicU16; N],
    passes: AtomicU32,
    primed: AtomicBool,
}

impl<const N: usize> Default for FilteredReadings<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FilteredReadings<N> {
    /// All channels at zero, not primed
    pub const fn new() -> Self {
        Self {
            values: [const { AtomicU16::new(0) }; N],
            passes: AtomicU32::new(0),
            primed: AtomicBool::new(false),
        }
    }

    /// Number of channels
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Last filtered value for `channel`
    pub fn read(&self, channel: usize) -> Result<u16, AcquisitionError> {
        self.values
            .get(channel)
            .map(|v| v.load(Ordering::Relaxed))
            .ok_or(AcquisitionError::InvalidChannel(channel))
    }

    /// All channels, read one after another
    pub fn snapshot(&self) -> [u16; N] {
        let mut out = [0u16; N];
        for (dst, src) in out.iter_mut().zip(self.values.iter()) {
            *dst = src.load(Ordering::Relaxed);
        }
        out
    }

    /// Check if the filters have seen a full window
    ///
    /// Until then every reading is a partial average and reads low.
    pub fn is_primed(&self) -> bool {
        self.primed.load(Ordering::Acquire)
    }

    /// Scan passes filtered so far (saturating)
    pub fn passes(&self) -> u32 {
        self.passes.load(Ordering::Relaxed)
    }

    /// Store one pass worth of filtered values
    pub(crate) fn publish(&self, values: &[u16; N], passes: u32, primed: bool) {
        for (dst, &v) in self.values.iter().zip(values.iter()) {
            dst.store(v, Ordering::Relaxed);
        }
        self.passes.store(passes, Ordering::Relaxed);
        self.primed.store(primed, Ordering::Release);
    }

    /// Reset to the power-on state
    pub(crate) fn clear(&self) {
        self.publish(&[0; N], 0, false);
    }
}
