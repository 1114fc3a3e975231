//! Boxcar filter bank
//!
//! Exact sliding-window sum per channel: each pass subtracts the sample
//! leaving the window and adds the one entering it, so the accumulator is
//! always the integer sum of the last `K` inputs. Output is that sum
//! shifted down by `log2(K)`.
//!
//! All channels share one ring cursor, advanced once per pass, which keeps
//! their windows phase-aligned.

/// Moving-average filters for `N` channels over `K` passes
///
/// `K` must be a power of two.
#[derive(Debug, Clone)]
pub struct FilterBank<const N: usize, const K: usize> {
    accumulators: [i32; N],
    ring: [[u16; K]; N],
    cursor: usize,
    passes: u32,
}

impl<const N: usize, const K: usize> Default for FilterBank<N, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const K: usize> FilterBank<N, K> {
    /// Decimation shift, `log2(K)`
    pub const SHIFT: u32 = {
        assert!(K.is_power_of_two(), "window length must be a power of two");
        K.trailing_zeros()
    };

    /// Create a bank with every accumulator and ring slot at zero
    pub const fn new() -> Self {
        Self {
            accumulators: [0; N],
            ring: [[0; K]; N],
            cursor: 0,
            passes: 0,
        }
    }

    /// Clear all filter state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one scan pass and return the filtered value per channel
    pub fn update(&mut self, raw: &[u16; N]) -> [u16; N] {
        let mut filtered = [0u16; N];
        let cursor = self.cursor;

        for c in 0..N {
            let slot = &mut self.ring[c][cursor];
            self.accumulators[c] -= *slot as i32;
            self.accumulators[c] += raw[c] as i32;
            *slot = raw[c];
            filtered[c] = (self.accumulators[c] >> Self::SHIFT) as u16;
        }

        self.cursor = (cursor + 1) % K;
        self.passes = self.passes.saturating_add(1);
        filtered
    }

    /// Running sums, one per channel
    pub fn accumulators(&self) -> &[i32; N] {
        &self.accumulators
    }

    /// Ring slot the next pass will overwrite
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Passes fed since the last reset (saturating)
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Check if a full window of passes has been seen
    ///
    /// Before this the accumulators hold partial sums and the outputs read
    /// low.
    pub fn is_primed(&self) -> bool {
        self.passes >= K as u32
    }

    /// Window length in passes
    pub const fn window_len(&self) -> usize {
        K
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Bank = FilterBank<2, 32>;

    #[test]
    fn test_shift_matches_window() {
        assert_eq!(Bank::SHIFT, 5);
        assert_eq!(FilterBank::<1, 8>::SHIFT, 3);
        assert_eq!(FilterBank::<1, 1>::SHIFT, 0);
    }

    #[test]
    fn test_constant_input_converges_exactly() {
        let mut bank = Bank::new();
        let mut out = [0; 2];

        for pass in 0..32 {
            assert!(!bank.is_primed());
            out = bank.update(&[1000, 4095]);
            // Partial sum during warm-up
            assert_eq!(out[0], ((pass + 1) * 1000 / 32) as u16);
        }

        assert!(bank.is_primed());
        assert_eq!(out, [1000, 4095]);

        for _ in 0..100 {
            assert_eq!(bank.update(&[1000, 4095]), [1000, 4095]);
        }
        assert_eq!(bank.accumulators(), &[32_000, 32 * 4095]);
    }

    #[test]
    fn test_impulse_response_is_window_long() {
        let mut bank = Bank::new();

        let out = bank.update(&[3200, 0]);
        assert_eq!(out, [100, 0]);
        for _ in 1..32 {
            assert_eq!(bank.update(&[0, 0]), [100, 0]);
        }
        // Impulse leaves the window on pass 33
        assert_eq!(bank.update(&[0, 0]), [0, 0]);
        assert_eq!(bank.accumulators(), &[0, 0]);
    }

    #[test]
    fn test_cursor_shared_and_wraps() {
        let mut bank = Bank::new();
        for pass in 0..40 {
            assert_eq!(bank.cursor(), pass % 32);
            bank.update(&[1, 2]);
        }
        assert_eq!(bank.passes(), 40);
    }

    #[test]
    fn test_channels_independent() {
        let mut bank = Bank::new();
        for i in 0..64u16 {
            bank.update(&[i, 4095 - i]);
        }
        // Last 32 inputs: 32..=63 and 4095-63..=4095-32
        let sum0: i32 = (32..64).sum();
        let sum1: i32 = (32..64).map(|i| 4095 - i).sum();
        assert_eq!(bank.accumulators(), &[sum0, sum1]);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut bank = Bank::new();
        for _ in 0..40 {
            bank.update(&[500, 500]);
        }
        bank.reset();

        assert_eq!(bank.passes(), 0);
        assert_eq!(bank.cursor(), 0);
        assert_eq!(bank.accumulators(), &[0, 0]);
        assert_eq!(bank.update(&[0, 0]), [0, 0]);
    }
}
