//! Circular DMA stream abstraction
//!
//! A stream that copies half-words from a fixed peripheral register into
//! a memory buffer it owns, wrapping back to the start of the buffer after
//! every pass and flagging transfer-complete each time it wraps.

/// Circular peripheral-to-memory DMA stream
///
/// The destination buffer belongs to the implementation. Software only
/// sees it through [`CircularDma::read_pass`], which must be called right
/// after a transfer-complete event to get a consistent pass.
pub trait CircularDma {
    /// Error type for configuration
    type Error;

    /// Number of half-words transferred per pass
    fn len(&self) -> usize;

    /// Check if the stream transfers nothing per pass
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind the stream to `source` (peripheral address), half-word wide,
    /// memory-incrementing, circular
    fn configure_circular(&mut self, source: u32) -> Result<(), Self::Error>;

    /// Enable the transfer-complete interrupt at the stream and the
    /// interrupt controller
    fn enable_transfer_complete_interrupt(&mut self);

    /// Enable the stream
    fn start(&mut self);

    /// Check the transfer-complete flag
    fn transfer_complete(&self) -> bool;

    /// Acknowledge the transfer-complete flag
    fn clear_transfer_complete(&mut self);

    /// Copy the destination buffer into `out`
    ///
    /// Copies `min(out.len(), self.len())` samples.
    fn read_pass(&self, out: &mut [u16]);
}
