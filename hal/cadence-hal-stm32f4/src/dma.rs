//! DMA2 stream 0 in circular mode
//!
//! Stream 0 channel 0 carries the ADC1 request on the F405. The stream
//! copies one half-word per conversion into a static buffer and wraps at
//! the end of the buffer, flagging transfer-complete each time.

use core::sync::atomic::{compiler_fence, Ordering};

use cadence_hal::CircularDma;
use cortex_m::peripheral::NVIC;
use stm32f4xx_hal::pac::{Interrupt, DMA2};
use stm32f4xx_hal::rcc::{Enable, Reset};

use crate::wait_for;

/// Stream index within DMA2
const STREAM: usize = 0;

/// NVIC priority of the transfer-complete interrupt (upper 4 bits used)
pub const IRQ_PRIORITY: u8 = 6 << 4;

// DMA_SxCR
const CR_EN: u32 = 1 << 0;
const CR_TCIE: u32 = 1 << 4;
const CR_CIRC: u32 = 1 << 8;
const CR_MINC: u32 = 1 << 10;
const CR_PSIZE_16: u32 = 0b01 << 11;
const CR_MSIZE_16: u32 = 0b01 << 13;

// DMA_LISR / DMA_LIFCR, stream 0 bits
const TCIF0: u32 = 1 << 5;
const ALL_FLAGS0: u32 = 0x3D;

/// DMA configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Stream did not disable within the timeout
    StreamBusy,
    /// Buffer length is zero or above the 16-bit transfer counter
    InvalidLength(usize),
}

/// Control register value for a circular peripheral-to-memory half-word
/// stream on channel 0, low priority, with the stream still disabled
pub const fn circular_cr_bits() -> u32 {
    CR_MSIZE_16 | CR_PSIZE_16 | CR_MINC | CR_CIRC
}

/// DMA2 stream 0 driven as a [`CircularDma`] into an `N` sample buffer
pub struct Dma2Stream0<const N: usize> {
    dma: DMA2,
    buffer: &'static mut [u16; N],
}

impl<const N: usize> Dma2Stream0<N> {
    /// Clock the controller and take the destination buffer
    pub fn new(dma: DMA2, buffer: &'static mut [u16; N]) -> Self {
        // SAFETY: owning `dma` means no other stream is configured yet.
        unsafe {
            DMA2::enable_unchecked();
            DMA2::reset_unchecked();
        }
        Self { dma, buffer }
    }
}

impl<const N: usize> CircularDma for Dma2Stream0<N> {
    type Error = DmaError;

    fn len(&self) -> usize {
        N
    }

    fn configure_circular(&mut self, source: u32) -> Result<(), DmaError> {
        if N == 0 || N > u16::MAX as usize {
            return Err(DmaError::InvalidLength(N));
        }

        let memory = self.buffer.as_mut_ptr() as u32;
        let st = self.dma.st(STREAM);
        st.cr().modify(|r, w| unsafe { w.bits(r.bits() & !CR_EN) });
        if !wait_for(|| st.cr().read().bits() & CR_EN == 0) {
            return Err(DmaError::StreamBusy);
        }
        self.dma.lifcr().write(|w| unsafe { w.bits(ALL_FLAGS0) });

        st.par().write(|w| unsafe { w.bits(source) });
        st.m0ar().write(|w| unsafe { w.bits(memory) });
        st.ndtr().write(|w| unsafe { w.bits(N as u32) });
        // Direct mode, FIFO unused
        st.fcr().write(|w| unsafe { w.bits(0) });
        st.cr().write(|w| unsafe { w.bits(circular_cr_bits()) });
        Ok(())
    }

    fn enable_transfer_complete_interrupt(&mut self) {
        self.dma
            .st(STREAM)
            .cr()
            .modify(|r, w| unsafe { w.bits(r.bits() | CR_TCIE) });

        // SAFETY: the handler for this vector is installed by the firmware
        // before the stream starts, and only this stream raises it.
        unsafe {
            let mut core = cortex_m::Peripherals::steal();
            core.NVIC.set_priority(Interrupt::DMA2_STREAM0, IRQ_PRIORITY);
            NVIC::unmask(Interrupt::DMA2_STREAM0);
        }
    }

    fn start(&mut self) {
        compiler_fence(Ordering::SeqCst);
        self.dma
            .st(STREAM)
            .cr()
            .modify(|r, w| unsafe { w.bits(r.bits() | CR_EN) });
    }

    fn transfer_complete(&self) -> bool {
        self.dma.lisr().read().bits() & TCIF0 != 0
    }

    fn clear_transfer_complete(&mut self) {
        self.dma.lifcr().write(|w| unsafe { w.bits(TCIF0) });
    }

    fn read_pass(&self, out: &mut [u16]) {
        compiler_fence(Ordering::SeqCst);
        let src = self.buffer.as_ptr();
        for (i, slot) in out.iter_mut().take(N).enumerate() {
            // SAFETY: `i < N`, and the buffer is only ever written by the DMA
            // controller, so a volatile read sees the latest transfer.
            *slot = unsafe { core::ptr::read_volatile(src.add(i)) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_bits() {
        let cr = circular_cr_bits();
        assert_eq!(cr & CR_EN, 0);
        assert_eq!(cr & CR_TCIE, 0);
        // Peripheral-to-memory, channel 0, low priority, no double buffer
        assert_eq!(cr & (0b11 << 6), 0);
        assert_eq!(cr & (0b111 << 25), 0);
        assert_eq!(cr & (0b11 << 16), 0);
        assert_eq!(cr & (1 << 18), 0);
        assert_eq!(cr, 0x2D00);
    }
}
