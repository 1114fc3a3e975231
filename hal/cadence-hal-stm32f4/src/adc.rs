//! ADC1 continuous scan
//!
//! 12-bit, right aligned, software triggered once and then free running in
//! continuous scan mode. A DMA request follows every conversion and keeps
//! coming for as long as the converter runs.

use cadence_hal::{SampleTime, ScanConverter};
use stm32f4xx_hal::pac::{ADC1, ADC_COMMON};
use stm32f4xx_hal::rcc::{Enable, Reset};

/// Highest input multiplexer channel
pub const MAX_CHANNEL: u8 = 18;

/// Sequence length the regular group supports
pub const MAX_RANKS: usize = 16;

// ADC_CCR
const CCR_ADCPRE_SHIFT: u32 = 16;
const CCR_ADCPRE_MASK: u32 = 0b11 << CCR_ADCPRE_SHIFT;
/// PCLK2 / 4
const CCR_ADCPRE_DIV4: u32 = 0b01 << CCR_ADCPRE_SHIFT;

// ADC_CR1
const CR1_SCAN: u32 = 1 << 8;

// ADC_CR2
const CR2_ADON: u32 = 1 << 0;
const CR2_CONT: u32 = 1 << 1;
const CR2_DMA: u32 = 1 << 8;
const CR2_DDS: u32 = 1 << 9;
const CR2_EOCS: u32 = 1 << 10;
const CR2_SWSTART: u32 = 1 << 30;

// ADC_SQR1
const SQR1_L_SHIFT: u32 = 20;
const SQR1_L_MASK: u32 = 0b1111 << SQR1_L_SHIFT;

/// Spins after power-up before the first trigger (> 3 us at 168 MHz)
const STABILIZATION_SPINS: u32 = 1_000;

/// ADC configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Sequence length of zero or above [`MAX_RANKS`]
    InvalidScanLength(usize),
    /// Input channel above [`MAX_CHANNEL`]
    InvalidChannel(u8),
    /// Sequence position at or above [`MAX_RANKS`]
    InvalidRank(usize),
}

/// Register index (0 = SQR1, 1 = SQR2, 2 = SQR3) and bit offset of a rank
pub const fn sequence_slot(rank: usize) -> (usize, u32) {
    let offset = ((rank % 6) * 5) as u32;
    match rank {
        0..=5 => (2, offset),
        6..=11 => (1, offset),
        _ => (0, offset),
    }
}

/// Register index (0 = SMPR1, 1 = SMPR2) and bit offset of a channel's
/// sample time field
pub const fn sample_time_slot(channel: u8) -> (usize, u32) {
    if channel < 10 {
        (1, channel as u32 * 3)
    } else {
        (0, (channel as u32 - 10) * 3)
    }
}

/// SMPx field encoding
pub const fn sample_time_code(sample_time: SampleTime) -> u32 {
    match sample_time {
        SampleTime::Cycles3 => 0,
        SampleTime::Cycles15 => 1,
        SampleTime::Cycles28 => 2,
        SampleTime::Cycles56 => 3,
        SampleTime::Cycles84 => 4,
        SampleTime::Cycles112 => 5,
        SampleTime::Cycles144 => 6,
        SampleTime::Cycles480 => 7,
    }
}

/// ADC1 driven as a [`ScanConverter`]
///
/// Analog pins are the caller's job: put every external channel in the
/// sequence into analog mode before [`ScanConverter::start`].
pub struct Adc1Scan {
    adc: ADC1,
}

impl Adc1Scan {
    /// Clock the converter and set its prescaler; it stays powered down
    pub fn new(adc: ADC1, common: ADC_COMMON) -> Self {
        // SAFETY: single-bit writes to this peripheral's own RCC enable and
        // reset lines; owning `adc` means nothing else is using it.
        unsafe {
            ADC1::enable_unchecked();
            ADC1::reset_unchecked();
        }
        common
            .ccr()
            .modify(|r, w| unsafe { w.bits((r.bits() & !CCR_ADCPRE_MASK) | CCR_ADCPRE_DIV4) });
        Self { adc }
    }
}

impl ScanConverter for Adc1Scan {
    type Error = AdcError;

    fn configure_scan(&mut self, ranks: usize) -> Result<(), AdcError> {
        if ranks == 0 || ranks > MAX_RANKS {
            return Err(AdcError::InvalidScanLength(ranks));
        }

        let length = ((ranks as u32 - 1) << SQR1_L_SHIFT) & SQR1_L_MASK;

        // 12-bit, no injected group, no watchdog
        self.adc.cr1().write(|w| unsafe { w.bits(CR1_SCAN) });
        // Right aligned, external trigger off
        self.adc
            .cr2()
            .write(|w| unsafe { w.bits(CR2_CONT | CR2_DMA | CR2_DDS | CR2_EOCS) });
        self.adc
            .sqr1()
            .modify(|r, w| unsafe { w.bits((r.bits() & !SQR1_L_MASK) | length) });
        Ok(())
    }

    fn configure_rank(
        &mut self,
        rank: usize,
        channel: u8,
        sample_time: SampleTime,
    ) -> Result<(), AdcError> {
        if channel > MAX_CHANNEL {
            return Err(AdcError::InvalidChannel(channel));
        }
        if rank >= MAX_RANKS {
            return Err(AdcError::InvalidRank(rank));
        }

        let (sqr, offset) = sequence_slot(rank);
        let field = |bits: u32| (bits & !(0b1_1111 << offset)) | ((channel as u32) << offset);
        match sqr {
            0 => self.adc.sqr1().modify(|r, w| unsafe { w.bits(field(r.bits())) }),
            1 => self.adc.sqr2().modify(|r, w| unsafe { w.bits(field(r.bits())) }),
            _ => self.adc.sqr3().modify(|r, w| unsafe { w.bits(field(r.bits())) }),
        };

        let (smpr, offset) = sample_time_slot(channel);
        let code = sample_time_code(sample_time);
        let field = |bits: u32| (bits & !(0b111 << offset)) | (code << offset);
        match smpr {
            0 => self.adc.smpr1().modify(|r, w| unsafe { w.bits(field(r.bits())) }),
            _ => self.adc.smpr2().modify(|r, w| unsafe { w.bits(field(r.bits())) }),
        };

        Ok(())
    }

    fn data_register(&self) -> u32 {
        self.adc.dr().as_ptr() as u32
    }

    fn start(&mut self) {
        self.adc
            .cr2()
            .modify(|r, w| unsafe { w.bits(r.bits() | CR2_ADON) });
        for _ in 0..STABILIZATION_SPINS {
            core::hint::spin_loop();
        }
        self.adc
            .cr2()
            .modify(|r, w| unsafe { w.bits(r.bits() | CR2_SWSTART) });
    }
}
