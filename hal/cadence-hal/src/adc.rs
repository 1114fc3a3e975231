//! Multi-channel scanning ADC abstraction
//!
//! Describes an ADC that converts an ordered list of channels ("ranks")
//! over and over without CPU involvement, raising a DMA request after
//! each conversion.

/// Per-channel sample-and-hold time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleTime {
    Cycles3,
    Cycles15,
    #[default]
    Cycles28,
    Cycles56,
    Cycles84,
    Cycles112,
    Cycles144,
    Cycles480,
}

impl SampleTime {
    /// Sampling duration in ADC clock cycles
    pub fn cycles(self) -> u16 {
        match self {
            SampleTime::Cycles3 => 3,
            SampleTime::Cycles15 => 15,
            SampleTime::Cycles28 => 28,
            SampleTime::Cycles56 => 56,
            SampleTime::Cycles84 => 84,
            SampleTime::Cycles112 => 112,
            SampleTime::Cycles144 => 144,
            SampleTime::Cycles480 => 480,
        }
    }

    /// Look up a sample time from its cycle count
    pub fn from_cycles(cycles: u16) -> Option<Self> {
        match cycles {
            3 => Some(SampleTime::Cycles3),
            15 => Some(SampleTime::Cycles15),
            28 => Some(SampleTime::Cycles28),
            56 => Some(SampleTime::Cycles56),
            84 => Some(SampleTime::Cycles84),
            112 => Some(SampleTime::Cycles112),
            144 => Some(SampleTime::Cycles144),
            480 => Some(SampleTime::Cycles480),
            _ => None,
        }
    }
}

/// Continuous-scan ADC
///
/// Configuration is split into steps so callers can report exactly which
/// one failed.
pub trait ScanConverter {
    /// Error type for configuration steps
    type Error;

    /// Configure scan + continuous mode over `ranks` conversions with a DMA
    /// request after each one
    fn configure_scan(&mut self, ranks: usize) -> Result<(), Self::Error>;

    /// Assign a physical input `channel` to sequence position `rank` (0-based)
    fn configure_rank(
        &mut self,
        rank: usize,
        channel: u8,
        sample_time: SampleTime,
    ) -> Result<(), Self::Error>;

    /// Bus address of the conversion result register, used as DMA source
    fn data_register(&self) -> u32;

    /// Power up and trigger the first conversion
    ///
    /// In continuous mode the converter keeps running from here on.
    fn start(&mut self);
}
