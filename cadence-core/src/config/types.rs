//! Configuration type definitions

use cadence_hal::SampleTime;

use crate::acquisition::NUM_CHANNELS;
use crate::timer::ns_to_cycles;

/// Highest physical ADC input number accepted in a scan
pub const MAX_ADC_CHANNEL: u8 = 18;

/// Reference board core clock (HSE 12 MHz through the PLL)
pub const DEFAULT_SYSCLK_HZ: u32 = 168_000_000;

/// Reference board scan order: V_DIV, A2, A3, A4, A5
pub const DEFAULT_SCAN_CHANNELS: [u8; NUM_CHANNELS] = [3, 6, 7, 14, 15];

/// Names a single pulse of the color protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseKind {
    /// High phase of a '0' bit
    ZeroHigh,
    /// Low phase of a '0' bit
    ZeroLow,
    /// High phase of a '1' bit
    OneHigh,
    /// Low phase of a '1' bit
    OneLow,
    /// End-of-frame latch gap
    Reset,
}

/// Errors found while validating a board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Core clock frequency is zero
    ZeroClock,
    /// Pulse would be zero cycles long once overhead is removed
    PulseTooShort(PulseKind),
    /// Scan references an input the converter does not have
    InvalidChannel(u8),
    /// Scan converts the same input twice
    DuplicateChannel(u8),
}

/// Nominal one-wire color protocol timing
///
/// Bit pulse durations are shortened by `overhead_cycles` once converted,
/// which accounts for the instructions between a pin write and the start
/// of the following wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTimingConfig {
    /// '0' bit high time (ns)
    pub t0h_ns: u32,
    /// '0' bit low time (ns)
    pub t0l_ns: u32,
    /// '1' bit high time (ns)
    pub t1h_ns: u32,
    /// '1' bit low time (ns)
    pub t1l_ns: u32,
    /// Latch gap after the last bit (ns)
    pub reset_ns: u32,
    /// Code path cost subtracted from every bit pulse (cycles)
    pub overhead_cycles: u32,
}

impl Default for PulseTimingConfig {
    fn default() -> Self {
        Self {
            t0h_ns: 500,
            t0l_ns: 2000,
            t1h_ns: 1200,
            t1l_ns: 1300,
            reset_ns: 50_000,
            overhead_cycles: 20,
        }
    }
}

/// Analog scan configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanConfig {
    /// Physical input converted at each rank, in scan order
    pub channels: [u8; NUM_CHANNELS],
    /// Sample-and-hold time applied to every rank
    pub sample_time: SampleTime,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_SCAN_CHANNELS,
            sample_time: SampleTime::Cycles28,
        }
    }
}

impl ScanConfig {
    /// Check every input exists and appears once
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, &channel) in self.channels.iter().enumerate() {
            if channel > MAX_ADC_CHANNEL {
                return Err(ConfigError::InvalidChannel(channel));
            }
            if self.channels[..i].contains(&channel) {
                return Err(ConfigError::DuplicateChannel(channel));
            }
        }
        Ok(())
    }
}

/// Complete board description for the signal I/O core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Core clock the cycle counter runs at (Hz)
    pub sysclk_hz: u32,
    /// Color protocol timing
    pub timing: PulseTimingConfig,
    /// Analog scan
    pub scan: ScanConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            sysclk_hz: DEFAULT_SYSCLK_HZ,
            timing: PulseTimingConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Validate the whole configuration
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sysclk_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }

        let t = &self.timing;
        let pulses = [
            (t.t0h_ns, PulseKind::ZeroHigh),
            (t.t0l_ns, PulseKind::ZeroLow),
            (t.t1h_ns, PulseKind::OneHigh),
            (t.t1l_ns, PulseKind::OneLow),
        ];
        for (ns, kind) in pulses {
            if ns_to_cycles(ns, self.sysclk_hz) <= t.overhead_cycles {
                return Err(ConfigError::PulseTooShort(kind));
            }
        }
        if ns_to_cycles(t.reset_ns, self.sysclk_hz) == 0 {
            return Err(ConfigError::PulseTooShort(PulseKind::Reset));
        }

        self.scan.validate()
    }
}
