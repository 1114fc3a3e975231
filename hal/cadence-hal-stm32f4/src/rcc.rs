//! Clock tree bring-up
//!
//! HSE crystal through the main PLL into SYSCLK. The HAL picks the PLL
//! dividers, bus prescalers and flash wait states; this module only checks
//! the requested frequencies and reports what the hardware actually runs at.

use stm32f4xx_hal::pac::RCC;
use stm32f4xx_hal::prelude::*;
use stm32f4xx_hal::rcc::Clocks;

/// Highest SYSCLK the F405 runs at
pub const MAX_SYSCLK_HZ: u32 = 168_000_000;

/// APB1 ceiling
pub const MAX_PCLK1_HZ: u32 = 42_000_000;

/// APB2 ceiling
pub const MAX_PCLK2_HZ: u32 = 84_000_000;

/// Crystal range the HSE oscillator accepts
pub const HSE_RANGE_HZ: core::ops::RangeInclusive<u32> = 4_000_000..=26_000_000;

/// Errors bringing up the clock tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Crystal outside the oscillator's range
    InvalidHse(u32),
    /// SYSCLK zero or above [`MAX_SYSCLK_HZ`]
    InvalidSysclk(u32),
    /// A bus clock above its ceiling or above SYSCLK
    InvalidBusClock(u32),
}

/// Requested clock frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// External crystal frequency (Hz)
    pub hse_hz: u32,
    /// Core clock, AHB undivided (Hz)
    pub sysclk_hz: u32,
    /// APB1 clock (Hz)
    pub pclk1_hz: u32,
    /// APB2 clock, feeds the ADC prescaler (Hz)
    pub pclk2_hz: u32,
}

impl ClockConfig {
    /// 12 MHz crystal to 168 MHz SYSCLK, 42 MHz APB1, 84 MHz APB2
    pub const HSE_12MHZ_168MHZ: ClockConfig = ClockConfig {
        hse_hz: 12_000_000,
        sysclk_hz: 168_000_000,
        pclk1_hz: 42_000_000,
        pclk2_hz: 84_000_000,
    };

    /// Check every frequency against the part's limits
    pub fn validate(&self) -> Result<(), ClockError> {
        if !HSE_RANGE_HZ.contains(&self.hse_hz) {
            return Err(ClockError::InvalidHse(self.hse_hz));
        }
        if self.sysclk_hz == 0 || self.sysclk_hz > MAX_SYSCLK_HZ {
            return Err(ClockError::InvalidSysclk(self.sysclk_hz));
        }
        for (bus, max) in [(self.pclk1_hz, MAX_PCLK1_HZ), (self.pclk2_hz, MAX_PCLK2_HZ)] {
            if bus == 0 || bus > max || bus > self.sysclk_hz {
                return Err(ClockError::InvalidBusClock(bus));
            }
        }
        Ok(())
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::HSE_12MHZ_168MHZ
    }
}

/// Bring the clock tree up and return the frozen frequencies
///
/// Must run once, before anything that depends on the core clock. The
/// returned [`Clocks`] carry what the PLL actually achieved, which can sit
/// below the request when the crystal does not divide evenly.
pub fn init(rcc: RCC, config: &ClockConfig) -> Result<Clocks, ClockError> {
    config.validate()?;

    let clocks = rcc
        .constrain()
        .cfgr
        .use_hse(config.hse_hz.Hz())
        .sysclk(config.sysclk_hz.Hz())
        .hclk(config.sysclk_hz.Hz())
        .pclk1(config.pclk1_hz.Hz())
        .pclk2(config.pclk2_hz.Hz())
        .require_pll48clk()
        .freeze();

    Ok(clocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_clock_tree() {
        let config = ClockConfig::default();
        assert_eq!(config.validate(), Ok(()));
        // ADC prescaler /4 keeps the converter under 36 MHz
        assert!(config.pclk2_hz / 4 <= 36_000_000);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let base = ClockConfig::HSE_12MHZ_168MHZ;

        let config = ClockConfig { hse_hz: 32_000_000, ..base };
        assert_eq!(config.validate(), Err(ClockError::InvalidHse(32_000_000)));

        let config = ClockConfig { sysclk_hz: 180_000_000, ..base };
        assert_eq!(config.validate(), Err(ClockError::InvalidSysclk(180_000_000)));

        let config = ClockConfig { pclk1_hz: 84_000_000, ..base };
        assert_eq!(config.validate(), Err(ClockError::InvalidBusClock(84_000_000)));

        let config = ClockConfig {
            sysclk_hz: 48_000_000,
            pclk2_hz: 84_000_000,
            ..base
        };
        assert_eq!(config.validate(), Err(ClockError::InvalidBusClock(84_000_000)));
    }
}
