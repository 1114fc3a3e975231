//! Board description
//!
//! Constants generated by build.rs from board.toml, the [`board_pins!`]
//! macro that claims the board's GPIO lines, and the [`BoardConfig`] the
//! core validates at startup.

use cadence_core::config::{BoardConfig, PulseTimingConfig, ScanConfig};
use cadence_hal::SampleTime;
use cadence_hal_stm32f4::ClockConfig;

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

pub(crate) use board_pins;

/// Core configuration for a board running at `sysclk_hz`
pub fn config(sysclk_hz: u32) -> BoardConfig {
    BoardConfig {
        sysclk_hz,
        timing: PULSE_TIMING,
        scan: SCAN,
    }
}
