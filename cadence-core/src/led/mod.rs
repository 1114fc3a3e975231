//! Status LED and one-wire color LED
//!
//! The color LED speaks a self-clocked one-wire protocol: every bit is a
//! high pulse followed by a low pulse, and the ratio of the two encodes
//! '0' or '1'. A frame is 24 bits, most significant first, and the line
//! must then stay low long enough for the device to latch.

pub mod color;
pub mod status;
pub mod timing;
pub mod transmitter;

pub use color::{PaletteColor, Rgb24};
pub use status::StatusLed;
pub use timing::PulseTiming;
pub use transmitter::ColorTransmitter;

/// Bits per color frame
pub const FRAME_BITS: u32 = 24;
