//! Packed color values and the preset palette

use smart_leds::RGB8;

/// 24-bit color in wire order
///
/// Green in bits 23..16, red in 15..8, blue in 7..0. Bits above 23 are
/// always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb24(u32);

impl Rgb24 {
    /// Mask of the valid color bits
    pub const MASK: u32 = 0x00FF_FFFF;

    /// Wrap a packed wire-order value, discarding bits above 23
    pub const fn new(packed: u32) -> Self {
        Self(packed & Self::MASK)
    }

    /// Build from channels in wire order
    pub const fn from_grb(g: u8, r: u8, b: u8) -> Self {
        Self(((g as u32) << 16) | ((r as u32) << 8) | b as u32)
    }

    /// Build from channels in conventional order
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_grb(g, r, b)
    }

    /// Packed wire-order value
    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl From<u32> for Rgb24 {
    fn from(packed: u32) -> Self {
        Self::new(packed)
    }
}

impl From<RGB8> for Rgb24 {
    fn from(c: RGB8) -> Self {
        Self::from_rgb(c.r, c.g, c.b)
    }
}

impl From<Rgb24> for RGB8 {
    fn from(c: Rgb24) -> Self {
        RGB8::new(c.red(), c.green(), c.blue())
    }
}

/// Preset colors, each lit channel at level 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PaletteColor {
    Black = 0,
    Blue = 1,
    Red = 2,
    Magenta = 3,
    Green = 4,
    Cyan = 5,
    Yellow = 6,
    White = 7,
}

impl PaletteColor {
    /// Palette in index order
    pub const ALL: [PaletteColor; 8] = [
        PaletteColor::Black,
        PaletteColor::Blue,
        PaletteColor::Red,
        PaletteColor::Magenta,
        PaletteColor::Green,
        PaletteColor::Cyan,
        PaletteColor::Yellow,
        PaletteColor::White,
    ];

    /// Look up a palette entry; the index wraps modulo 8
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index & 0x07) as usize]
    }

    /// Color transmitted for this entry
    pub const fn color(self) -> Rgb24 {
        match self {
            PaletteColor::Black => Rgb24::new(0x000000),
            PaletteColor::Blue => Rgb24::new(0x000001),
            PaletteColor::Red => Rgb24::new(0x000100),
            PaletteColor::Magenta => Rgb24::new(0x000101),
            PaletteColor::Green => Rgb24::new(0x010000),
            PaletteColor::Cyan => Rgb24::new(0x010001),
            PaletteColor::Yellow => Rgb24::new(0x010100),
            PaletteColor::White => Rgb24::new(0x010101),
        }
    }
}
