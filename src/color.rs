// src/color.rs

//! Color types shared by the display bridge and the presenter.
//!
//! The embedded engine draws in 16-bit RGB565 (`Rgb565`). The bridge stores
//! every pixel as a fully opaque packed 32-bit value (`Argb8888`), which is
//! also the byte layout of the BGRA8 textures the presenter uploads on a
//! little-endian host.

/// A color as the embedded UI engine reports it: 5 bits red, 6 bits green,
/// 5 bits blue, packed into a `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const WHITE: Rgb565 = Rgb565::new(0xFF, 0xFF, 0xFF);
    pub const SILVER: Rgb565 = Rgb565::new(0xC0, 0xC0, 0xC0);
    pub const GRAY: Rgb565 = Rgb565::new(0x80, 0x80, 0x80);
    pub const BLACK: Rgb565 = Rgb565::new(0x00, 0x00, 0x00);
    pub const RED: Rgb565 = Rgb565::new(0xFF, 0x00, 0x00);
    pub const MAROON: Rgb565 = Rgb565::new(0x80, 0x00, 0x00);
    pub const LIME: Rgb565 = Rgb565::new(0x00, 0xFF, 0x00);
    pub const GREEN: Rgb565 = Rgb565::new(0x00, 0x80, 0x00);
    pub const BLUE: Rgb565 = Rgb565::new(0x00, 0x00, 0xFF);
    pub const NAVY: Rgb565 = Rgb565::new(0x00, 0x00, 0x80);
    pub const ORANGE: Rgb565 = Rgb565::new(0xFF, 0xA5, 0x00);

    /// Packs 8-bit channels, dropping the low bits each channel cannot hold.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb565((((r >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | ((b >> 3) as u16))
    }

    pub const fn red(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 5) & 0x3F) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Expands to an opaque 32-bit color. Channel extremes map exactly
    /// (0 -> 0x00, full -> 0xFF).
    pub const fn to_argb8888(self) -> Argb8888 {
        let r = ((self.red() as u32) * 263 + 7) >> 5;
        let g = ((self.green() as u32) * 259 + 3) >> 6;
        let b = ((self.blue() as u32) * 263 + 7) >> 5;
        Argb8888::from_rgb(r as u8, g as u8, b as u8)
    }
}

impl From<Rgb565> for Argb8888 {
    #[inline]
    fn from(color: Rgb565) -> Self {
        color.to_argb8888()
    }
}

/// A packed `0xAARRGGBB` color. Values produced by the bridge always carry
/// alpha `0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Argb8888(pub u32);

impl Argb8888 {
    /// The zero-initialized frame buffer value. This is the only non-opaque
    /// value a frame buffer ever holds, and only before the first write.
    pub const CLEAR: Argb8888 = Argb8888(0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Argb8888(0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Returns `(r, g, b)`.
    pub const fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_expand_exactly() {
        assert_eq!(Rgb565::BLACK.to_argb8888(), Argb8888(0xFF00_0000));
        assert_eq!(Rgb565::WHITE.to_argb8888(), Argb8888(0xFFFF_FFFF));
        assert_eq!(Rgb565::RED.to_argb8888().rgb(), (0xFF, 0x00, 0x00));
        assert_eq!(Rgb565::LIME.to_argb8888().rgb(), (0x00, 0xFF, 0x00));
        assert_eq!(Rgb565::BLUE.to_argb8888().rgb(), (0x00, 0x00, 0xFF));
    }

    #[test]
    fn converted_colors_are_opaque() {
        for raw in [0u16, 0x0001, 0x07E0, 0x8410, 0xF800, 0xFFFF] {
            assert!(Rgb565(raw).to_argb8888().is_opaque(), "0x{:04X}", raw);
        }
    }

    #[test]
    fn mid_gray_stays_close_to_source() {
        let (r, g, b) = Rgb565::GRAY.to_argb8888().rgb();
        assert!((0x7B..=0x84).contains(&r), "r = 0x{:02X}", r);
        assert!((0x7D..=0x82).contains(&g), "g = 0x{:02X}", g);
        assert!((0x7B..=0x84).contains(&b), "b = 0x{:02X}", b);
    }

    #[test]
    fn channel_accessors_unpack_fields() {
        let c = Rgb565(0b10101_110011_01101);
        assert_eq!(c.red(), 0b10101);
        assert_eq!(c.green(), 0b110011);
        assert_eq!(c.blue(), 0b01101);
    }
}
