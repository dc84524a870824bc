use core::fmt;

use crate::codec::{decode_rgba, encode_as_rgba};

/// An RGBA color as stored in colormaps and 32 bpp Pix words.
///
/// The packed form is `0xRRGGBBAA`: red in the most significant byte,
/// alpha in the least.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixColor {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl PixColor {
    pub const BLACK: PixColor = PixColor::new(0, 0, 0);
    pub const WHITE: PixColor = PixColor::new(255, 255, 255);

    /// Opaque color.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self::with_alpha(red, green, blue, 255)
    }

    pub const fn with_alpha(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Unpack a `0xRRGGBB__` word, ignoring the low byte and forcing alpha to 255.
    pub fn from_rgb(value: u32) -> Self {
        let (r, g, b, _) = decode_rgba(value);
        Self::new(r, g, b)
    }

    /// Unpack a `0xRRGGBBAA` word.
    pub fn from_rgba(value: u32) -> Self {
        let (r, g, b, a) = decode_rgba(value);
        Self::with_alpha(r, g, b, a)
    }

    pub fn to_rgba(self) -> u32 {
        encode_as_rgba(self.red, self.green, self.blue, self.alpha)
    }

    pub const fn red(self) -> u8 {
        self.red
    }

    pub const fn green(self) -> u8 {
        self.green
    }

    pub const fn blue(self) -> u8 {
        self.blue
    }

    pub const fn alpha(self) -> u8 {
        self.alpha
    }

    /// Same color with alpha forced to 255.
    pub const fn opaque(self) -> Self {
        Self::new(self.red, self.green, self.blue)
    }

    pub(crate) fn same_rgb(self, other: PixColor) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }

    /// Squared euclidean RGB distance.
    pub(crate) fn distance_sq(self, other: PixColor) -> u32 {
        let dr = i32::from(self.red) - i32::from(other.red);
        let dg = i32::from(self.green) - i32::from(other.green);
        let db = i32::from(self.blue) - i32::from(other.blue);
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Channel sum, used to rank entries from darkest to lightest.
    pub(crate) fn intensity(self) -> u32 {
        u32::from(self.red) + u32::from(self.green) + u32::from(self.blue)
    }
}

impl fmt::Display for PixColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

#[cfg(feature = "rgb")]
impl From<rgb::Rgba<u8>> for PixColor {
    fn from(px: rgb::Rgba<u8>) -> Self {
        Self::with_alpha(px.r, px.g, px.b, px.a)
    }
}

#[cfg(feature = "rgb")]
impl From<PixColor> for rgb::Rgba<u8> {
    fn from(c: PixColor) -> Self {
        rgb::Rgba {
            r: c.red,
            g: c.green,
            b: c.blue,
            a: c.alpha,
        }
    }
}
