use crate::error::PixError;

/// Pixel format of an external [`Bitmap`](crate::Bitmap).
///
/// Multi-byte direct formats store channels little-endian, blue first.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 1 bpp palette indices, 8 pixels per byte, leftmost pixel in the high bit.
    Indexed1,
    /// 4 bpp palette indices, 2 pixels per byte, leftmost pixel in the high nibble.
    Indexed4,
    /// 8 bpp palette indices.
    Indexed8,
    /// 16 bpp grayscale (little-endian).
    Gray16,
    /// 16 bpp, 5 bits per channel, top bit unused.
    Rgb555,
    /// 16 bpp, 5/6/5 bits.
    Rgb565,
    /// 16 bpp, 1 alpha bit and 5 bits per channel.
    Argb1555,
    /// 3 bytes: B, G, R.
    Rgb24,
    /// 4 bytes: B, G, R, X (4th byte is padding, not alpha).
    Rgb32,
    /// 4 bytes: B, G, R, A.
    Argb32,
}

impl PixelFormat {
    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            Self::Indexed1 => 1,
            Self::Indexed4 => 4,
            Self::Indexed8 => 8,
            Self::Gray16 | Self::Rgb555 | Self::Rgb565 | Self::Argb1555 => 16,
            Self::Rgb24 => 24,
            Self::Rgb32 | Self::Argb32 => 32,
        }
    }

    /// Whether pixel values are palette indices.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed1 | Self::Indexed4 | Self::Indexed8)
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Argb1555 | Self::Argb32)
    }

    /// Bytes needed to hold one row of `width` pixels, without padding.
    pub fn min_stride(&self, width: u32) -> usize {
        (u64::from(width) * u64::from(self.bits_per_pixel())).div_ceil(8) as usize
    }

    /// Row stride padded to a 4-byte boundary.
    pub fn aligned_stride(&self, width: u32) -> usize {
        self.min_stride(width).next_multiple_of(4)
    }
}

/// The bitmap formats that can be imported into a [`Pix`](crate::Pix).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Indexed1,
    Indexed8,
    Rgb24,
    Rgb32,
    Argb32,
}

impl SourceFormat {
    /// Depth of the Pix this format converts into.
    pub fn pix_depth(&self) -> u32 {
        match self {
            Self::Indexed1 => 1,
            Self::Indexed8 => 8,
            Self::Rgb24 | Self::Rgb32 | Self::Argb32 => 32,
        }
    }

    /// Bytes per source pixel for direct formats, `None` for packed indices.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            Self::Indexed1 => None,
            Self::Indexed8 => Some(1),
            Self::Rgb24 => Some(3),
            Self::Rgb32 | Self::Argb32 => Some(4),
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed1 | Self::Indexed8)
    }

    /// Whether the 4th byte of a pixel carries alpha.
    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Argb32)
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            Self::Indexed1 => PixelFormat::Indexed1,
            Self::Indexed8 => PixelFormat::Indexed8,
            Self::Rgb24 => PixelFormat::Rgb24,
            Self::Rgb32 => PixelFormat::Rgb32,
            Self::Argb32 => PixelFormat::Argb32,
        }
    }
}

impl TryFrom<PixelFormat> for SourceFormat {
    type Error = PixError;

    fn try_from(format: PixelFormat) -> Result<Self, PixError> {
        Ok(match format {
            PixelFormat::Indexed1 => Self::Indexed1,
            PixelFormat::Indexed8 => Self::Indexed8,
            PixelFormat::Rgb24 => Self::Rgb24,
            PixelFormat::Rgb32 => Self::Rgb32,
            PixelFormat::Argb32 => Self::Argb32,
            other => return Err(PixError::UnsupportedPixelFormat(other)),
        })
    }
}
