//! Row-padded bitmaps owned by the caller.
//!
//! Raw row access goes through a lock guard ([`BitmapData`] or
//! [`BitmapDataMut`]). The guard releases the lock when dropped, so every
//! exit path of a conversion, including `?` returns, unlocks the bitmap.

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::codec;
use crate::color::PixColor;
use crate::error::PixError;
use crate::pix::scale_to_u8;
use crate::pixel::PixelFormat;

/// Resolution given to new bitmaps, in dots per inch.
pub const DEFAULT_DPI: f32 = 96.0;

/// An image with byte-aligned, optionally padded rows and an optional palette.
///
/// Rows are stored top to bottom, `stride` bytes apart.
#[derive(Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
    palette: Vec<PixColor>,
    horizontal_resolution: f32,
    vertical_resolution: f32,
    data: Vec<u8>,
    locked: AtomicBool,
}

impl Bitmap {
    /// Zero-filled bitmap with rows padded to a 4-byte boundary.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, PixError> {
        Self::with_stride(width, height, format, format.aligned_stride(width))
    }

    /// Zero-filled bitmap with an explicit row stride in bytes.
    pub fn with_stride(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, PixError> {
        let len = Self::validate(width, height, format, stride)?;
        Self::from_raw(width, height, format, stride, vec![0u8; len])
    }

    /// Wrap existing row data. `data` must hold at least `stride * height` bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, PixError> {
        let needed = Self::validate(width, height, format, stride)?;
        if data.len() < needed {
            return Err(PixError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            stride,
            palette: Vec::new(),
            horizontal_resolution: DEFAULT_DPI,
            vertical_resolution: DEFAULT_DPI,
            data,
            locked: AtomicBool::new(false),
        })
    }

    fn validate(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
    ) -> Result<usize, PixError> {
        if width == 0 || height == 0 {
            return Err(PixError::InvalidDimensions { width, height });
        }
        let min = format.min_stride(width);
        if stride < min {
            return Err(PixError::InvalidStride { stride, min });
        }
        stride
            .checked_mul(height as usize)
            .ok_or(PixError::DimensionsTooLarge { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn palette(&self) -> &[PixColor] {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Vec<PixColor>) {
        self.palette = palette;
    }

    pub fn horizontal_resolution(&self) -> f32 {
        self.horizontal_resolution
    }

    pub fn vertical_resolution(&self) -> f32 {
        self.vertical_resolution
    }

    pub fn set_resolution(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal_resolution = horizontal;
        self.vertical_resolution = vertical;
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Lock the rows for reading.
    pub fn lock_bits(&self) -> Result<BitmapData<'_>, PixError> {
        self.acquire()?;
        Ok(BitmapData { bitmap: self })
    }

    /// Lock the rows for writing.
    pub fn lock_bits_mut(&mut self) -> Result<BitmapDataMut<'_>, PixError> {
        self.acquire()?;
        Ok(BitmapDataMut { bitmap: self })
    }

    fn acquire(&self) -> Result<(), PixError> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| PixError::AlreadyLocked)
    }

    fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    fn pixel_bytes(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = y as usize * self.stride;
        let bits = self.format.bits_per_pixel() as usize;
        let start = row + x as usize * bits / 8;
        let len = bits.div_ceil(8);
        self.data.get(start..start + len)
    }

    /// Palette index at `(x, y)` for indexed formats.
    pub fn index(&self, x: u32, y: u32) -> Option<u8> {
        let byte = *self.pixel_bytes(x, y)?.first()?;
        match self.format {
            PixelFormat::Indexed1 => Some((byte >> (7 - (x & 7))) & 0x1),
            PixelFormat::Indexed4 => Some(if x & 1 == 0 { byte >> 4 } else { byte & 0xf }),
            PixelFormat::Indexed8 => Some(byte),
            _ => None,
        }
    }

    /// Write a palette index for indexed formats.
    pub fn set_index(&mut self, x: u32, y: u32, index: u8) -> Result<(), PixError> {
        let offset = self.checked_offset(x, y)?;
        let byte = &mut self.data[offset];
        match self.format {
            PixelFormat::Indexed1 => {
                let shift = 7 - (x & 7);
                *byte = (*byte & !(1u8 << shift)) | ((index & 0x1) << shift);
            }
            PixelFormat::Indexed4 => {
                if x & 1 == 0 {
                    *byte = (*byte & 0x0f) | ((index & 0xf) << 4);
                } else {
                    *byte = (*byte & 0xf0) | (index & 0xf);
                }
            }
            PixelFormat::Indexed8 => *byte = index,
            other => return Err(PixError::UnsupportedPixelFormat(other)),
        }
        Ok(())
    }

    /// Color at `(x, y)`, resolving palette indices and legacy 16-bit encodings.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<PixColor> {
        if self.format.is_indexed() {
            let index = self.index(x, y)?;
            return self.palette.get(usize::from(index)).copied();
        }
        let px = self.pixel_bytes(x, y)?;
        let word16 = || u16::from_le_bytes([px[0], px[1]]);
        Some(match self.format {
            PixelFormat::Gray16 => {
                let g = scale_to_u8(u32::from(word16()), 16);
                PixColor::new(g, g, g)
            }
            PixelFormat::Rgb555 => PixColor::from_rgba(codec::convert_rgb555_to_rgba(word16())),
            PixelFormat::Rgb565 => PixColor::from_rgba(codec::convert_rgb565_to_rgba(word16())),
            PixelFormat::Argb1555 => {
                PixColor::from_rgba(codec::convert_argb1555_to_rgba(word16()))
            }
            PixelFormat::Rgb24 | PixelFormat::Rgb32 => PixColor::new(px[2], px[1], px[0]),
            PixelFormat::Argb32 => PixColor::with_alpha(px[2], px[1], px[0], px[3]),
            PixelFormat::Indexed1 | PixelFormat::Indexed4 | PixelFormat::Indexed8 => {
                return None;
            }
        })
    }

    /// Write a color for 24/32 bpp direct formats.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: PixColor) -> Result<(), PixError> {
        let offset = self.checked_offset(x, y)?;
        let bgr = [color.blue(), color.green(), color.red()];
        match self.format {
            PixelFormat::Rgb24 => self.data[offset..offset + 3].copy_from_slice(&bgr),
            PixelFormat::Rgb32 | PixelFormat::Argb32 => {
                let a = if self.format.has_alpha() {
                    color.alpha()
                } else {
                    255
                };
                self.data[offset..offset + 4].copy_from_slice(&[bgr[0], bgr[1], bgr[2], a]);
            }
            other => return Err(PixError::UnsupportedPixelFormat(other)),
        }
        Ok(())
    }

    fn checked_offset(&self, x: u32, y: u32) -> Result<usize, PixError> {
        if x >= self.width || y >= self.height {
            return Err(PixError::IndexOutOfRange {
                index: y as usize * self.width as usize + x as usize,
                len: self.width as usize * self.height as usize,
            });
        }
        let bits = self.format.bits_per_pixel() as usize;
        Ok(y as usize * self.stride + x as usize * bits / 8)
    }

    /// 32 bpp ARGB bitmap holding a copy of `img`.
    #[cfg(feature = "imgref")]
    pub fn from_rgba_imgref(img: imgref::ImgRef<'_, rgb::Rgba<u8>>) -> Result<Self, PixError> {
        let mut bmp = Self::new(img.width() as u32, img.height() as u32, PixelFormat::Argb32)?;
        let stride = bmp.stride;
        for (row, out) in img.rows().zip(bmp.data.chunks_exact_mut(stride)) {
            for (px, dst) in row.iter().zip(out.chunks_exact_mut(4)) {
                dst.copy_from_slice(&[px.b, px.g, px.r, px.a]);
            }
        }
        Ok(bmp)
    }
}

/// Read lock on a bitmap's rows; unlocks on drop.
#[derive(Debug)]
pub struct BitmapData<'a> {
    bitmap: &'a Bitmap,
}

impl<'a> BitmapData<'a> {
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }

    pub fn format(&self) -> PixelFormat {
        self.bitmap.format
    }

    pub fn stride(&self) -> usize {
        self.bitmap.stride
    }

    /// Row `y` including its padding bytes.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.bitmap.height {
            return None;
        }
        let start = y as usize * self.bitmap.stride;
        self.bitmap.data.get(start..start + self.bitmap.stride)
    }

    /// Rows top to bottom, each `stride` bytes.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let bitmap: &'a Bitmap = self.bitmap;
        bitmap
            .data
            .chunks_exact(bitmap.stride)
            .take(bitmap.height as usize)
    }
}

impl Drop for BitmapData<'_> {
    fn drop(&mut self) {
        self.bitmap.release();
    }
}

/// Write lock on a bitmap's rows; unlocks on drop.
#[derive(Debug)]
pub struct BitmapDataMut<'a> {
    bitmap: &'a mut Bitmap,
}

impl BitmapDataMut<'_> {
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }

    pub fn format(&self) -> PixelFormat {
        self.bitmap.format
    }

    pub fn stride(&self) -> usize {
        self.bitmap.stride
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.bitmap.height {
            return None;
        }
        let start = y as usize * self.bitmap.stride;
        let stride = self.bitmap.stride;
        self.bitmap.data.get_mut(start..start + stride)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let height = self.bitmap.height as usize;
        let stride = self.bitmap.stride;
        self.bitmap.data.chunks_exact_mut(stride).take(height)
    }
}

impl Drop for BitmapDataMut<'_> {
    fn drop(&mut self) {
        self.bitmap.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_scoped() {
        let bmp = Bitmap::new(4, 2, PixelFormat::Rgb24).unwrap();
        {
            let data = bmp.lock_bits().unwrap();
            assert!(bmp.is_locked());
            assert!(matches!(bmp.lock_bits(), Err(PixError::AlreadyLocked)));
            assert_eq!(data.rows().count(), 2);
            assert_eq!(data.row(0).unwrap().len(), 12);
        }
        assert!(!bmp.is_locked());
        assert!(bmp.lock_bits().is_ok());
        assert!(!bmp.is_locked());
    }

    #[test]
    fn stride_must_fit_a_row() {
        assert!(matches!(
            Bitmap::with_stride(5, 1, PixelFormat::Rgb24, 14),
            Err(PixError::InvalidStride { stride: 14, min: 15 })
        ));
        let bmp = Bitmap::with_stride(5, 2, PixelFormat::Rgb24, 21).unwrap();
        assert_eq!(bmp.stride(), 21);
        assert!(matches!(
            Bitmap::from_raw(2, 2, PixelFormat::Indexed8, 4, vec![0; 7]),
            Err(PixError::BufferTooSmall { needed: 8, actual: 7 })
        ));
    }

    #[test]
    fn indexed_access() {
        let mut bmp = Bitmap::new(10, 1, PixelFormat::Indexed1).unwrap();
        bmp.set_palette(vec![PixColor::BLACK, PixColor::WHITE]);
        bmp.set_index(0, 0, 1).unwrap();
        bmp.set_index(9, 0, 1).unwrap();
        let data = bmp.lock_bits().unwrap();
        assert_eq!(&data.row(0).unwrap()[..2], &[0b1000_0000, 0b0100_0000]);
        drop(data);
        assert_eq!(bmp.get_pixel(9, 0), Some(PixColor::WHITE));
        assert_eq!(bmp.get_pixel(8, 0), Some(PixColor::BLACK));

        let mut nib = Bitmap::new(3, 1, PixelFormat::Indexed4).unwrap();
        nib.set_index(1, 0, 0xC).unwrap();
        nib.set_index(2, 0, 0x3).unwrap();
        assert_eq!(nib.index(0, 0), Some(0));
        assert_eq!(nib.index(1, 0), Some(0xC));
        assert_eq!(nib.index(2, 0), Some(0x3));
    }

    #[test]
    fn legacy_16bit_pixels() {
        let mut raw = vec![0u8; 4];
        raw[..2].copy_from_slice(&0x39ECu16.to_le_bytes());
        let bmp = Bitmap::from_raw(1, 1, PixelFormat::Rgb555, 4, raw.clone()).unwrap();
        assert_eq!(bmp.get_pixel(0, 0).unwrap().to_rgba(), 0x737B_63FF);
        let bmp = Bitmap::from_raw(1, 1, PixelFormat::Argb1555, 4, raw).unwrap();
        assert_eq!(bmp.get_pixel(0, 0).unwrap().to_rgba(), 0x737B_6300);
    }

    #[test]
    fn direct_pixels_are_bgr() {
        let mut bmp = Bitmap::new(2, 1, PixelFormat::Argb32).unwrap();
        bmp.set_pixel(1, 0, PixColor::with_alpha(1, 2, 3, 4)).unwrap();
        let data = bmp.lock_bits().unwrap();
        assert_eq!(data.row(0).unwrap(), &[0, 0, 0, 0, 3, 2, 1, 4]);
        drop(data);
        assert_eq!(bmp.get_pixel(1, 0), Some(PixColor::with_alpha(1, 2, 3, 4)));

        let mut opaque = Bitmap::new(1, 1, PixelFormat::Rgb32).unwrap();
        opaque.set_pixel(0, 0, PixColor::with_alpha(1, 2, 3, 4)).unwrap();
        assert_eq!(opaque.get_pixel(0, 0), Some(PixColor::new(1, 2, 3)));
        assert!(opaque.set_index(0, 0, 1).is_err());
    }
}
