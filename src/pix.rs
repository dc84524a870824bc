//! Word-packed raster buffer.

use alloc::vec::Vec;

use crate::codec;
use crate::color::PixColor;
use crate::colormap::PixColormap;
use crate::error::PixError;

/// A row-major image stored as 32-bit words.
///
/// Each row spans [`words_per_line`](Self::words_per_line) words and starts
/// at word `row * words_per_line`. Samples are packed MSB-first within a
/// word (see [`crate::codec`]). An attached colormap is owned by the Pix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pix {
    width: u32,
    height: u32,
    depth: u32,
    x_res: u32,
    y_res: u32,
    wpl: usize,
    data: Vec<u32>,
    colormap: Option<PixColormap>,
}

impl Pix {
    /// Allocate a zero-filled Pix.
    ///
    /// `depth` must be one of 1, 2, 4, 8, 16 or 32.
    pub fn create(width: u32, height: u32, depth: u32) -> Result<Self, PixError> {
        if !matches!(depth, 1 | 2 | 4 | 8 | 16 | 32) {
            return Err(PixError::UnsupportedDepth(depth));
        }
        if width == 0 || height == 0 {
            return Err(PixError::InvalidDimensions { width, height });
        }
        let wpl = codec::words_per_line(width, depth);
        let words = wpl
            .checked_mul(height as usize)
            .ok_or(PixError::DimensionsTooLarge { width, height })?;
        let bytes = words
            .checked_mul(4)
            .ok_or(PixError::DimensionsTooLarge { width, height })?;
        let mut data = Vec::new();
        data.try_reserve_exact(words)
            .map_err(|_| PixError::AllocationFailure { bytes })?;
        data.resize(words, 0);
        Ok(Self {
            width,
            height,
            depth,
            x_res: 0,
            y_res: 0,
            wpl,
            data,
            colormap: None,
        })
    }

    /// Bytes of word storage a `width`x`height` Pix at `depth` would need.
    pub(crate) fn storage_bytes(width: u32, height: u32, depth: u32) -> Option<usize> {
        codec::words_per_line(width, depth)
            .checked_mul(height as usize)?
            .checked_mul(4)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Horizontal resolution in pixels per inch (0 if unknown).
    pub fn x_res(&self) -> u32 {
        self.x_res
    }

    /// Vertical resolution in pixels per inch (0 if unknown).
    pub fn y_res(&self) -> u32 {
        self.y_res
    }

    pub fn set_resolution(&mut self, x_res: u32, y_res: u32) {
        self.x_res = x_res;
        self.y_res = y_res;
    }

    pub fn words_per_line(&self) -> usize {
        self.wpl
    }

    /// All rows, `words_per_line * height` words.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn row(&self, y: u32) -> Option<&[u32]> {
        let start = codec::row_offset(self.wpl, self.height, y)?;
        self.data.get(start..start + self.wpl)
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u32]> {
        let start = codec::row_offset(self.wpl, self.height, y)?;
        self.data.get_mut(start..start + self.wpl)
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.data.chunks_exact(self.wpl)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u32]> {
        self.data.chunks_exact_mut(self.wpl)
    }

    /// Raw sample at `(x, y)`: a colormap index, gray value or RGBA word.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        codec::get_sample(self.row(y)?, self.depth, x as usize)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) -> Result<(), PixError> {
        let (width, height, depth) = (self.width, self.height, self.depth);
        if x >= width || y >= height {
            return Err(PixError::IndexOutOfRange {
                index: y as usize * width as usize + x as usize,
                len: width as usize * height as usize,
            });
        }
        let row = self
            .row_mut(y)
            .ok_or(PixError::IndexOutOfRange {
                index: y as usize,
                len: height as usize,
            })?;
        if codec::set_sample(row, depth, x as usize, value) {
            Ok(())
        } else {
            Err(PixError::UnsupportedDepth(depth))
        }
    }

    /// Color at `(x, y)`.
    ///
    /// Colormapped samples are looked up, 32 bpp words decoded directly,
    /// and everything else treated as gray scaled to 8 bits.
    pub fn color_at(&self, x: u32, y: u32) -> Option<PixColor> {
        let value = self.pixel(x, y)?;
        if let Some(cmap) = &self.colormap {
            return cmap.get(value as usize).ok();
        }
        if self.depth == 32 {
            return Some(PixColor::from_rgba(value));
        }
        let gray = scale_to_u8(value, self.depth);
        Some(PixColor::new(gray, gray, gray))
    }

    pub fn colormap(&self) -> Option<&PixColormap> {
        self.colormap.as_ref()
    }

    pub fn colormap_mut(&mut self) -> Option<&mut PixColormap> {
        self.colormap.as_mut()
    }

    /// Attach `cmap`, taking ownership and dropping any previous colormap.
    ///
    /// The colormap depth must equal the Pix depth. On mismatch the colormap
    /// is dropped and the Pix is left unchanged.
    pub fn set_colormap(&mut self, cmap: PixColormap) -> Result<(), PixError> {
        if cmap.depth() != self.depth {
            return Err(PixError::ColormapDepthMismatch {
                colormap: cmap.depth(),
                pix: self.depth,
            });
        }
        self.colormap = Some(cmap);
        Ok(())
    }

    /// Detach the colormap, handing ownership back to the caller.
    pub fn take_colormap(&mut self) -> Option<PixColormap> {
        self.colormap.take()
    }

    /// Typed RGBA copy of the image.
    #[cfg(feature = "imgref")]
    pub fn to_rgba_imgvec(&self) -> imgref::ImgVec<rgb::Rgba<u8>> {
        let mut pixels: Vec<rgb::Rgba<u8>> =
            Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.color_at(x, y).unwrap_or(PixColor::BLACK);
                pixels.push(c.into());
            }
        }
        imgref::ImgVec::new(pixels, self.width as usize, self.height as usize)
    }
}

/// Linearly rescale a `depth`-bit gray sample to 0..=255.
pub(crate) fn scale_to_u8(value: u32, depth: u32) -> u8 {
    let max = (1u64 << depth.min(32)) - 1;
    (u64::from(value) * 255 / max.max(1)) as u8
}
