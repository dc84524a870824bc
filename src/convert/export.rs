//! Pix → Bitmap.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use tracing::debug;

use crate::bitmap::{Bitmap, BitmapDataMut};
use crate::codec;
use crate::color::PixColor;
use crate::error::PixError;
use crate::limits::{Limits, check_limits};
use crate::pix::{Pix, scale_to_u8};
use crate::pixel::PixelFormat;

/// Sample width of a Pix row read one pixel at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Packing {
    Dibit,
    Qbit,
    Byte,
    TwoBytes,
}

impl Packing {
    fn depth(self) -> u32 {
        match self {
            Self::Dibit => 2,
            Self::Qbit => 4,
            Self::Byte => 8,
            Self::TwoBytes => 16,
        }
    }

    fn get(self, line: &[u32], x: usize) -> u32 {
        match self {
            Self::Dibit => codec::get_data_dibit(line, x),
            Self::Qbit => codec::get_data_qbit(line, x),
            Self::Byte => codec::get_data_byte(line, x),
            Self::TwoBytes => codec::get_data_two_bytes(line, x),
        }
    }
}

/// Destination layout chosen from the Pix depth and colormap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// Packed 1 bpp indices, copied byte for byte.
    Indexed1,
    /// 2 or 4 bpp indices widened to nibbles.
    Indexed4 { packing: Packing },
    Indexed8,
    /// Uncolormapped samples rescaled to 8-bit gray.
    Gray { packing: Packing, alpha: bool },
    Rgba { alpha: bool },
}

impl Target {
    fn select(pix: &Pix, include_alpha: bool) -> Result<Self, PixError> {
        let mapped = pix.colormap().is_some();
        Ok(match (pix.depth(), mapped) {
            (1, _) => Self::Indexed1,
            (2, true) => Self::Indexed4 {
                packing: Packing::Dibit,
            },
            (4, true) => Self::Indexed4 {
                packing: Packing::Qbit,
            },
            (8, true) => Self::Indexed8,
            (2, false) => Self::gray(Packing::Dibit, include_alpha),
            (4, false) => Self::gray(Packing::Qbit, include_alpha),
            (8, false) => Self::gray(Packing::Byte, include_alpha),
            (16, false) => Self::gray(Packing::TwoBytes, include_alpha),
            (32, _) => Self::Rgba {
                alpha: include_alpha,
            },
            (depth, _) => return Err(PixError::UnsupportedDepth(depth)),
        })
    }

    fn gray(packing: Packing, alpha: bool) -> Self {
        Self::Gray { packing, alpha }
    }

    fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Indexed1 => PixelFormat::Indexed1,
            Self::Indexed4 { .. } => PixelFormat::Indexed4,
            Self::Indexed8 => PixelFormat::Indexed8,
            Self::Gray { alpha, .. } | Self::Rgba { alpha } => {
                if alpha {
                    PixelFormat::Argb32
                } else {
                    PixelFormat::Rgb32
                }
            }
        }
    }
}

pub(crate) fn pix_to_bitmap(
    pix: &Pix,
    include_alpha: bool,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Bitmap, PixError> {
    let target = Target::select(pix, include_alpha)?;
    let format = target.pixel_format();
    let (width, height) = (pix.width(), pix.height());
    let bytes = format
        .aligned_stride(width)
        .checked_mul(height as usize)
        .ok_or(PixError::DimensionsTooLarge { width, height })?;
    check_limits(limits, width, height, bytes)?;

    debug!(width, height, depth = pix.depth(), ?format, "exporting pix");
    let mut bmp = Bitmap::new(width, height, format)?;
    if pix.x_res() > 0 && pix.y_res() > 0 {
        bmp.set_resolution(pix.x_res() as f32, pix.y_res() as f32);
    }
    if format.is_indexed() {
        bmp.set_palette(palette_for(pix));
    }

    let result = {
        let mut dst = bmp.lock_bits_mut()?;
        transfer(target, pix, &mut dst, stop)
    };
    match result {
        Ok(()) => Ok(bmp),
        Err(e) => {
            debug!(error = %e, "pix export failed, releasing bitmap");
            Err(e)
        }
    }
}

/// Palette in colormap order. An uncolormapped 1 bpp Pix reads 0 as white.
fn palette_for(pix: &Pix) -> Vec<PixColor> {
    match pix.colormap() {
        Some(cmap) => cmap.colors().to_vec(),
        None => vec![PixColor::WHITE, PixColor::BLACK],
    }
}

fn transfer(
    target: Target,
    pix: &Pix,
    dst: &mut BitmapDataMut<'_>,
    stop: &dyn Stop,
) -> Result<(), PixError> {
    let width = pix.width() as usize;
    for (row_idx, (line, out)) in pix.rows().zip(dst.rows_mut()).enumerate() {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        match target {
            Target::Indexed1 => {
                for (x, byte) in out[..width.div_ceil(8)].iter_mut().enumerate() {
                    *byte = codec::get_data_byte(line, x) as u8;
                }
            }
            Target::Indexed4 { packing } => {
                for x in 0..width {
                    let index = packing.get(line, x) as u8;
                    let byte = &mut out[x / 2];
                    if x % 2 == 0 {
                        *byte = (*byte & 0x0f) | (index << 4);
                    } else {
                        *byte = (*byte & 0xf0) | (index & 0x0f);
                    }
                }
            }
            Target::Indexed8 => {
                for (x, index) in out[..width].iter_mut().enumerate() {
                    *index = codec::get_data_byte(line, x) as u8;
                }
            }
            Target::Gray { packing, .. } => {
                for (x, px) in out.chunks_exact_mut(4).take(width).enumerate() {
                    let g = scale_to_u8(packing.get(line, x), packing.depth());
                    px.copy_from_slice(&[g, g, g, 255]);
                }
            }
            Target::Rgba { alpha } => {
                for (x, px) in out.chunks_exact_mut(4).take(width).enumerate() {
                    let (r, g, b, a) = codec::decode_rgba(codec::get_data_four_bytes(line, x));
                    px.copy_from_slice(&[b, g, r, if alpha { a } else { 255 }]);
                }
            }
        }
    }
    Ok(())
}
