//! Bitmap → Pix.

use enough::Stop;
use tracing::{debug, trace};

use crate::bitmap::{Bitmap, BitmapData};
use crate::codec;
use crate::color::PixColor;
use crate::colormap::PixColormap;
use crate::error::PixError;
use crate::limits::{Limits, check_limits};
use crate::pix::Pix;
use crate::pixel::SourceFormat;

pub(crate) fn bitmap_to_pix(
    bitmap: &Bitmap,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Pix, PixError> {
    // Nothing is allocated until the format, limits and lock all check out.
    let format = SourceFormat::try_from(bitmap.format())?;
    if format.is_indexed() && bitmap.palette().is_empty() {
        return Err(PixError::MissingPalette(bitmap.format()));
    }
    let (width, height) = (bitmap.width(), bitmap.height());
    let depth = format.pix_depth();
    let bytes = Pix::storage_bytes(width, height, depth)
        .ok_or(PixError::DimensionsTooLarge { width, height })?;
    check_limits(limits, width, height, bytes)?;
    let src = bitmap.lock_bits()?;

    debug!(width, height, ?format, depth, "importing bitmap");
    let mut pix = Pix::create(width, height, depth)?;
    pix.set_resolution(
        round_dpi(bitmap.horizontal_resolution()),
        round_dpi(bitmap.vertical_resolution()),
    );

    let result = fill(&mut pix, bitmap.palette(), format, &src, stop);
    drop(src);
    match result {
        Ok(()) => Ok(pix),
        Err(e) => {
            debug!(error = %e, "bitmap import failed, releasing pix");
            Err(e)
        }
    }
}

fn fill(
    pix: &mut Pix,
    palette: &[PixColor],
    format: SourceFormat,
    src: &BitmapData<'_>,
    stop: &dyn Stop,
) -> Result<(), PixError> {
    if format.is_indexed() {
        pix.set_colormap(copy_colormap(palette, pix.depth())?)?;
    }
    transfer(format, src, pix, stop)
}

/// Build a colormap holding `palette` in index order.
fn copy_colormap(palette: &[PixColor], depth: u32) -> Result<PixColormap, PixError> {
    let mut cmap = PixColormap::create(depth)?;
    for (index, &color) in palette.iter().enumerate() {
        if !cmap.add_color(color) {
            return Err(PixError::ColormapBuild {
                index,
                capacity: cmap.capacity(),
            });
        }
    }
    trace!(entries = cmap.count(), depth, "copied palette");
    Ok(cmap)
}

fn transfer(
    format: SourceFormat,
    src: &BitmapData<'_>,
    pix: &mut Pix,
    stop: &dyn Stop,
) -> Result<(), PixError> {
    let width = src.width() as usize;
    // Significant bits of the last 1 bpp byte; the rest is row padding.
    let tail_mask: u8 = match width % 8 {
        0 => 0xFF,
        bits => 0xFFu8 << (8 - bits),
    };
    for (row_idx, (line, out)) in src.rows().zip(pix.rows_mut()).enumerate() {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        match format {
            SourceFormat::Indexed1 => {
                // Both sides pack the leftmost pixel into the high bit, so
                // whole bytes carry over unchanged.
                let nbytes = width.div_ceil(8);
                for (x, &byte) in line[..nbytes].iter().enumerate() {
                    let byte = if x + 1 == nbytes { byte & tail_mask } else { byte };
                    codec::set_data_byte(out, x, u32::from(byte));
                }
            }
            SourceFormat::Indexed8 => {
                for (x, &index) in line[..width].iter().enumerate() {
                    codec::set_data_byte(out, x, u32::from(index));
                }
            }
            SourceFormat::Rgb24 => transfer_bgr(line, out, width, 3, false),
            SourceFormat::Rgb32 => transfer_bgr(line, out, width, 4, false),
            SourceFormat::Argb32 => transfer_bgr(line, out, width, 4, true),
        }
    }
    Ok(())
}

/// Pack B,G,R[,X|A] byte pixels into RGBA words.
///
/// Without `alpha` the fourth byte of a 4-byte pixel is padding.
fn transfer_bgr(line: &[u8], out: &mut [u32], width: usize, bpp: usize, alpha: bool) {
    for (x, px) in line.chunks_exact(bpp).take(width).enumerate() {
        let a = if alpha { px[3] } else { 255 };
        codec::set_data_four_bytes(out, x, codec::encode_as_rgba(px[2], px[1], px[0], a));
    }
}

/// Round a DPI value to the nearest integer; non-finite or negative becomes 0.
fn round_dpi(dpi: f32) -> u32 {
    if dpi.is_finite() && dpi > 0.0 {
        (dpi + 0.5) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn dpi_rounding() {
        assert_eq!(round_dpi(96.0), 96);
        assert_eq!(round_dpi(299.5), 300);
        assert_eq!(round_dpi(71.49), 71);
        assert_eq!(round_dpi(f32::NAN), 0);
        assert_eq!(round_dpi(-3.0), 0);
    }

    #[test]
    fn oversized_palette_fails_to_copy() {
        let palette = vec![PixColor::BLACK, PixColor::WHITE, PixColor::new(1, 1, 1)];
        assert!(matches!(
            copy_colormap(&palette, 1),
            Err(PixError::ColormapBuild { index: 2, capacity: 2 })
        ));
        let cmap = copy_colormap(&palette[..2], 1).unwrap();
        assert_eq!(cmap.colors(), &palette[..2]);
    }

    #[test]
    fn indexed1_clears_bits_past_width() {
        let raw = vec![0xFF, 0xFF, 0, 0, 0xA0, 0, 0, 0];
        let mut bmp = Bitmap::from_raw(3, 2, crate::PixelFormat::Indexed1, 4, raw).unwrap();
        bmp.set_palette(vec![PixColor::WHITE, PixColor::BLACK]);
        let pix = bitmap_to_pix(&bmp, None, &enough::Unstoppable).unwrap();
        assert_eq!(pix.data()[0], 0xE000_0000);
        assert_eq!(pix.data()[1], 0xA000_0000);

        let mut clean = Pix::create(3, 2, 1).unwrap();
        for x in 0..3 {
            clean.set_pixel(x, 0, 1).unwrap();
        }
        clean.set_pixel(0, 1, 1).unwrap();
        clean.set_pixel(2, 1, 1).unwrap();
        clean.set_resolution(pix.x_res(), pix.y_res());
        clean.set_colormap(copy_colormap(bmp.palette(), 1).unwrap()).unwrap();
        assert_eq!(pix, clean);
    }

    #[test]
    fn indexed_source_needs_a_palette() {
        let bmp = Bitmap::new(4, 4, crate::PixelFormat::Indexed8).unwrap();
        let err = bitmap_to_pix(&bmp, None, &enough::Unstoppable).unwrap_err();
        assert!(matches!(
            err,
            PixError::MissingPalette(crate::PixelFormat::Indexed8)
        ));
        assert!(!err.rolled_back());
        assert!(!bmp.is_locked());
    }

    #[test]
    fn rgb24_ignores_row_padding() {
        let mut bmp = Bitmap::with_stride(2, 1, crate::PixelFormat::Rgb24, 9).unwrap();
        bmp.set_pixel(0, 0, PixColor::new(10, 20, 30)).unwrap();
        bmp.set_pixel(1, 0, PixColor::new(40, 50, 60)).unwrap();
        let pix = bitmap_to_pix(&bmp, None, &enough::Unstoppable).unwrap();
        assert_eq!(pix.pixel(0, 0), Some(0x0A14_1EFF));
        assert_eq!(pix.pixel(1, 0), Some(0x2832_3CFF));
        assert_eq!((pix.x_res(), pix.y_res()), (96, 96));
        assert!(!bmp.is_locked());
    }
}
