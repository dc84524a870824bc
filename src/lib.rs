//! # leptopix
//!
//! Lossless conversion between row-padded bitmaps and word-packed Pix
//! rasters, the in-memory image form consumed by OCR and image-processing
//! engines.
//!
//! ## Representations
//!
//! - [`Bitmap`] — byte rows with arbitrary stride, B,G,R(,A) channel order,
//!   optional palette. Owned by the caller; raw rows are read and written
//!   through scoped lock guards.
//! - [`Pix`] — rows aligned to 32-bit words, samples packed MSB-first,
//!   optional [`PixColormap`] owned by the Pix.
//!
//! ## Supported conversions
//!
//! Import ([`bitmap_to_pix`]): 1 bpp indexed → 1 bpp, 8 bpp indexed → 8 bpp,
//! 24 bpp RGB / 32 bpp RGB / 32 bpp ARGB → 32 bpp RGBA words. Palettes are
//! copied in index order; pixel indices pass through unchanged.
//!
//! Export ([`pix_to_bitmap`]): colormapped 1/2/4/8 bpp → indexed bitmaps,
//! uncolormapped gray → 32 bpp, 32 bpp → RGB or ARGB.
//!
//! ## Non-Goals
//!
//! - Image file containers (PNG, TIFF, BMP files)
//! - Compression codecs
//! - OCR itself
//!
//! ## Usage
//!
//! ```
//! use leptopix::{Bitmap, PixColor, PixelFormat, Unstoppable, bitmap_to_pix, pix_to_bitmap};
//!
//! let mut bmp = Bitmap::new(2, 2, PixelFormat::Argb32)?;
//! bmp.set_pixel(1, 0, PixColor::with_alpha(10, 20, 30, 40))?;
//!
//! let pix = bitmap_to_pix(&bmp, Unstoppable)?;
//! assert_eq!(pix.depth(), 32);
//! assert_eq!(pix.pixel(1, 0), Some(0x0A14_1E28));
//!
//! let back = pix_to_bitmap(&pix, true, Unstoppable)?;
//! assert_eq!(back.get_pixel(1, 0), bmp.get_pixel(1, 0));
//! # Ok::<(), leptopix::PixError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bitmap;
pub mod codec;
mod color;
mod colormap;
mod convert;
mod error;
mod limits;
mod pix;
mod pixel;

// Re-exports
pub use bitmap::{Bitmap, BitmapData, BitmapDataMut, DEFAULT_DPI};
pub use color::PixColor;
pub use colormap::PixColormap;
pub use convert::{ExportRequest, ImportRequest, bitmap_to_pix, pix_to_bitmap};
pub use enough::{Stop, Unstoppable};
pub use error::PixError;
pub use limits::Limits;
pub use pix::Pix;
pub use pixel::{PixelFormat, SourceFormat};
