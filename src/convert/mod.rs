//! Bitmap ⇄ Pix conversion.
//!
//! [`ImportRequest`] copies a [`Bitmap`] into a new [`Pix`]; [`ExportRequest`]
//! goes the other way. Both check the format and limits before allocating,
//! hold the bitmap lock only while rows are transferred, and drop any
//! partially built destination before an error is returned.

mod export;
mod import;

use enough::Stop;

use crate::bitmap::Bitmap;
use crate::error::PixError;
use crate::limits::Limits;
use crate::pix::Pix;

/// Builder for a Bitmap → Pix conversion.
#[derive(Clone, Debug)]
pub struct ImportRequest<'a> {
    bitmap: &'a Bitmap,
    limits: Option<&'a Limits>,
}

impl<'a> ImportRequest<'a> {
    pub fn new(bitmap: &'a Bitmap) -> Self {
        Self {
            bitmap,
            limits: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn convert(self, stop: impl Stop) -> Result<Pix, PixError> {
        import::bitmap_to_pix(self.bitmap, self.limits, &stop)
    }
}

/// Builder for a Pix → Bitmap conversion.
#[derive(Clone, Debug)]
pub struct ExportRequest<'a> {
    pix: &'a Pix,
    include_alpha: bool,
    limits: Option<&'a Limits>,
}

impl<'a> ExportRequest<'a> {
    pub fn new(pix: &'a Pix) -> Self {
        Self {
            pix,
            include_alpha: false,
            limits: None,
        }
    }

    /// Emit 32 bpp images as ARGB instead of RGB.
    pub fn with_alpha(mut self, include_alpha: bool) -> Self {
        self.include_alpha = include_alpha;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn convert(self, stop: impl Stop) -> Result<Bitmap, PixError> {
        export::pix_to_bitmap(self.pix, self.include_alpha, self.limits, &stop)
    }
}

/// Copy `bitmap` into a new Pix.
///
/// Indexed sources must carry a palette; an empty one is refused with
/// [`PixError::MissingPalette`] before anything is allocated.
pub fn bitmap_to_pix(bitmap: &Bitmap, stop: impl Stop) -> Result<Pix, PixError> {
    ImportRequest::new(bitmap).convert(stop)
}

/// Copy `pix` into a new Bitmap.
pub fn pix_to_bitmap(pix: &Pix, include_alpha: bool, stop: impl Stop) -> Result<Bitmap, PixError> {
    ExportRequest::new(pix).with_alpha(include_alpha).convert(stop)
}
