use alloc::string::String;
use enough::StopReason;

use crate::pixel::PixelFormat;

/// Errors from Pix/colormap construction and bitmap conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PixError {
    #[error("pixel format {0:?} is not supported")]
    UnsupportedPixelFormat(PixelFormat),

    #[error("indexed pixel format {0:?} has no palette")]
    MissingPalette(PixelFormat),

    #[error("unsupported pix depth: {0} bpp")]
    UnsupportedDepth(u32),

    #[error("invalid colormap depth {0}: must be 1, 2, 4, or 8 bpp")]
    InvalidDepth(u32),

    #[error("invalid level count {levels} for depth {depth}: must be between 2 and 2^depth")]
    InvalidLevels { depth: u32, levels: u32 },

    #[error("failed to add colormap entry {index}: palette exceeds {capacity} entries")]
    ColormapBuild { index: usize, capacity: usize },

    #[error("colormap depth {colormap} does not match pix depth {pix}")]
    ColormapDepthMismatch { colormap: u32, pix: u32 },

    #[error("failed to allocate {bytes} bytes of pixel storage")]
    AllocationFailure { bytes: usize },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("row stride {stride} is smaller than the {min} bytes one row needs")]
    InvalidStride { stride: usize, min: usize },

    #[error("bitmap is already locked")]
    AlreadyLocked,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl PixError {
    /// Whether a destination buffer had been allocated and was released
    /// before this error was returned.
    ///
    /// `false` means nothing was allocated at all.
    pub fn rolled_back(&self) -> bool {
        matches!(self, Self::ColormapBuild { .. } | Self::Cancelled(_))
    }
}

impl From<StopReason> for PixError {
    fn from(r: StopReason) -> Self {
        PixError::Cancelled(r)
    }
}
