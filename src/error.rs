//! Error types for stitching and mosaic operations.

use crate::frame::PixelFormat;

/// Errors that can occur while stitching buffers or building a mosaic.
///
/// Every variant is recoverable: the failed call leaves the caller's
/// buffers and builder state as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StitchError {
    #[error("Incompatible pixel formats: {0}")]
    IncompatibleFormat(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Packed pixel format {0} is not supported for horizontal stitching")]
    UnsupportedFormat(PixelFormat),

    #[error("No mosaic available yet")]
    NoMosaicAvailable,

    #[error("Failed to allocate {bytes} bytes for stitched image")]
    AllocationFailed {
        /// Size of the requested result buffer
        bytes: usize,
    },
}

/// Category of a [`StitchError`], without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IncompatibleFormat,
    InvalidDimensions,
    UnsupportedFormat,
    NoMosaicAvailable,
    AllocationFailed,
}

impl StitchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StitchError::IncompatibleFormat(_) => ErrorKind::IncompatibleFormat,
            StitchError::InvalidDimensions(_) => ErrorKind::InvalidDimensions,
            StitchError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            StitchError::NoMosaicAvailable => ErrorKind::NoMosaicAvailable,
            StitchError::AllocationFailed { .. } => ErrorKind::AllocationFailed,
        }
    }
}
