//! Frame sources feeding the stitching pipeline.
//!
//! Real capture hardware lives outside this crate. These sources stand in
//! for it: [`TestPattern`] synthesizes deterministic frames and
//! [`RawFileSource`] replays headerless raw frames from a directory.

use std::path::{Path, PathBuf};

use crate::error::StitchError;
use crate::frame::{PixelBuffer, PixelFormat};

/// File extension of raw frame files.
pub const RAW_EXTENSION: &str = "raw";

/// Largest single frame a source will produce (1 GiB).
pub const MAX_FRAME_BYTES: usize = 1 << 30;

/// Errors that can occur while producing frames.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Frame source needs a defined pixel format")]
    UndefinedFormat,

    #[error("Frame size must be non-zero, got {width}x{height}")]
    EmptyFrameSize { width: u32, height: u32 },

    #[error("Frame size {width}x{height} {format} exceeds the {limit} byte limit")]
    FrameTooLarge {
        width: u32,
        height: u32,
        format: PixelFormat,
        limit: usize,
    },

    #[error("Failed to allocate {bytes} bytes for a frame")]
    AllocationFailed { bytes: usize },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frame '{}': {source}", .path.display())]
    InvalidFrame {
        path: PathBuf,
        #[source]
        source: StitchError,
    },
}

/// Producer of frames, one at a time.
pub trait FrameSource {
    /// Get the next frame, or `None` when the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Synthetic source producing numbered frames.
///
/// Frame `n` has every byte set to `(n * 16 + offset % 16) % 256`, where
/// `offset` is the byte position, so tiles are distinguishable in a mosaic
/// and repeat runs are byte-identical.
#[derive(Debug, Clone)]
pub struct TestPattern {
    format: PixelFormat,
    width: u32,
    height: u32,
    /// Frames left to produce; `None` means unbounded
    remaining: Option<u64>,
    index: u64,
}

impl TestPattern {
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        frames: Option<u64>,
    ) -> Result<Self, SourceError> {
        validate_settings(format, width, height)?;
        Ok(Self {
            format,
            width,
            height,
            remaining: frames,
            index: 0,
        })
    }

    /// Build frame number `index` without advancing the source.
    ///
    /// # Errors
    /// * `SourceError::AllocationFailed` - If the frame buffer cannot be allocated
    pub fn frame(&self, index: u64) -> Result<PixelBuffer, SourceError> {
        let size = self.format.image_size(self.width, self.height).unwrap_or(0);
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| SourceError::AllocationFailed { bytes: size })?;

        let base = (index as u8).wrapping_mul(16);
        data.extend((0..size).map(|offset| base.wrapping_add((offset % 16) as u8)));
        Ok(PixelBuffer::from_raw(self.format, self.width, self.height, data))
    }
}

impl FrameSource for TestPattern {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, SourceError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        let frame = self.frame(self.index)?;
        self.index += 1;
        Ok(Some(frame))
    }

    fn describe(&self) -> String {
        format!(
            "test pattern {}x{} {}",
            self.width, self.height, self.format
        )
    }
}

/// Source that reads `*.raw` files from a directory in file-name order.
///
/// Each file must hold exactly one frame of the configured format and size.
#[derive(Debug, Clone)]
pub struct RawFileSource {
    dir: PathBuf,
    format: PixelFormat,
    width: u32,
    height: u32,
    files: std::vec::IntoIter<PathBuf>,
}

impl RawFileSource {
    /// Scan `dir` for raw frame files.
    ///
    /// # Errors
    /// * `SourceError::Io` - If the directory cannot be listed
    pub fn open(
        dir: &Path,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, SourceError> {
        validate_settings(format, width, height)?;

        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == RAW_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();

        log::info!("Found {} raw frame(s) in {}", files.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            format,
            width,
            height,
            files: files.into_iter(),
        })
    }

    /// Number of files not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for RawFileSource {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, SourceError> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };
        let data = std::fs::read(&path).map_err(|e| SourceError::Io {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        PixelBuffer::new(self.format, self.width, self.height, data)
            .map(Some)
            .map_err(|e| SourceError::InvalidFrame { path, source: e })
    }

    fn describe(&self) -> String {
        format!(
            "raw files in {} ({}x{} {})",
            self.dir.display(),
            self.width,
            self.height,
            self.format
        )
    }
}

fn validate_settings(format: PixelFormat, width: u32, height: u32) -> Result<(), SourceError> {
    if !format.is_defined() {
        return Err(SourceError::UndefinedFormat);
    }
    if width == 0 || height == 0 {
        return Err(SourceError::EmptyFrameSize { width, height });
    }
    match format.image_size(width, height) {
        Some(bytes) if bytes <= MAX_FRAME_BYTES => Ok(()),
        _ => Err(SourceError::FrameTooLarge {
            width,
            height,
            format,
            limit: MAX_FRAME_BYTES,
        }),
    }
}
