//! Writing finished composites to disk.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::frame::PixelBuffer;

/// Errors that can occur while writing composites.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to create output directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Record of one composite written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// SHA-256 of the pixel bytes, hex encoded
    pub digest: String,
}

/// SHA-256 of a buffer's pixel bytes, hex encoded.
pub fn digest(image: &PixelBuffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.data());
    hex::encode(hasher.finalize())
}

/// Writes composites as numbered raw files into one directory.
///
/// File names encode the kind, sequence number, size and format, e.g.
/// `mosaic_0003_640x480_Mono8.raw`, since raw files carry no header.
#[derive(Debug)]
pub struct RawWriter {
    dir: PathBuf,
    written: Vec<WrittenImage>,
}

impl RawWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: &Path) -> Result<Self, OutputError> {
        std::fs::create_dir_all(dir).map_err(|e| OutputError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one composite of the given kind (`mosaic`, `pair`, ...).
    pub fn write(
        &mut self,
        kind: &str,
        sequence: u64,
        image: &PixelBuffer,
    ) -> Result<WrittenImage, OutputError> {
        let name = format!(
            "{}_{:04}_{}x{}_{}.raw",
            kind,
            sequence,
            image.width(),
            image.height(),
            image.format()
        );
        let path = self.dir.join(name);
        std::fs::write(&path, image.data()).map_err(|e| OutputError::Write {
            path: path.clone(),
            source: e,
        })?;

        let record = WrittenImage {
            path,
            width: image.width(),
            height: image.height(),
            digest: digest(image),
        };
        log::info!(
            "Wrote {} ({} bytes, sha256 {})",
            record.path.display(),
            image.byte_size(),
            &record.digest[..16]
        );
        self.written.push(record.clone());
        Ok(record)
    }

    /// Everything written so far, in order.
    pub fn written(&self) -> &[WrittenImage] {
        &self.written
    }
}
