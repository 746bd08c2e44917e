//! Pixel buffer types and data structures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StitchError;

/// Pixel layout tag of a buffer.
///
/// Unpacked formats store every pixel in whole bytes. Packed formats squeeze
/// several sub-byte pixels into shared bytes, so their rows cannot be sliced
/// on pixel boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// No format assigned (empty buffers)
    #[default]
    Undefined,
    Mono8,
    /// 10 significant bits in a 16-bit container
    Mono10,
    /// 12 significant bits in a 16-bit container
    Mono12,
    Mono16,
    /// GenICam packed 10-bit mono (4 pixels in 5 bytes)
    Mono10p,
    /// GenICam packed 12-bit mono (2 pixels in 3 bytes)
    Mono12p,
    /// Legacy packed 12-bit mono layout
    Mono12Packed,
    BayerRg8,
    BayerGb8,
    BayerGr8,
    BayerBg8,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    /// YUV 4:2:2, 8 bits per component (2 bytes per pixel on average)
    Yuv422,
}

impl PixelFormat {
    /// Every defined format, in listing order.
    pub const ALL: [PixelFormat; 16] = [
        PixelFormat::Mono8,
        PixelFormat::Mono10,
        PixelFormat::Mono12,
        PixelFormat::Mono16,
        PixelFormat::Mono10p,
        PixelFormat::Mono12p,
        PixelFormat::Mono12Packed,
        PixelFormat::BayerRg8,
        PixelFormat::BayerGb8,
        PixelFormat::BayerGr8,
        PixelFormat::BayerBg8,
        PixelFormat::Rgb8,
        PixelFormat::Bgr8,
        PixelFormat::Rgba8,
        PixelFormat::Bgra8,
        PixelFormat::Yuv422,
    ];

    /// Storage bits per pixel (0 for `Undefined`).
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Undefined => 0,
            PixelFormat::Mono8
            | PixelFormat::BayerRg8
            | PixelFormat::BayerGb8
            | PixelFormat::BayerGr8
            | PixelFormat::BayerBg8 => 8,
            PixelFormat::Mono10p => 10,
            PixelFormat::Mono12p | PixelFormat::Mono12Packed => 12,
            PixelFormat::Mono10 | PixelFormat::Mono12 | PixelFormat::Mono16 | PixelFormat::Yuv422 => {
                16
            }
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 24,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 32,
        }
    }

    /// Get the number of whole bytes per pixel.
    ///
    /// Only meaningful for unpacked formats.
    pub fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }

    /// Whether pixels share bytes with their neighbours.
    pub fn is_packed(self) -> bool {
        matches!(
            self,
            PixelFormat::Mono10p | PixelFormat::Mono12p | PixelFormat::Mono12Packed
        )
    }

    pub fn is_defined(self) -> bool {
        self != PixelFormat::Undefined
    }

    /// Number of bytes an image of this format and size occupies.
    ///
    /// Returns `None` for `Undefined` or when the size overflows `usize`.
    pub fn image_size(self, width: u32, height: u32) -> Option<usize> {
        if !self.is_defined() {
            return None;
        }
        let bits = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bits_per_pixel() as usize)?;
        Some(bits.div_ceil(8))
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Undefined => "Undefined",
            PixelFormat::Mono8 => "Mono8",
            PixelFormat::Mono10 => "Mono10",
            PixelFormat::Mono12 => "Mono12",
            PixelFormat::Mono16 => "Mono16",
            PixelFormat::Mono10p => "Mono10p",
            PixelFormat::Mono12p => "Mono12p",
            PixelFormat::Mono12Packed => "Mono12Packed",
            PixelFormat::BayerRg8 => "BayerRG8",
            PixelFormat::BayerGb8 => "BayerGB8",
            PixelFormat::BayerGr8 => "BayerGR8",
            PixelFormat::BayerBg8 => "BayerBG8",
            PixelFormat::Rgb8 => "RGB8",
            PixelFormat::Bgr8 => "BGR8",
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Bgra8 => "BGRA8",
            PixelFormat::Yuv422 => "YUV422_8",
        };
        f.write_str(name)
    }
}

/// A rectangular raw image with owned bytes.
///
/// A buffer with zero width or height is "absent": it carries no meaningful
/// data and defers to the other operand during stitching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    format: PixelFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer, checking that `data` matches the declared size.
    ///
    /// The length check is skipped for `PixelFormat::Undefined`, whose pixel
    /// size is unknown.
    ///
    /// # Errors
    /// * `StitchError::InvalidDimensions` - If `data.len()` disagrees with
    ///   `width * height` for the given format
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, StitchError> {
        if let Some(expected) = format.image_size(width, height) {
            if data.len() != expected {
                return Err(StitchError::InvalidDimensions(format!(
                    "{}x{} {} image needs {} bytes, got {}",
                    width,
                    height,
                    format,
                    expected,
                    data.len()
                )));
            }
        }
        Ok(Self::from_raw(format, width, height, data))
    }

    /// Create an empty (absent) buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a buffer whose size has already been established by the caller.
    pub(crate) fn from_raw(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            format,
            width,
            height,
            data,
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total size of the pixel data in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// True when the buffer has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the number of bytes per pixel of this buffer's format.
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Bytes in one row of an unpacked buffer.
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Borrow row `y`, or `None` when the data is too short to hold it.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let stride = self.row_stride();
        let start = (y as usize).checked_mul(stride)?;
        self.data.get(start..start.checked_add(stride)?)
    }
}

impl fmt::Display for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({} bytes)",
            self.width,
            self.height,
            self.format,
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Mono8.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::Mono12.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Bgra8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Undefined.bytes_per_pixel(), 0);
    }

    #[test]
    fn test_packed_formats() {
        assert!(PixelFormat::Mono10p.is_packed());
        assert!(PixelFormat::Mono12p.is_packed());
        assert!(PixelFormat::Mono12Packed.is_packed());
        assert!(!PixelFormat::Mono12.is_packed());
        assert!(!PixelFormat::Rgb8.is_packed());
        assert!(!PixelFormat::Undefined.is_packed());
    }

    #[test]
    fn test_image_size_rounds_up_packed() {
        // 3 pixels * 12 bits = 36 bits -> 5 bytes
        assert_eq!(PixelFormat::Mono12p.image_size(3, 1), Some(5));
        assert_eq!(PixelFormat::Rgb8.image_size(2, 2), Some(12));
        assert_eq!(PixelFormat::Undefined.image_size(2, 2), None);
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = PixelBuffer::new(PixelFormat::Mono8, 2, 2, vec![0; 3]);
        assert!(matches!(result, Err(StitchError::InvalidDimensions(_))));
    }

    #[test]
    fn test_new_undefined_skips_length_check() {
        let buffer = PixelBuffer::new(PixelFormat::Undefined, 4, 4, vec![]).unwrap();
        assert_eq!(buffer.byte_size(), 0);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PixelBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.format(), PixelFormat::Undefined);
        assert_eq!(buffer.byte_size(), 0);
    }

    #[test]
    fn test_row_access() {
        let buffer = PixelBuffer::new(PixelFormat::Mono8, 3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buffer.row(0), Some(&[1, 2, 3][..]));
        assert_eq!(buffer.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(buffer.row(2), None);
    }

    #[test]
    fn test_display() {
        let buffer = PixelBuffer::new(PixelFormat::Rgb8, 2, 1, vec![0; 6]).unwrap();
        assert_eq!(format!("{}", buffer), "2x1 RGB8 (6 bytes)");
    }
}
