//! Vertical and horizontal concatenation of pixel buffers.
//!
//! Both operations are pure: they read their operands and return a newly
//! allocated [`PixelBuffer`]. An empty operand (zero width or height) is
//! allowed, which lets an accumulator start from [`PixelBuffer::empty`] and
//! grow one tile at a time (see [`Strip`]).

use crate::error::StitchError;
use crate::frame::{PixelBuffer, PixelFormat};

/// Direction in which a [`Strip`] grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Each tile is placed below the previous one
    Vertical,
    /// Each tile is placed right of the previous one
    Horizontal,
}

/// Stitch `bottom` below `top`.
///
/// The result is the byte concatenation of both buffers, since stacked
/// images each occupy whole contiguous rows. An empty operand contributes
/// neither rows nor bytes, so the other one passes through unchanged.
///
/// # Errors
/// * `StitchError::IncompatibleFormat` - Formats differ, or both are undefined
/// * `StitchError::InvalidDimensions` - Widths differ, both are zero, or an
///   operand holds the wrong number of bytes for its size
/// * `StitchError::AllocationFailed` - The result buffer cannot be allocated
pub fn stitch_vertical(top: &PixelBuffer, bottom: &PixelBuffer) -> Result<PixelBuffer, StitchError> {
    let format = resolve_format(top.format(), bottom.format())?;
    let width = match (top.is_empty(), bottom.is_empty()) {
        (true, false) => bottom.width(),
        (false, true) => top.width(),
        _ => resolve_dimension("width", top.width(), bottom.width())?,
    };

    let parts = present([("top", top), ("bottom", bottom)]);
    let mut height = 0u32;
    let mut total = 0usize;
    for &(side, image) in &parts {
        check_size(side, image, format)?;
        height = height
            .checked_add(image.height())
            .ok_or_else(|| StitchError::InvalidDimensions("stitched height overflows".to_string()))?;
        total += image.byte_size();
    }
    // Packed operands whose bits do not end on a byte boundary cannot be
    // concatenated bytewise.
    if !parts.is_empty() && format.image_size(width, height) != Some(total) {
        return Err(StitchError::InvalidDimensions(format!(
            "{} operands of {} bytes do not stack into a {}x{} image",
            format, total, width, height
        )));
    }

    let mut data = allocate(total)?;
    for (_, image) in &parts {
        data.extend_from_slice(image.data());
    }

    Ok(PixelBuffer::from_raw(format, width, height, data))
}

/// Stitch `right` to the right of `left`.
///
/// Rows are interleaved: row `i` of the result is row `i` of `left`
/// followed by row `i` of `right`. An empty operand contributes no
/// columns, so the other one passes through unchanged.
///
/// # Errors
/// * `StitchError::UnsupportedFormat` - Either operand uses a packed format
/// * `StitchError::IncompatibleFormat` - Formats differ, or both are undefined
/// * `StitchError::InvalidDimensions` - Heights differ, both are zero, or an
///   operand holds the wrong number of bytes for its size
/// * `StitchError::AllocationFailed` - The result buffer cannot be allocated
pub fn stitch_horizontal(
    left: &PixelBuffer,
    right: &PixelBuffer,
) -> Result<PixelBuffer, StitchError> {
    for format in [left.format(), right.format()] {
        if format.is_packed() {
            return Err(StitchError::UnsupportedFormat(format));
        }
    }

    let format = resolve_format(left.format(), right.format())?;
    let height = match (left.is_empty(), right.is_empty()) {
        (true, false) => right.height(),
        (false, true) => left.height(),
        _ => resolve_dimension("height", left.height(), right.height())?,
    };

    let bpp = format.bytes_per_pixel();
    let mut width = 0u32;
    let mut strides = Vec::with_capacity(2);
    for (side, image) in present([("left", left), ("right", right)]) {
        check_size(side, image, format)?;
        width = width
            .checked_add(image.width())
            .ok_or_else(|| StitchError::InvalidDimensions("stitched width overflows".to_string()))?;
        strides.push((side, image, image.width() as usize * bpp));
    }

    let stride: usize = strides.iter().map(|&(_, _, stride)| stride).sum();
    let total = stride
        .checked_mul(height as usize)
        .ok_or_else(|| StitchError::InvalidDimensions("stitched size overflows".to_string()))?;
    let mut data = allocate(total)?;

    for y in 0..height as usize {
        for &(side, image, stride) in &strides {
            data.extend_from_slice(row_of(image, side, y, stride)?);
        }
    }

    Ok(PixelBuffer::from_raw(format, width, height, data))
}

/// Stitch `tile` onto `base` in the given direction.
pub fn stitch(
    direction: Direction,
    base: &PixelBuffer,
    tile: &PixelBuffer,
) -> Result<PixelBuffer, StitchError> {
    match direction {
        Direction::Vertical => stitch_vertical(base, tile),
        Direction::Horizontal => stitch_horizontal(base, tile),
    }
}

/// An accumulator that grows by stitching one tile at a time.
///
/// Each push replaces the accumulated image with `stitch(image, tile)`, so
/// the accumulator is never both source and destination of a copy.
#[derive(Debug, Clone)]
pub struct Strip {
    direction: Direction,
    image: PixelBuffer,
    tiles: usize,
}

impl Strip {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            image: PixelBuffer::empty(),
            tiles: 0,
        }
    }

    /// Append a tile. On error the strip is left unchanged.
    pub fn push(&mut self, tile: &PixelBuffer) -> Result<(), StitchError> {
        self.image = stitch(self.direction, &self.image, tile)?;
        self.tiles += 1;
        Ok(())
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The image accumulated so far (empty before the first push).
    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// Number of tiles pushed since creation or the last clear.
    pub fn len(&self) -> usize {
        self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles == 0
    }

    pub fn clear(&mut self) {
        self.image = PixelBuffer::empty();
        self.tiles = 0;
    }

    /// Take the accumulated image, leaving the strip empty.
    pub fn take(&mut self) -> PixelBuffer {
        self.tiles = 0;
        std::mem::take(&mut self.image)
    }
}

/// Pick the format shared by two operands.
///
/// A defined format wins over `Undefined`; two defined formats must match.
fn resolve_format(first: PixelFormat, second: PixelFormat) -> Result<PixelFormat, StitchError> {
    match (first.is_defined(), second.is_defined()) {
        (false, false) => Err(StitchError::IncompatibleFormat(
            "both images have undefined pixel formats".to_string(),
        )),
        (false, true) => Ok(second),
        (true, false) => Ok(first),
        (true, true) if first == second => Ok(first),
        (true, true) => Err(StitchError::IncompatibleFormat(format!(
            "images must share a pixel format, got {} and {}",
            first, second
        ))),
    }
}

/// Pick the dimension shared by two operands. Zero means "absent".
fn resolve_dimension(name: &str, first: u32, second: u32) -> Result<u32, StitchError> {
    match (first, second) {
        (0, 0) => Err(StitchError::InvalidDimensions(format!(
            "both images have {} 0",
            name
        ))),
        (0, other) | (other, 0) => Ok(other),
        (a, b) if a == b => Ok(a),
        (a, b) => Err(StitchError::InvalidDimensions(format!(
            "images must have the same {}, got {} and {}",
            name, a, b
        ))),
    }
}

/// Operands that hold pixels, in stitch order.
fn present<'a>(operands: [(&'static str, &'a PixelBuffer); 2]) -> Vec<(&'static str, &'a PixelBuffer)> {
    operands
        .into_iter()
        .filter(|(_, image)| !image.is_empty())
        .collect()
}

/// Check that an operand holds exactly the bytes its size needs in `format`.
///
/// `Undefined` buffers skip the length check in [`PixelBuffer::new`], so
/// they are only caught here once the shared format is known.
fn check_size(side: &str, image: &PixelBuffer, format: PixelFormat) -> Result<(), StitchError> {
    match format.image_size(image.width(), image.height()) {
        Some(expected) if expected == image.byte_size() => Ok(()),
        Some(expected) => Err(StitchError::InvalidDimensions(format!(
            "{} image holds {} bytes, {}x{} {} needs {}",
            side,
            image.byte_size(),
            image.width(),
            image.height(),
            format,
            expected
        ))),
        None => Err(StitchError::InvalidDimensions(format!(
            "{} image size overflows",
            side
        ))),
    }
}

fn row_of<'a>(
    image: &'a PixelBuffer,
    side: &str,
    y: usize,
    stride: usize,
) -> Result<&'a [u8], StitchError> {
    let start = y * stride;
    image.data().get(start..start + stride).ok_or_else(|| {
        StitchError::InvalidDimensions(format!(
            "{} image holds {} bytes, too few for row {}",
            side,
            image.byte_size(),
            y
        ))
    })
}

fn allocate(bytes: usize) -> Result<Vec<u8>, StitchError> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| StitchError::AllocationFailed { bytes })?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(width: u32, height: u32, data: Vec<u8>) -> PixelBuffer {
        PixelBuffer::new(PixelFormat::Mono8, width, height, data).unwrap()
    }

    #[test]
    fn test_vertical_concatenates_bytes() {
        let top = mono(2, 1, vec![1, 2]);
        let bottom = mono(2, 2, vec![3, 4, 5, 6]);
        let result = stitch_vertical(&top, &bottom).unwrap();
        assert_eq!(result.width(), 2);
        assert_eq!(result.height(), 3);
        assert_eq!(result.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_horizontal_interleaves_rows() {
        // Left:  [1 2]    Right: [5]
        //        [3 4]           [6]
        let left = mono(2, 2, vec![1, 2, 3, 4]);
        let right = mono(1, 2, vec![5, 6]);
        let result = stitch_horizontal(&left, &right).unwrap();
        assert_eq!(result.width(), 3);
        assert_eq!(result.height(), 2);
        assert_eq!(result.data(), &[1, 2, 5, 3, 4, 6]);
    }

    #[test]
    fn test_horizontal_multibyte_pixels() {
        let left = PixelBuffer::new(PixelFormat::Rgb8, 1, 2, vec![1, 1, 1, 2, 2, 2]).unwrap();
        let right = PixelBuffer::new(PixelFormat::Rgb8, 1, 2, vec![3, 3, 3, 4, 4, 4]).unwrap();
        let result = stitch_horizontal(&left, &right).unwrap();
        assert_eq!(
            result.data(),
            &[1, 1, 1, 3, 3, 3, 2, 2, 2, 4, 4, 4]
        );
    }

    #[test]
    fn test_empty_operand_passes_through() {
        let tile = mono(2, 2, vec![1, 2, 3, 4]);
        let empty = PixelBuffer::empty();

        let vertical = stitch_vertical(&empty, &tile).unwrap();
        assert_eq!(vertical, tile);

        let horizontal = stitch_horizontal(&empty, &tile).unwrap();
        assert_eq!(horizontal, tile);
    }

    #[test]
    fn test_both_empty_fails() {
        let empty = PixelBuffer::empty();
        let result = stitch_vertical(&empty, &empty);
        assert!(matches!(result, Err(StitchError::IncompatibleFormat(_))));

        // Defined format but no pixels on either side
        let blank = PixelBuffer::new(PixelFormat::Mono8, 0, 0, vec![]).unwrap();
        let result = stitch_horizontal(&blank, &blank);
        assert!(matches!(result, Err(StitchError::InvalidDimensions(_))));
    }

    #[test]
    fn test_format_mismatch() {
        let a = mono(1, 1, vec![0]);
        let b = PixelBuffer::new(PixelFormat::Rgb8, 1, 1, vec![0, 0, 0]).unwrap();
        assert!(matches!(
            stitch_vertical(&a, &b),
            Err(StitchError::IncompatibleFormat(_))
        ));
        assert!(matches!(
            stitch_horizontal(&a, &b),
            Err(StitchError::IncompatibleFormat(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = mono(2, 1, vec![0, 0]);
        let b = mono(1, 2, vec![0, 0]);
        assert!(matches!(
            stitch_vertical(&a, &b),
            Err(StitchError::InvalidDimensions(_))
        ));
        assert!(matches!(
            stitch_horizontal(&a, &b),
            Err(StitchError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_horizontal_rejects_packed() {
        let packed = PixelBuffer::new(PixelFormat::Mono12p, 2, 1, vec![0, 0, 0]).unwrap();
        let result = stitch_horizontal(&PixelBuffer::empty(), &packed);
        assert_eq!(result, Err(StitchError::UnsupportedFormat(PixelFormat::Mono12p)));
    }

    #[test]
    fn test_vertical_accepts_packed() {
        let a = PixelBuffer::new(PixelFormat::Mono12p, 2, 1, vec![1, 2, 3]).unwrap();
        let b = PixelBuffer::new(PixelFormat::Mono12p, 2, 1, vec![4, 5, 6]).unwrap();
        let result = stitch_vertical(&a, &b).unwrap();
        assert_eq!(result.height(), 2);
        assert_eq!(result.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_horizontal_short_data_is_an_error() {
        // Undefined skips the length check, so the row copy must guard itself
        let short = PixelBuffer::new(PixelFormat::Undefined, 2, 2, vec![1]).unwrap();
        let full = mono(2, 2, vec![1, 2, 3, 4]);
        let result = stitch_horizontal(&full, &short);
        assert!(matches!(result, Err(StitchError::InvalidDimensions(_))));
    }

    #[test]
    fn test_horizontal_rowless_operand_with_width_passes_through() {
        let rowless = mono(3, 0, vec![]);
        let right = mono(1, 2, vec![7, 8]);
        let result = stitch_horizontal(&rowless, &right).unwrap();
        assert_eq!(result, right);

        let result = stitch_horizontal(&right, &rowless).unwrap();
        assert_eq!(result, right);
    }

    #[test]
    fn test_vertical_columnless_operand_with_height_passes_through() {
        let columnless = mono(0, 3, vec![]);
        let bottom = mono(2, 2, vec![1, 2, 3, 4]);
        let result = stitch_vertical(&columnless, &bottom).unwrap();
        assert_eq!((result.width(), result.height()), (2, 2));
        assert_eq!(result.byte_size(), 4);
        assert_eq!(result, bottom);

        // The result stays consistent for further stitching
        let wider = stitch_horizontal(&result, &mono(1, 2, vec![5, 6])).unwrap();
        assert_eq!(wider.data(), &[1, 2, 5, 3, 4, 6]);
    }

    #[test]
    fn test_vertical_rejects_undefined_operand_with_wrong_size() {
        let short = PixelBuffer::new(PixelFormat::Undefined, 2, 2, vec![1]).unwrap();
        let full = mono(2, 2, vec![1, 2, 3, 4]);
        let result = stitch_vertical(&full, &short);
        assert!(matches!(result, Err(StitchError::InvalidDimensions(_))));
    }

    #[test]
    fn test_vertical_packed_rows_must_end_on_byte_boundary() {
        // One 12-bit pixel takes 2 bytes alone, but two stacked take 3
        let a = PixelBuffer::new(PixelFormat::Mono12p, 1, 1, vec![1, 2]).unwrap();
        let result = stitch_vertical(&a, &a);
        assert!(matches!(result, Err(StitchError::InvalidDimensions(_))));
    }

    #[test]
    fn test_strip_grows_and_takes() {
        let mut strip = Strip::new(Direction::Horizontal);
        assert!(strip.is_empty());
        strip.push(&mono(1, 1, vec![7])).unwrap();
        strip.push(&mono(1, 1, vec![8])).unwrap();
        assert_eq!(strip.len(), 2);
        assert_eq!(strip.image().data(), &[7, 8]);

        let image = strip.take();
        assert_eq!(image.width(), 2);
        assert!(strip.is_empty());
        assert!(strip.image().is_empty());
    }

    #[test]
    fn test_strip_failed_push_keeps_image() {
        let mut strip = Strip::new(Direction::Vertical);
        strip.push(&mono(2, 1, vec![1, 2])).unwrap();
        let result = strip.push(&mono(3, 1, vec![1, 2, 3]));
        assert!(result.is_err());
        assert_eq!(strip.len(), 1);
        assert_eq!(strip.image().data(), &[1, 2]);
    }
}
