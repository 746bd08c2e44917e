//! Grid mosaic assembly from a stream of same-sized images.
//!
//! [`MosaicBuilder`] places appended images in row-major order: the first
//! `grid_width` images form the top row left to right, the next
//! `grid_width` form the second row, and so on. When `grid_width *
//! grid_height` images have been appended, the rows are stacked into a
//! finished mosaic and accumulation starts over.

use crate::error::StitchError;
use crate::frame::PixelBuffer;
use crate::stitch::{stitch_horizontal, stitch_vertical};

/// Coarse accumulation state of a [`MosaicBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicState {
    /// Nothing accumulated
    Empty,
    /// The first row has at least one image, no row is finished
    RowInProgress,
    /// At least one row is finished
    RowsAccumulating,
    /// A mosaic was just finished and nothing has been appended since
    MosaicReady,
}

/// Stateful accumulator that assembles images into a fixed-size grid.
///
/// The builder is not internally synchronized; mutation goes through
/// `&mut self`, so callers sharing one builder across threads must wrap it
/// in a lock. Independent mosaics each get their own builder.
#[derive(Debug, Clone, Default)]
pub struct MosaicBuilder {
    /// Tiles per row
    grid_width: u32,
    /// Rows per mosaic
    grid_height: u32,
    /// Images appended since the last completed mosaic
    images_accumulated: u32,
    /// Row being grown left to right
    current_row: PixelBuffer,
    /// Finished rows, top to bottom
    completed_rows: Vec<PixelBuffer>,
    latest_mosaic: Option<PixelBuffer>,
    complete: bool,
}

impl MosaicBuilder {
    /// Create a builder with a 0x0 grid. Call [`configure`](Self::configure)
    /// before appending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for a grid of `columns` x `rows` images.
    pub fn with_grid(columns: u32, rows: u32) -> Self {
        let mut builder = Self::new();
        builder.configure(columns, rows);
        builder
    }

    /// Set the grid size.
    ///
    /// Changing the grid while images are accumulated is allowed, but row
    /// and grid boundaries keep being computed from the running image count,
    /// so the partial mosaic may end up with mismatched rows. Call
    /// [`reset`](Self::reset) first to start cleanly.
    pub fn configure(&mut self, columns: u32, rows: u32) {
        self.grid_width = columns;
        self.grid_height = rows;
    }

    /// Set the number of images per row. See [`configure`](Self::configure).
    pub fn set_width(&mut self, columns: u32) {
        self.grid_width = columns;
    }

    /// Set the number of rows. See [`configure`](Self::configure).
    pub fn set_height(&mut self, rows: u32) {
        self.grid_height = rows;
    }

    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    /// Number of tiles in one mosaic, saturating at `u32::MAX`.
    pub fn tiles_per_mosaic(&self) -> u32 {
        self.grid_width.saturating_mul(self.grid_height)
    }

    /// Number of images appended since the last completed mosaic.
    pub fn images_accumulated(&self) -> u32 {
        self.images_accumulated
    }

    /// Number of finished rows waiting for the grid to complete.
    pub fn completed_rows(&self) -> usize {
        self.completed_rows.len()
    }

    /// Append the next image in row-major order.
    ///
    /// The completion flag is cleared first, whatever the outcome. If the
    /// image finishes the grid, the mosaic becomes available through
    /// [`latest_mosaic`](Self::latest_mosaic) and [`is_complete`](Self::is_complete)
    /// returns true until the next append.
    ///
    /// # Errors
    /// * `StitchError::InvalidDimensions` - The grid has zero columns or rows,
    ///   or the image does not match the row being built
    /// * `StitchError::IncompatibleFormat` - The image format differs from the row
    /// * `StitchError::UnsupportedFormat` - The image uses a packed format
    ///
    /// On error, the builder state is left as it was before the call.
    pub fn append(&mut self, image: &PixelBuffer) -> Result<(), StitchError> {
        self.complete = false;

        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(StitchError::InvalidDimensions(format!(
                "mosaic grid is {}x{}, configure it before appending",
                self.grid_width, self.grid_height
            )));
        }

        let row = stitch_horizontal(&self.current_row, image)?;
        let count = self.images_accumulated + 1;
        let tiles_per_mosaic = self.tiles_per_mosaic();

        if count % self.grid_width != 0 {
            self.current_row = row;
            self.images_accumulated = count;
            log::debug!("Appended image {} to row {}", count, self.completed_rows.len());
            return Ok(());
        }

        if count % tiles_per_mosaic != 0 {
            self.completed_rows.push(row);
            self.current_row = PixelBuffer::empty();
            self.images_accumulated = count;
            log::debug!("Row {} complete", self.completed_rows.len());
            return Ok(());
        }

        // Fold before touching any state so a failure leaves the builder intact.
        let mosaic = self.fold_rows(&row)?;
        log::info!(
            "Mosaic complete: {}x{} grid, {}",
            self.grid_width,
            self.grid_height,
            mosaic
        );
        self.latest_mosaic = Some(mosaic);
        self.completed_rows.clear();
        self.current_row = PixelBuffer::empty();
        self.images_accumulated = 0;
        self.complete = true;
        Ok(())
    }

    /// Get the most recently completed mosaic.
    ///
    /// # Errors
    /// * `StitchError::NoMosaicAvailable` - No grid has completed since
    ///   creation or the last reset
    pub fn latest_mosaic(&self) -> Result<&PixelBuffer, StitchError> {
        self.latest_mosaic
            .as_ref()
            .ok_or(StitchError::NoMosaicAvailable)
    }

    /// True right after an append completed a mosaic.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Discard all accumulated images and the latest mosaic.
    ///
    /// The grid size is kept.
    pub fn reset(&mut self) {
        self.current_row = PixelBuffer::empty();
        self.completed_rows.clear();
        self.latest_mosaic = None;
        self.images_accumulated = 0;
        self.complete = false;
    }

    pub fn state(&self) -> MosaicState {
        if self.complete {
            MosaicState::MosaicReady
        } else if !self.completed_rows.is_empty() {
            MosaicState::RowsAccumulating
        } else if self.images_accumulated > 0 {
            MosaicState::RowInProgress
        } else {
            MosaicState::Empty
        }
    }

    /// Stack the finished rows plus `last_row` top to bottom.
    fn fold_rows(&self, last_row: &PixelBuffer) -> Result<PixelBuffer, StitchError> {
        let mut mosaic = PixelBuffer::empty();
        for row in self.completed_rows.iter().chain(std::iter::once(last_row)) {
            mosaic = stitch_vertical(&mosaic, row)?;
        }
        Ok(mosaic)
    }
}
