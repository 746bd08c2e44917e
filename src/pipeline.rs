//! Stitching pipeline driven by a frame source.
//!
//! This module pulls frames one at a time and feeds them to every enabled
//! output: the grid mosaic, a tall strip, a wide strip, and side-by-side
//! pairs (left/right camera style). Finished composites go to a
//! [`RawWriter`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::frame::PixelBuffer;
use crate::mosaic::MosaicBuilder;
use crate::output::{OutputError, RawWriter, WrittenImage};
use crate::source::{FrameSource, SourceError};
use crate::stitch::{stitch_horizontal, Direction, Strip};

/// Errors that stop the pipeline.
///
/// Stitch failures on single frames are logged and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("No outputs enabled")]
    NothingToDo,
}

/// Which composites the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub mosaic: bool,
    pub vertical: bool,
    pub horizontal: bool,
    pub pairs: bool,
}

impl Default for Outputs {
    fn default() -> Self {
        Self {
            mosaic: true,
            vertical: false,
            horizontal: false,
            pairs: false,
        }
    }
}

impl Outputs {
    pub fn any(&self) -> bool {
        self.mosaic || self.vertical || self.horizontal || self.pairs
    }
}

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Mosaic columns
    pub columns: u32,
    /// Mosaic rows
    pub rows: u32,
    pub outputs: Outputs,
    /// Tiles per strip before it is written out and restarted
    pub strip_tiles: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            outputs: Outputs::default(),
            strip_tiles: 16,
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames pulled from the source
    pub frames: u64,
    /// Frames rejected by the source or a stitch step
    pub skipped: u64,
    pub mosaics: u64,
    pub pairs: u64,
    pub strips: u64,
}

/// Single-threaded stitching pipeline.
pub struct Pipeline {
    settings: PipelineSettings,
    mosaic: MosaicBuilder,
    tall: Strip,
    wide: Strip,
    /// Left half of the pair being assembled
    pair_left: Option<PixelBuffer>,
    writer: RawWriter,
    /// Flag indicating if shutdown has been requested
    shutdown_flag: Arc<AtomicBool>,
    stats: RunStats,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline writing into `writer`.
    ///
    /// # Errors
    /// * `PipelineError::NothingToDo` - If every output is disabled
    pub fn new(settings: PipelineSettings, writer: RawWriter) -> Result<Self, PipelineError> {
        if !settings.outputs.any() {
            return Err(PipelineError::NothingToDo);
        }
        Ok(Self {
            mosaic: MosaicBuilder::with_grid(settings.columns, settings.rows),
            settings,
            tall: Strip::new(Direction::Vertical),
            wide: Strip::new(Direction::Horizontal),
            pair_left: None,
            writer,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            stats: RunStats::default(),
        })
    }

    /// Get a handle that stops the run loop before the next frame.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_flag)
    }

    /// Check if shutdown has been requested, here or via Ctrl+C.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst) || ctrlc_received()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn mosaic(&self) -> &MosaicBuilder {
        &self.mosaic
    }

    /// Composites written so far.
    pub fn written(&self) -> &[WrittenImage] {
        self.writer.written()
    }

    /// Pull frames until the source is exhausted or shutdown is requested,
    /// then flush partial strips.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> Result<RunStats, PipelineError> {
        log::info!("Reading frames from {}", source.describe());

        while !self.shutdown_requested() {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(SourceError::InvalidFrame { path, source: e }) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    self.stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            self.process_frame(&frame)?;
        }

        self.finish()?;
        Ok(self.stats.clone())
    }

    /// Feed one frame to every enabled output.
    pub fn process_frame(&mut self, frame: &PixelBuffer) -> Result<(), PipelineError> {
        self.stats.frames += 1;
        let sequence = self.stats.frames;
        let outputs = self.settings.outputs;
        let mut rejected = false;

        if outputs.vertical {
            rejected |= self.push_strip(Direction::Vertical, frame)?;
        }
        if outputs.horizontal {
            rejected |= self.push_strip(Direction::Horizontal, frame)?;
        }

        if outputs.pairs {
            match self.pair_left.take() {
                None => self.pair_left = Some(frame.clone()),
                Some(left) => match stitch_horizontal(&left, frame) {
                    Ok(pair) => {
                        self.stats.pairs += 1;
                        self.writer.write("pair", self.stats.pairs, &pair)?;
                    }
                    Err(e) => {
                        log::warn!("Frame {}: pair stitch failed: {}", sequence, e);
                        rejected = true;
                    }
                },
            }
        }

        if outputs.mosaic {
            match self.mosaic.append(frame) {
                Ok(()) if self.mosaic.is_complete() => {
                    self.stats.mosaics += 1;
                    if let Ok(mosaic) = self.mosaic.latest_mosaic() {
                        self.writer.write("mosaic", self.stats.mosaics, mosaic)?;
                    }
                }
                Ok(()) => {}
                Err(e) => {
                    log::warn!("Frame {}: mosaic append failed: {}", sequence, e);
                    rejected = true;
                }
            }
        }

        if rejected {
            self.stats.skipped += 1;
        }
        Ok(())
    }

    /// Write out partial strips. Incomplete mosaics and unpaired frames are
    /// dropped.
    pub fn finish(&mut self) -> Result<(), PipelineError> {
        self.flush_strip(Direction::Vertical)?;
        self.flush_strip(Direction::Horizontal)?;
        if self.mosaic.images_accumulated() > 0 {
            log::info!(
                "Dropping incomplete mosaic ({} of {} images)",
                self.mosaic.images_accumulated(),
                self.mosaic.tiles_per_mosaic()
            );
        }
        Ok(())
    }

    /// Push into a strip; returns true if the frame was rejected.
    fn push_strip(&mut self, direction: Direction, frame: &PixelBuffer) -> Result<bool, PipelineError> {
        let limit = self.settings.strip_tiles;
        let strip = self.strip_mut(direction);
        if let Err(e) = strip.push(frame) {
            log::warn!("{:?} strip rejected frame: {}", direction, e);
            return Ok(true);
        }
        if strip.len() >= limit {
            self.flush_strip(direction)?;
        }
        Ok(false)
    }

    fn flush_strip(&mut self, direction: Direction) -> Result<(), PipelineError> {
        let strip = self.strip_mut(direction);
        if strip.is_empty() {
            return Ok(());
        }
        let image = strip.take();
        self.stats.strips += 1;
        let kind = match direction {
            Direction::Vertical => "vertical",
            Direction::Horizontal => "horizontal",
        };
        self.writer.write(kind, self.stats.strips, &image)?;
        Ok(())
    }

    fn strip_mut(&mut self, direction: Direction) -> &mut Strip {
        match direction {
            Direction::Vertical => &mut self.tall,
            Direction::Horizontal => &mut self.wide,
        }
    }
}

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, finishing current frame...");
    })
}
