//! frame-stitch library crate.
//!
//! Combines raw pixel buffers into larger composites:
//! - [`stitch::stitch_vertical`] and [`stitch::stitch_horizontal`] join two buffers
//! - [`mosaic::MosaicBuilder`] assembles a stream of tiles into a grid
//! - [`pipeline::Pipeline`] drives both from a [`source::FrameSource`]

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod mosaic;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod stitch;

pub use error::{ErrorKind, StitchError};
pub use frame::{PixelBuffer, PixelFormat};
pub use mosaic::{MosaicBuilder, MosaicState};
pub use stitch::{stitch_horizontal, stitch_vertical, Direction, Strip};
