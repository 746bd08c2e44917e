//! Raw image data model shared by the stitching operations.
//!
//! - [`PixelBuffer`] holds a rectangular image and its bytes
//! - [`PixelFormat`] tags the pixel layout and reports its size

mod types;

pub use types::{PixelBuffer, PixelFormat};
