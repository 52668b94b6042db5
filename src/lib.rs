//! Photographic mosaic builder
//!
//! The target image is cut into a grid of cells and every cell receives one
//! tile from a caller-owned pool, matched by color under a local diversity
//! penalty that discourages repeating a tile near itself.

#![forbid(unsafe_code)]

/// Assignment engine: cost matrix, diversity model, solvers and the run pipeline
pub mod algorithm;
/// Color signatures and the metrics comparing them
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Statistics, rotation and seeded sampling helpers
pub mod math;
/// Pixel buffers, tiles, the cell grid and the canvas
pub mod spatial;

pub use io::error::{MosaicError, Result};
