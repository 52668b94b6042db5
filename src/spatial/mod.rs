//! Spatial data structures and pixel geometry
//!
//! This module contains spatial-related functionality including:
//! - Validated pixel buffers and dimension arithmetic
//! - Tile pools and normalization
//! - The cell grid and canvas compositing

/// Validated raw pixel buffers
pub mod buffer;
/// Canvas compositing of assigned tiles
pub mod canvas;
/// Crop, orientation and cell-size arithmetic
pub mod geometry;
/// Cell grid over the target image
pub mod grid;
/// Tile pools and aspect/size normalization
pub mod tiles;

pub use grid::CellGrid;
