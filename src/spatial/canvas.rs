//! Compositing assigned tiles onto the output canvas

use crate::analysis::signature::ColorSignature;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::math::random::{SeededSampler, TILT_STREAM};
use crate::math::rotation::rotate_expand;
use crate::spatial::grid::CellGrid;
use crate::spatial::tiles::TilePool;
use image::imageops;
use image::{Rgba, RgbaImage};
use std::borrow::Cow;

/// Rendering parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Maximum absolute tilt in degrees, 0 disables tilt
    pub tilt_max_degrees: f64,
    /// Strength in [0, 1] of the shift towards the cell's mean color
    pub color_correction: f64,
    /// Canvas fill color
    pub background: [u8; 4],
    /// Clip placements at the canvas edge instead of failing
    pub clip: bool,
    /// Run seed the tilt stream derives from
    pub seed: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tilt_max_degrees: 0.0,
            color_correction: 0.0,
            background: [0, 0, 0, 255],
            clip: true,
            seed: 0,
        }
    }
}

/// Draws every cell's tile at the cell center
#[derive(Clone, Copy, Debug, Default)]
pub struct MosaicRenderer {
    options: RenderOptions,
}

impl MosaicRenderer {
    /// Create a renderer
    pub const fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Configured options
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Composite the assigned tiles and record each cell's tilt
    ///
    /// Cells are drawn in reverse `order`, so the first committed (best)
    /// matches end up on top where tiles overlap. Tilt angles are drawn in
    /// cell-index order regardless of `order`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidParameter` if a cell has no tile or names a tile outside
    ///   the pool
    /// - `CanvasBounds` if a placement leaves the canvas while clipping is
    ///   disabled
    pub fn render(&self, grid: &mut CellGrid, pool: &TilePool, order: &[usize]) -> Result<RgbaImage> {
        let (width, height) = grid.canvas_size();
        let cell_size = grid.cell_size();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(self.options.background));

        let mut sampler = SeededSampler::new(self.options.seed, TILT_STREAM);
        for cell in grid.cells_mut() {
            cell.tilt_degrees = Some(sampler.symmetric(self.options.tilt_max_degrees));
        }

        for &index in order.iter().rev() {
            let Some(cell) = grid.cell(index) else {
                return Err(invalid_parameter(
                    "order",
                    &index,
                    &"commit order names a cell outside the grid",
                ));
            };
            let tile = cell
                .tile
                .and_then(|tile| pool.get(tile))
                .ok_or_else(|| {
                    invalid_parameter(
                        "assignment",
                        &format!("cell ({}, {})", cell.row, cell.col),
                        &"cell has no tile from the pool",
                    )
                })?;

            let corrected = correct_color(
                &tile.normalized,
                &tile.signature,
                &cell.target,
                self.options.color_correction,
            );
            let angle = cell.tilt_degrees.unwrap_or(0.0);
            let placed = if angle.abs() < f64::EPSILON {
                corrected
            } else {
                Cow::Owned(rotate_expand(&corrected, angle))
            };

            let (tile_w, tile_h) = placed.dimensions();
            let [center_x, center_y] = cell.center(cell_size);
            let left = (center_x - f64::from(tile_w) / 2.0).round() as i64;
            let top = (center_y - f64::from(tile_h) / 2.0).round() as i64;

            let inside = left >= 0
                && top >= 0
                && left + i64::from(tile_w) <= i64::from(width)
                && top + i64::from(tile_h) <= i64::from(height);
            if !inside && !self.options.clip {
                return Err(MosaicError::CanvasBounds {
                    cell: cell.position(),
                    placement: [left, top, i64::from(tile_w), i64::from(tile_h)],
                    canvas: (width, height),
                });
            }

            imageops::overlay(&mut canvas, &*placed, left, top);
        }

        Ok(canvas)
    }
}

/// Shift every pixel by `strength` times the difference of the means
///
/// Alpha is kept. A zero strength borrows the input unchanged.
pub fn correct_color<'a>(
    image: &'a RgbaImage,
    tile: &ColorSignature,
    target: &ColorSignature,
    strength: f64,
) -> Cow<'a, RgbaImage> {
    let strength = strength.clamp(0.0, 1.0);
    if strength <= 0.0 {
        return Cow::Borrowed(image);
    }

    let mut shift = [0.0; 3];
    for ((out, &t), &s) in shift.iter_mut().zip(target.mean.iter()).zip(tile.mean.iter()) {
        *out = strength * (t - s);
    }

    let mut corrected = image.clone();
    for pixel in corrected.pixels_mut() {
        for (channel, delta) in pixel.0.iter_mut().zip(shift.iter()) {
            *channel = (f64::from(*channel) + delta).round().clamp(0.0, 255.0) as u8;
        }
    }
    Cow::Owned(corrected)
}
