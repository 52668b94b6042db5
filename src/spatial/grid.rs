//! Cell grid laid over the target image
//!
//! The grid owns every cell for the lifetime of a run. Cells are stored
//! row-major, so a cell's index doubles as its tie-break rank.

use crate::analysis::signature::{ColorSignature, SignatureKind};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::math::random::{JITTER_STREAM, SeededSampler};
use crate::spatial::geometry::{Rect, crop_center_rect};
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// One grid region of the target, filled by exactly one tile
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Grid row
    pub row: usize,
    /// Grid column
    pub col: usize,
    /// Row-major index
    pub index: usize,
    /// Top-left pixel of the cell before jitter (x, y)
    pub origin: [u32; 2],
    /// Per-cell jitter applied when sampling and rendering (x, y)
    pub offset: [i32; 2],
    /// Color the cell should reproduce
    pub target: ColorSignature,
    /// Pool index of the assigned tile, set once by the solver
    pub tile: Option<usize>,
    /// Tilt applied by the renderer, in degrees
    pub tilt_degrees: Option<f64>,
}

impl Cell {
    /// Grid coordinates (row, col)
    pub const fn position(&self) -> [usize; 2] {
        [self.row, self.col]
    }

    /// Pixel center of the cell including jitter (x, y)
    pub fn center(&self, cell_size: (u32, u32)) -> [f64; 2] {
        [
            f64::from(self.origin[0]) + f64::from(self.offset[0]) + f64::from(cell_size.0) / 2.0,
            f64::from(self.origin[1]) + f64::from(self.offset[1]) + f64::from(cell_size.1) / 2.0,
        ]
    }
}

/// All cells of a run with the geometry they were cut with
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
    cell_size: (u32, u32),
    canvas_size: (u32, u32),
}

impl CellGrid {
    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Grid dimensions (rows, cols)
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at a row-major index
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell at grid coordinates
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Pixel size of every cell (width, height)
    pub const fn cell_size(&self) -> (u32, u32) {
        self.cell_size
    }

    /// Size of the image the grid was cut from (width, height)
    pub const fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    /// Target signatures in row-major order
    pub fn signatures(&self) -> Vec<ColorSignature> {
        self.cells.iter().map(|cell| cell.target).collect()
    }

    /// Record the solver's tile for every cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the assignment does not cover the grid
    /// exactly or a cell already holds a tile
    pub fn assign(&mut self, tiles: &[usize]) -> Result<()> {
        if tiles.len() != self.cells.len() {
            return Err(invalid_parameter(
                "assignment",
                &tiles.len(),
                &format!("expected one tile per cell ({} cells)", self.cells.len()),
            ));
        }
        if let Some(cell) = self.cells.iter().find(|cell| cell.tile.is_some()) {
            return Err(invalid_parameter(
                "assignment",
                &format!("cell ({}, {})", cell.row, cell.col),
                &"cell is already assigned",
            ));
        }

        for (cell, &tile) in self.cells.iter_mut().zip(tiles) {
            cell.tile = Some(tile);
        }
        Ok(())
    }

    /// Mutable access for the renderer to record tilt
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

/// Divides a target image into equally sized cells
#[derive(Clone, Copy, Debug)]
pub struct GridBuilder {
    cell_size: (u32, u32),
    pixel_shift: [u32; 2],
    jitter: u32,
    signature: SignatureKind,
    seed: u64,
}

impl GridBuilder {
    /// Builder for cells of `cell_size` pixels (width, height)
    pub const fn new(cell_size: (u32, u32)) -> Self {
        Self {
            cell_size,
            pixel_shift: [0, 0],
            jitter: 0,
            signature: SignatureKind::Mean,
            seed: 0,
        }
    }

    /// Offset every cell boundary by a sub-cell amount (x, y)
    #[must_use]
    pub const fn with_shift(mut self, pixel_shift: [u32; 2]) -> Self {
        self.pixel_shift = pixel_shift;
        self
    }

    /// Move each cell by a seeded random offset of at most `jitter` pixels
    #[must_use]
    pub const fn with_jitter(mut self, jitter: u32, seed: u64) -> Self {
        self.jitter = jitter;
        self.seed = seed;
        self
    }

    /// Statistics carried by the cell signatures
    #[must_use]
    pub const fn with_signature(mut self, signature: SignatureKind) -> Self {
        self.signature = signature;
        self
    }

    /// Cut the grid and compute every cell's target signature
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidDimensions` if a cell dimension is zero or the target is
    ///   smaller than one cell after the shift
    /// - `InvalidParameter` if the shift is not smaller than the cell
    pub fn build(&self, target: &RgbaImage) -> Result<CellGrid> {
        let (width, height) = target.dimensions();
        let (cell_w, cell_h) = self.cell_size;

        if cell_w == 0 || cell_h == 0 {
            return Err(MosaicError::InvalidDimensions {
                image: (width, height),
                cell: self.cell_size,
                reason: "cell size must be positive",
            });
        }
        if self.pixel_shift[0] >= cell_w || self.pixel_shift[1] >= cell_h {
            return Err(invalid_parameter(
                "pixelShift",
                &format!("{},{}", self.pixel_shift[0], self.pixel_shift[1]),
                &format!("shift must be smaller than the cell ({cell_w}x{cell_h})"),
            ));
        }

        let cols = (width.saturating_sub(self.pixel_shift[0]) / cell_w) as usize;
        let rows = (height.saturating_sub(self.pixel_shift[1]) / cell_h) as usize;
        if rows == 0 || cols == 0 {
            return Err(MosaicError::InvalidDimensions {
                image: (width, height),
                cell: self.cell_size,
                reason: "target image is smaller than one cell",
            });
        }

        let mut sampler = SeededSampler::new(self.seed, JITTER_STREAM);
        let max_x = i64::from(width - cell_w);
        let max_y = i64::from(height - cell_h);

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let origin = [
                    self.pixel_shift[0] + col as u32 * cell_w,
                    self.pixel_shift[1] + row as u32 * cell_h,
                ];
                let offset = [sampler.offset(self.jitter), sampler.offset(self.jitter)];

                // Sampling stays inside the image even when jitter pushes out
                let sample_x = (i64::from(origin[0]) + i64::from(offset[0])).clamp(0, max_x);
                let sample_y = (i64::from(origin[1]) + i64::from(offset[1])).clamp(0, max_y);
                let region = Rect {
                    x: sample_x as u32,
                    y: sample_y as u32,
                    width: cell_w,
                    height: cell_h,
                };

                cells.push(Cell {
                    row,
                    col,
                    index: row * cols + col,
                    origin,
                    offset,
                    target: ColorSignature::of_region(target, region, self.signature),
                    tile: None,
                    tilt_degrees: None,
                });
            }
        }

        Ok(CellGrid {
            cells,
            rows,
            cols,
            cell_size: self.cell_size,
            canvas_size: (width, height),
        })
    }
}

/// Crop the target to the final aspect and resize it to the final size
///
/// `crop_shift` moves the crop along the trimmed axis (see
/// [`crop_center_rect`]). Without a final size the target is returned as is.
pub fn prepare_target(
    target: &RgbaImage,
    final_size: Option<(u32, u32)>,
    crop_shift: f64,
) -> RgbaImage {
    let Some((final_w, final_h)) = final_size else {
        return target.clone();
    };
    let (width, height) = target.dimensions();

    let crop = crop_center_rect((width, height), (final_w, final_h), crop_shift);
    let cropped = if crop.covers(width, height) {
        target.clone()
    } else {
        imageops::crop_imm(target, crop.x, crop.y, crop.width, crop.height).to_image()
    };

    if cropped.dimensions() == (final_w, final_h) {
        cropped
    } else {
        imageops::resize(&cropped, final_w, final_h, FilterType::Lanczos3)
    }
}
