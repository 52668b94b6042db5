//! Static color-distance matrix between cells and tiles

use crate::analysis::metric::ColorMetric;
use crate::analysis::signature::ColorSignature;
use crate::io::error::{Result, invalid_parameter};
use ndarray::Array2;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// Color distance of every (cell, tile) pair
#[derive(Clone, Debug)]
pub struct CostMatrix {
    costs: Array2<f64>,
}

impl CostMatrix {
    /// Compute the matrix, one row per cell, in parallel
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the computed values cannot be shaped
    /// into a cells x tiles matrix
    pub fn compute(
        cells: &[ColorSignature],
        tiles: &[ColorSignature],
        metric: ColorMetric,
    ) -> Result<Self> {
        let values: Vec<f64> = cells
            .par_iter()
            .flat_map_iter(|cell| tiles.iter().map(move |tile| metric.distance(cell, tile)))
            .collect();

        let costs = Array2::from_shape_vec((cells.len(), tiles.len()), values).map_err(|e| {
            invalid_parameter(
                "costMatrix",
                &format!("{}x{}", cells.len(), tiles.len()),
                &e.to_string(),
            )
        })?;
        Ok(Self { costs })
    }

    /// Build from precomputed values, mainly for tests and benchmarks
    pub const fn from_array(costs: Array2<f64>) -> Self {
        Self { costs }
    }

    /// Color distance between a cell and a tile
    pub fn get(&self, cell: usize, tile: usize) -> f64 {
        self.costs.get((cell, tile)).copied().unwrap_or(f64::INFINITY)
    }

    /// Number of cells
    pub fn cells(&self) -> usize {
        self.costs.nrows()
    }

    /// Number of tiles
    pub fn tiles(&self) -> usize {
        self.costs.ncols()
    }

    /// Underlying matrix
    pub const fn as_array(&self) -> &Array2<f64> {
        &self.costs
    }
}
