//! Neighborhood reuse penalty
//!
//! Placements are remembered per tile in commit order. A tile placed near
//! one of its earlier placements pays a penalty that fades linearly with
//! grid distance and geometrically with the number of newer placements
//! of the same tile.

use std::collections::HashMap;

/// Reuse penalty configuration and the placement history of one run
#[derive(Clone, Debug)]
pub struct DiversityModel {
    radius: f64,
    weight: f64,
    recency_decay: f64,
    history: HashMap<usize, Vec<[usize; 2]>>,
}

impl DiversityModel {
    /// Create a model with an empty history
    ///
    /// `radius` is measured in grid cells, `weight` is the penalty at
    /// distance zero for the most recent placement and `recency_decay`
    /// in (0, 1] scales each older placement.
    pub fn new(radius: f64, weight: f64, recency_decay: f64) -> Self {
        Self {
            radius: radius.max(0.0),
            weight: weight.max(0.0),
            recency_decay: recency_decay.clamp(f64::MIN_POSITIVE, 1.0),
            history: HashMap::new(),
        }
    }

    /// A model that never penalizes
    pub fn disabled() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Radius in grid cells
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Penalty at distance zero
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Factor applied per newer placement
    pub const fn recency_decay(&self) -> f64 {
        self.recency_decay
    }

    /// Check whether the model can change any cost
    pub fn is_active(&self) -> bool {
        self.radius > 0.0 && self.weight > 0.0
    }

    /// Check whether older placements weigh less than newer ones
    pub fn decays(&self) -> bool {
        self.recency_decay < 1.0
    }

    /// Penalty for placing `tile` at `position` (row, col)
    pub fn penalty(&self, position: [usize; 2], tile: usize) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        let Some(placements) = self.history.get(&tile) else {
            return 0.0;
        };

        let mut total = 0.0;
        let mut factor = 1.0;
        for &placed in placements.iter().rev() {
            let d = grid_distance(position, placed);
            if d <= self.radius {
                total += self.weight * (1.0 - d / (self.radius + 1.0)) * factor;
            }
            factor *= self.recency_decay;
        }
        total
    }

    /// Append a placement of `tile` at `position`
    pub fn record(&mut self, position: [usize; 2], tile: usize) {
        self.history.entry(tile).or_default().push(position);
    }

    /// Forget every placement
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Placements of `tile` in commit order
    pub fn placements(&self, tile: usize) -> &[[usize; 2]] {
        self.history.get(&tile).map_or(&[], Vec::as_slice)
    }

    /// Grid positions within the radius of `position` on a grid of `dims`
    /// (rows, cols), in row-major order
    pub fn cells_within(&self, position: [usize; 2], dims: (usize, usize)) -> Vec<[usize; 2]> {
        let (rows, cols) = dims;
        if rows == 0 || cols == 0 || position[0] >= rows || position[1] >= cols {
            return Vec::new();
        }

        let reach = self.radius.floor() as usize;
        let row_end = position[0].saturating_add(reach).min(rows - 1);
        let col_end = position[1].saturating_add(reach).min(cols - 1);

        let mut cells = Vec::new();
        for row in position[0].saturating_sub(reach)..=row_end {
            for col in position[1].saturating_sub(reach)..=col_end {
                if grid_distance(position, [row, col]) <= self.radius {
                    cells.push([row, col]);
                }
            }
        }
        cells
    }
}

impl Default for DiversityModel {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Euclidean distance between grid coordinates
pub fn grid_distance(a: [usize; 2], b: [usize; 2]) -> f64 {
    let dr = a[0].abs_diff(b[0]) as f64;
    let dc = a[1].abs_diff(b[1]) as f64;
    dr.hypot(dc)
}
