//! Cell to tile assignment
//!
//! The greedy loop keeps every open cell's best candidate in a min-heap and
//! commits the global minimum each step. Only the candidates a commit can
//! change are re-evaluated: the committed tile's costs inside the diversity
//! radius, and cells whose best tile ran out of quota. Stale heap entries
//! are skipped through per-cell version numbers.

use crate::algorithm::availability::{Quota, TileAvailability};
use crate::algorithm::costs::CostMatrix;
use crate::algorithm::diversity::DiversityModel;
use crate::algorithm::optimal::solve_optimal;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use serde::Deserialize;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Default grid size up to which `auto` picks the exact solver
pub const OPTIMAL_CELL_LIMIT: usize = 1024;

/// Assignment algorithm selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverStrategy {
    /// Greedy global-minimum matching with diversity feedback
    Greedy,
    /// Exact minimum total color distance, requires reuse disabled
    Optimal,
    /// Optimal when its preconditions hold on a small grid, otherwise greedy
    #[default]
    Auto,
}

impl SolverStrategy {
    /// Parse a strategy name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "greedy" => Some(Self::Greedy),
            "optimal" | "hungarian" => Some(Self::Optimal),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// Cloneable flag for stopping a run from another thread
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Total mapping from cells to tiles
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Tile index per cell, row-major
    pub tiles: Vec<usize>,
    /// Cell indices in commit order
    pub order: Vec<usize>,
    /// Sum of the committed costs
    pub total_cost: f64,
}

impl Assignment {
    /// Number of assigned cells
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if no cell is assigned
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile assigned to a cell
    pub fn tile_for(&self, cell: usize) -> Option<usize> {
        self.tiles.get(cell).copied()
    }

    /// Number of cells holding a tile
    pub fn uses(&self, tile: usize) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Check that no tile is used twice
    pub fn is_injective(&self) -> bool {
        let distinct: BTreeSet<usize> = self.tiles.iter().copied().collect();
        distinct.len() == self.tiles.len()
    }
}

/// Options controlling capacity and algorithm choice
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    /// Let tiles fill more than one cell
    pub allow_reuse: bool,
    /// With reuse, cap each tile at `ceil(cells / tiles)` placements
    pub balanced_reuse: bool,
    /// Algorithm selection
    pub strategy: SolverStrategy,
    /// Largest grid `auto` hands to the exact solver
    pub optimal_cell_limit: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            allow_reuse: false,
            balanced_reuse: true,
            strategy: SolverStrategy::Auto,
            optimal_cell_limit: OPTIMAL_CELL_LIMIT,
        }
    }
}

/// Heap entry: the best known tile for one cell
#[derive(Clone, Copy, Debug)]
struct Candidate {
    cost: f64,
    cell: usize,
    tile: usize,
    version: u64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.cell.cmp(&other.cell))
            .then(self.tile.cmp(&other.tile))
            .then(self.version.cmp(&other.version))
    }
}

/// Counters reported after a greedy run
#[derive(Clone, Copy, Debug, Default)]
pub struct SolverStats {
    /// Heap entries popped
    pub pops: usize,
    /// Popped entries skipped as outdated
    pub stale: usize,
    /// Full best-tile scans after the initial pass
    pub rescans: usize,
}

/// Greedy matcher with diversity feedback and an exact fallback
#[derive(Clone, Debug)]
pub struct AssignmentSolver {
    options: SolverOptions,
    diversity: DiversityModel,
    stats: SolverStats,
}

impl AssignmentSolver {
    /// Create a solver owning the run's diversity model
    pub const fn new(options: SolverOptions, diversity: DiversityModel) -> Self {
        Self {
            options,
            diversity,
            stats: SolverStats {
                pops: 0,
                stale: 0,
                rescans: 0,
            },
        }
    }

    /// Diversity model with the history of the last run
    pub const fn diversity(&self) -> &DiversityModel {
        &self.diversity
    }

    /// Counters of the last greedy run
    pub const fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Configured options
    pub const fn options(&self) -> SolverOptions {
        self.options
    }

    /// Strategy that will actually run for a grid of `cells` cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `optimal` is requested together with
    /// tile reuse
    pub fn resolve_strategy(&self, cells: usize) -> Result<SolverStrategy> {
        // Without reuse a tile is never placed twice, so the penalty stays zero
        let exact_allowed = !self.options.allow_reuse;
        match self.options.strategy {
            SolverStrategy::Greedy => Ok(SolverStrategy::Greedy),
            SolverStrategy::Optimal if exact_allowed => Ok(SolverStrategy::Optimal),
            SolverStrategy::Optimal => Err(invalid_parameter(
                "strategy",
                &"optimal",
                &"the optimal solver needs tile reuse disabled",
            )),
            SolverStrategy::Auto => {
                if exact_allowed && cells <= self.options.optimal_cell_limit {
                    Ok(SolverStrategy::Optimal)
                } else {
                    Ok(SolverStrategy::Greedy)
                }
            }
        }
    }

    /// Assign every cell of a `dims` (rows, cols) grid a tile
    ///
    /// `on_commit` receives (assigned, total) after each committed cell.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InsufficientTiles` if the pool is empty, or smaller than the grid
    ///   without reuse
    /// - `InvalidParameter` if `dims` does not match the matrix or the
    ///   strategy cannot run with these options
    /// - `Cancelled` if `cancel` is set before the last cell is committed
    pub fn solve(
        &mut self,
        costs: &CostMatrix,
        dims: (usize, usize),
        cancel: &CancellationToken,
        on_commit: &mut dyn FnMut(usize, usize),
    ) -> Result<Assignment> {
        let cells = costs.cells();
        let tiles = costs.tiles();

        if dims.0 * dims.1 != cells {
            return Err(invalid_parameter(
                "gridDimensions",
                &format!("{}x{}", dims.0, dims.1),
                &format!("grid does not match the {cells} cost rows"),
            ));
        }
        if tiles == 0 || (!self.options.allow_reuse && tiles < cells) {
            return Err(MosaicError::InsufficientTiles { tiles, cells });
        }

        self.diversity.reset();
        self.stats = SolverStats::default();
        if cells == 0 {
            return Ok(Assignment {
                tiles: Vec::new(),
                order: Vec::new(),
                total_cost: 0.0,
            });
        }

        match self.resolve_strategy(cells)? {
            SolverStrategy::Optimal => self.solve_exact(costs, dims, cancel, on_commit),
            SolverStrategy::Greedy | SolverStrategy::Auto => {
                self.solve_greedy(costs, dims, cancel, on_commit)
            }
        }
    }

    fn solve_exact(
        &mut self,
        costs: &CostMatrix,
        dims: (usize, usize),
        cancel: &CancellationToken,
        on_commit: &mut dyn FnMut(usize, usize),
    ) -> Result<Assignment> {
        let cells = costs.cells();
        let tiles = solve_optimal(costs, cancel, &mut |row, rows| {
            if row % 64 == 0 {
                log::trace!("exact solver matched {row} of {rows} rows");
            }
        })?;

        // Best matches commit first so they end up drawn on top
        let mut order: Vec<usize> = (0..cells).collect();
        order.sort_by(|&a, &b| {
            let cost_a = tile_cost(costs, &tiles, a);
            let cost_b = tile_cost(costs, &tiles, b);
            cost_a.total_cmp(&cost_b).then(a.cmp(&b))
        });

        let mut total_cost = 0.0;
        for (step, &cell) in order.iter().enumerate() {
            total_cost += tile_cost(costs, &tiles, cell);
            if let Some(&tile) = tiles.get(cell) {
                self.diversity.record(position_of(cell, dims.1), tile);
            }
            on_commit(step + 1, cells);
        }

        log::debug!("optimal assignment of {cells} cells, total cost {total_cost:.3}");
        Ok(Assignment {
            tiles,
            order,
            total_cost,
        })
    }

    fn solve_greedy(
        &mut self,
        costs: &CostMatrix,
        dims: (usize, usize),
        cancel: &CancellationToken,
        on_commit: &mut dyn FnMut(usize, usize),
    ) -> Result<Assignment> {
        let cells = costs.cells();
        let tile_count = costs.tiles();
        let cols = dims.1;
        let quota = Quota::for_run(
            self.options.allow_reuse,
            self.options.balanced_reuse,
            cells,
            tile_count,
        );
        let mut availability = TileAvailability::new(tile_count, quota);

        let mut assigned: Vec<Option<usize>> = vec![None; cells];
        let mut best: Vec<Option<(usize, f64)>> = vec![None; cells];
        let mut versions = vec![0_u64; cells];
        let mut heap = BinaryHeap::with_capacity(cells);

        for cell in 0..cells {
            let found = self.best_tile(costs, &availability, cell, cols);
            if let (Some((tile, cost)), Some(slot)) = (found, best.get_mut(cell)) {
                *slot = Some((tile, cost));
                heap.push(Reverse(Candidate {
                    cost,
                    cell,
                    tile,
                    version: 0,
                }));
            }
        }

        let mut order = Vec::with_capacity(cells);
        let mut total_cost = 0.0;

        while order.len() < cells {
            if cancel.is_cancelled() {
                return Err(MosaicError::Cancelled {
                    assigned: order.len(),
                    cells,
                });
            }

            let Some(Reverse(candidate)) = heap.pop() else {
                // Quotas always cover the grid, so this means the pool ran dry
                return Err(MosaicError::InsufficientTiles {
                    tiles: tile_count,
                    cells,
                });
            };
            self.stats.pops += 1;

            let open = assigned.get(candidate.cell).is_some_and(Option::is_none);
            let current = versions.get(candidate.cell) == Some(&candidate.version);
            if !open || !current {
                self.stats.stale += 1;
                continue;
            }

            let Candidate {
                cell, tile, cost, ..
            } = candidate;
            if let Some(slot) = assigned.get_mut(cell) {
                *slot = Some(tile);
            }
            order.push(cell);
            total_cost += cost;

            let exhausted = availability.consume(tile);
            let position = position_of(cell, cols);
            self.diversity.record(position, tile);
            on_commit(order.len(), cells);

            let mut rescan = BTreeSet::new();

            // The committed tile's penalty changed around its placements
            if self.diversity.is_active() && availability.is_available(tile) {
                for other in self.affected_cells(tile, position, dims) {
                    if assigned.get(other).is_some_and(Option::is_some) {
                        continue;
                    }
                    let updated = costs.get(other, tile)
                        + self.diversity.penalty(position_of(other, cols), tile);
                    match best.get(other).copied().flatten() {
                        Some((held, held_cost)) if held == tile => {
                            if updated > held_cost {
                                rescan.insert(other);
                            } else if updated < held_cost {
                                set_best(&mut best, &mut versions, &mut heap, other, tile, updated);
                            }
                        }
                        Some((held, held_cost)) => {
                            let better = updated
                                .total_cmp(&held_cost)
                                .then(tile.cmp(&held))
                                .is_lt();
                            if better {
                                set_best(&mut best, &mut versions, &mut heap, other, tile, updated);
                            }
                        }
                        None => {
                            rescan.insert(other);
                        }
                    }
                }
            }

            // Cells waiting on a tile that just ran out look elsewhere
            if exhausted {
                for (other, slot) in best.iter().enumerate() {
                    let waiting = matches!(slot, Some((held, _)) if *held == tile);
                    if waiting && assigned.get(other).is_some_and(Option::is_none) {
                        rescan.insert(other);
                    }
                }
            }

            for other in rescan {
                self.stats.rescans += 1;
                match self.best_tile(costs, &availability, other, cols) {
                    Some((next, next_cost)) => {
                        set_best(&mut best, &mut versions, &mut heap, other, next, next_cost);
                    }
                    None => {
                        if let Some(slot) = best.get_mut(other) {
                            *slot = None;
                        }
                    }
                }
            }
        }

        let tiles = assigned.into_iter().flatten().collect::<Vec<_>>();
        if tiles.len() != cells {
            return Err(MosaicError::InsufficientTiles {
                tiles: tile_count,
                cells,
            });
        }

        log::debug!(
            "greedy assignment of {cells} cells: {} pops, {} stale, {} rescans, total cost {total_cost:.3}",
            self.stats.pops,
            self.stats.stale,
            self.stats.rescans
        );
        Ok(Assignment {
            tiles,
            order,
            total_cost,
        })
    }

    /// Cheapest available tile for a cell, ties to the smaller tile index
    fn best_tile(
        &self,
        costs: &CostMatrix,
        availability: &TileAvailability,
        cell: usize,
        cols: usize,
    ) -> Option<(usize, f64)> {
        let position = position_of(cell, cols);
        availability
            .iter_available()
            .map(|tile| {
                let cost = costs.get(cell, tile) + self.diversity.penalty(position, tile);
                (tile, cost)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    /// Cells whose cost for `tile` may have changed after placing it at
    /// `position`
    fn affected_cells(&self, tile: usize, position: [usize; 2], dims: (usize, usize)) -> Vec<usize> {
        let mut cells = BTreeSet::new();
        let mut mark = |center: [usize; 2]| {
            for [row, col] in self.diversity.cells_within(center, dims) {
                cells.insert(row * dims.1 + col);
            }
        };

        if self.diversity.decays() {
            // Older placements weigh less now, so their neighborhoods move too
            for &placed in self.diversity.placements(tile) {
                mark(placed);
            }
        } else {
            mark(position);
        }
        cells.into_iter().collect()
    }
}

fn set_best(
    best: &mut [Option<(usize, f64)>],
    versions: &mut [u64],
    heap: &mut BinaryHeap<Reverse<Candidate>>,
    cell: usize,
    tile: usize,
    cost: f64,
) {
    let (Some(slot), Some(version)) = (best.get_mut(cell), versions.get_mut(cell)) else {
        return;
    };
    *slot = Some((tile, cost));
    *version += 1;
    heap.push(Reverse(Candidate {
        cost,
        cell,
        tile,
        version: *version,
    }));
}

fn tile_cost(costs: &CostMatrix, tiles: &[usize], cell: usize) -> f64 {
    tiles
        .get(cell)
        .map_or(f64::INFINITY, |&tile| costs.get(cell, tile))
}

/// Grid position (row, col) of a row-major cell index
pub const fn position_of(cell: usize, cols: usize) -> [usize; 2] {
    if cols == 0 {
        return [0, 0];
    }
    [cell / cols, cell % cols]
}
