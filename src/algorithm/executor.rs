//! Mosaic pipeline: normalize, grid, solve, render
//!
//! `MosaicRun` sequences the stages for one target. Every stage is also
//! exposed on its own so a caller can normalize a pool once and reuse it
//! for several targets with the same cell size.

use crate::algorithm::costs::CostMatrix;
use crate::algorithm::diversity::DiversityModel;
use crate::algorithm::solver::{
    Assignment, AssignmentSolver, CancellationToken, SolverOptions, SolverStrategy,
};
use crate::io::configuration::MosaicConfig;
use crate::io::error::{MosaicError, Result, invalid_image};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::canvas::{MosaicRenderer, RenderOptions};
use crate::spatial::geometry::{auto_orient, derive_cell_size, scaled_size};
use crate::spatial::grid::{CellGrid, GridBuilder, prepare_target};
use crate::spatial::tiles::{SourcePool, TileNormalizer, TilePool};
use image::RgbaImage;
use std::time::Instant;

/// Pipeline stages reported to observers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Cropping and resizing the pool
    Normalizing {
        /// Pool size
        tiles: usize,
    },
    /// Cutting the target into cells
    Gridding,
    /// Assigning tiles to cells
    Solving {
        /// Grid size
        cells: usize,
    },
    /// Compositing the canvas
    Rendering,
}

/// Receives progress from a running pipeline
///
/// Every method has an empty default so observers implement only what
/// they display.
pub trait RunObserver {
    /// A stage is starting
    fn stage(&mut self, _stage: Stage) {}

    /// A cell was committed by the solver
    fn assigned(&mut self, _done: usize, _total: usize) {}
}

/// Observer that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Everything a finished run produced
#[derive(Clone, Debug)]
pub struct MosaicOutput {
    /// Composited mosaic
    pub canvas: RgbaImage,
    /// Cells with their assigned tiles and tilt
    pub grid: CellGrid,
    /// Solver result
    pub assignment: Assignment,
    /// Strategy the solver actually ran
    pub strategy: SolverStrategy,
}

/// One configured mosaic run
#[derive(Clone, Debug)]
pub struct MosaicRun<'a> {
    config: &'a MosaicConfig,
    cancel: CancellationToken,
}

impl<'a> MosaicRun<'a> {
    /// Create a run for a configuration
    pub fn new(config: &'a MosaicConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a token the caller can set from another thread
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Configuration of this run
    pub const fn config(&self) -> &MosaicConfig {
        self.config
    }

    /// Output size for a target: the configured final size turned to the
    /// target's orientation, or the target size itself
    pub fn output_size(&self, target: (u32, u32)) -> (u32, u32) {
        self.config
            .final_dimensions()
            .map_or(target, |size| auto_orient(target, size))
    }

    /// Cell size: the configured one, or derived from the pool's median
    /// aspect, its size and the redundancy
    ///
    /// # Errors
    ///
    /// Returns `InsufficientTiles` if the size must be derived from an
    /// empty pool and `InvalidDimensions` if the derived size is empty
    pub fn cell_size(&self, output: (u32, u32), sources: &SourcePool) -> Result<(u32, u32)> {
        if let Some(size) = self.config.cell_dimensions() {
            return Ok(size);
        }

        let aspect = sources.median_aspect().ok_or(MosaicError::InsufficientTiles {
            tiles: sources.len(),
            cells: 0,
        })?;
        let size = derive_cell_size(output, sources.len(), aspect, self.config.redundancy);
        if size.0 == 0 || size.1 == 0 {
            return Err(MosaicError::InvalidDimensions {
                image: output,
                cell: size,
                reason: "derived cell size is empty",
            });
        }
        log::debug!(
            "derived cell size {}x{} from {} tiles at aspect {}:{}",
            size.0,
            size.1,
            sources.len(),
            aspect.0,
            aspect.1
        );
        Ok(size)
    }

    /// Normalize the pool to the render size of `cell_size`
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` naming the first tile that fails
    pub fn normalize(&self, sources: &SourcePool, cell_size: (u32, u32)) -> Result<TilePool> {
        let render_size = scaled_size(cell_size, self.config.effective_overscan());
        let normalizer = TileNormalizer::new(render_size, self.config.signature);
        let start = Instant::now();
        let pool = sources.normalize(&normalizer)?;
        log::debug!(
            "normalized {} tiles to {}x{} in {:.2?}",
            pool.len(),
            render_size.0,
            render_size.1,
            start.elapsed()
        );
        Ok(pool)
    }

    /// Full pipeline from raw buffers
    ///
    /// # Errors
    ///
    /// Returns any error of the configuration check, normalization, grid
    /// building, solving or rendering
    pub fn execute(
        &self,
        target: &PixelBuffer,
        sources: &SourcePool,
        observer: &mut dyn RunObserver,
    ) -> Result<MosaicOutput> {
        self.config.validate()?;

        let target = target.to_rgba();
        let output = self.output_size(target.dimensions());
        let cell_size = self.cell_size(output, sources)?;

        self.check_cancelled(0, 0)?;
        observer.stage(Stage::Normalizing {
            tiles: sources.len(),
        });
        let pool = self.normalize(sources, cell_size)?;

        self.execute_with_pool(&target, &pool, cell_size, observer)
    }

    /// Pipeline from a decoded target and an already normalized pool
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidImage` if the target is empty
    /// - `InvalidDimensions` if the target cannot hold one cell
    /// - `InsufficientTiles` if the pool cannot cover the grid
    /// - `Cancelled` if the run was cancelled
    /// - `CanvasBounds` if a tile leaves the canvas with clipping disabled
    pub fn execute_with_pool(
        &self,
        target: &RgbaImage,
        pool: &TilePool,
        cell_size: (u32, u32),
        observer: &mut dyn RunObserver,
    ) -> Result<MosaicOutput> {
        let config = self.config;
        config.validate()?;
        if target.width() == 0 || target.height() == 0 {
            return Err(invalid_image(&"target image has a zero dimension"));
        }

        let start = Instant::now();
        let output = self.output_size(target.dimensions());
        let prepared = prepare_target(target, Some(output), config.crop_shift);

        observer.stage(Stage::Gridding);
        let mut grid = GridBuilder::new(cell_size)
            .with_shift(config.pixel_shift)
            .with_jitter(config.jitter, config.random_seed)
            .with_signature(config.signature)
            .build(&prepared)?;
        log::debug!(
            "grid {}x{} of {}x{} cells over {}x{}",
            grid.cols(),
            grid.rows(),
            cell_size.0,
            cell_size.1,
            output.0,
            output.1
        );

        self.check_cancelled(0, grid.len())?;
        let tile_signatures: Vec<_> = pool.tiles().iter().map(|tile| tile.signature).collect();
        let costs = CostMatrix::compute(&grid.signatures(), &tile_signatures, config.color_metric)?;

        let mut solver = AssignmentSolver::new(
            SolverOptions {
                allow_reuse: config.allow_tile_reuse,
                balanced_reuse: config.balanced_reuse,
                strategy: config.strategy,
                optimal_cell_limit: config.optimal_cell_limit,
            },
            DiversityModel::new(
                config.diversity_radius,
                config.diversity_weight,
                config.recency_decay,
            ),
        );
        let strategy = solver.resolve_strategy(grid.len())?;

        observer.stage(Stage::Solving { cells: grid.len() });
        let assignment = solver.solve(
            &costs,
            grid.dimensions(),
            &self.cancel,
            &mut |done, total| observer.assigned(done, total),
        )?;
        grid.assign(&assignment.tiles)?;

        self.check_cancelled(assignment.len(), grid.len())?;
        observer.stage(Stage::Rendering);
        let renderer = MosaicRenderer::new(RenderOptions {
            tilt_max_degrees: config.tilt_max_degrees,
            color_correction: config.color_correction,
            background: config.background,
            clip: config.clip,
            seed: config.random_seed,
        });
        let canvas = renderer.render(&mut grid, pool, &assignment.order)?;

        log::info!(
            "mosaic {}x{}: {} cells from {} tiles ({strategy:?}), total cost {:.1}, {:.2?}",
            canvas.width(),
            canvas.height(),
            grid.len(),
            pool.len(),
            assignment.total_cost,
            start.elapsed()
        );

        Ok(MosaicOutput {
            canvas,
            grid,
            assignment,
            strategy,
        })
    }

    fn check_cancelled(&self, assigned: usize, cells: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(MosaicError::Cancelled { assigned, cells })
        } else {
            Ok(())
        }
    }
}

/// Build a mosaic canvas with default observation and no cancellation
///
/// # Errors
///
/// Returns any error of [`MosaicRun::execute`]
pub fn build_mosaic(
    target: &PixelBuffer,
    sources: &SourcePool,
    config: &MosaicConfig,
) -> Result<RgbaImage> {
    MosaicRun::new(config)
        .execute(target, sources, &mut NoopObserver)
        .map(|output| output.canvas)
}
