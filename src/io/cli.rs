//! Command-line interface for building mosaics of one target or a directory of targets

use crate::algorithm::executor::{MosaicRun, NoopObserver};
use crate::algorithm::solver::SolverStrategy;
use crate::analysis::metric::ColorMetric;
use crate::io::configuration::{MosaicConfig, OUTPUT_SUFFIX};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::image::{collect_images, is_supported, load_buffer, load_pool, save_canvas};
use crate::io::progress::ProgressManager;
use crate::spatial::tiles::{SourcePool, TilePool};
use clap::{ArgAction, Parser};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "photomosaic")]
#[command(
    author,
    version,
    about = "Build photographic mosaics from a pool of tile images"
)]
/// Command-line arguments for the mosaic builder
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Target image or directory of target images
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Directory of tile images, searched recursively
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Output file, or output directory when TARGET is a directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cell size in pixels, e.g. 60x80
    #[arg(long, value_parser = parse_size)]
    pub cell_size: Option<[u32; 2]>,

    /// Output size in pixels, e.g. 3000x4000
    #[arg(long, value_parser = parse_size)]
    pub final_size: Option<[u32; 2]>,

    /// Intended average uses per tile when deriving the cell size
    #[arg(long)]
    pub redundancy: Option<f64>,

    /// Diversity radius in grid cells
    #[arg(long)]
    pub diversity_radius: Option<f64>,

    /// Let one tile fill several cells
    #[arg(long)]
    pub reuse: bool,

    /// Maximum random tilt in degrees
    #[arg(long)]
    pub tilt: Option<f64>,

    /// Grid offset in pixels, e.g. 10,5
    #[arg(long, value_parser = parse_shift)]
    pub shift: Option<[u32; 2]>,

    /// Color metric: euclidean, luminance-weighted or redmean
    #[arg(long, value_parser = parse_metric)]
    pub metric: Option<ColorMetric>,

    /// Assignment strategy: greedy, optimal or auto
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<SolverStrategy>,

    /// Random seed for jitter and tilt
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Process targets even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Suppress progress output and informational logs
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write debug logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Configuration file values with the flags applied on top
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `FileSystem` or `Configuration` if the file cannot be read or parsed
    /// - `InvalidParameter` if the merged values are out of range
    pub fn load_config(&self) -> Result<MosaicConfig> {
        let mut config = match &self.config {
            Some(path) => MosaicConfig::from_file(path)?,
            None => MosaicConfig::default(),
        };

        if self.cell_size.is_some() {
            config.cell_size = self.cell_size;
        }
        if self.final_size.is_some() {
            config.final_size = self.final_size;
        }
        if let Some(redundancy) = self.redundancy {
            config.redundancy = redundancy;
        }
        if let Some(radius) = self.diversity_radius {
            config.diversity_radius = radius;
        }
        if self.reuse {
            config.allow_tile_reuse = true;
        }
        if let Some(tilt) = self.tilt {
            config.tilt_max_degrees = tilt;
        }
        if let Some(shift) = self.shift {
            config.pixel_shift = shift;
        }
        if let Some(metric) = self.metric {
            config.color_metric = metric;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// Where the mosaic of `target` is written
    pub fn output_path(&self, target: &Path) -> PathBuf {
        let default_name = suffixed_name(target);
        match &self.output {
            Some(output) if self.target.is_dir() => output.join(default_name),
            Some(output) => output.clone(),
            None => target
                .parent()
                .map_or_else(|| PathBuf::from(&default_name), |parent| parent.join(&default_name)),
        }
    }
}

/// Parse `WxH` into [width, height]
///
/// # Errors
///
/// Returns a message if the text is not two positive integers joined by `x`
pub fn parse_size(text: &str) -> std::result::Result<[u32; 2], String> {
    parse_pair(text, &['x', 'X']).and_then(|[w, h]| {
        if w == 0 || h == 0 {
            Err(format!("size '{text}' must be positive"))
        } else {
            Ok([w, h])
        }
    })
}

/// Parse `X,Y` into [x, y]
///
/// # Errors
///
/// Returns a message if the text is not two integers joined by a comma
pub fn parse_shift(text: &str) -> std::result::Result<[u32; 2], String> {
    parse_pair(text, &[','])
}

fn parse_pair(text: &str, separators: &[char]) -> std::result::Result<[u32; 2], String> {
    let (first, second) = text
        .split_once(separators)
        .ok_or_else(|| format!("expected two values in '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid number '{part}': {e}"))
    };
    Ok([parse(first)?, parse(second)?])
}

fn parse_metric(text: &str) -> std::result::Result<ColorMetric, String> {
    ColorMetric::from_name(text).ok_or_else(|| format!("unknown color metric '{text}'"))
}

fn parse_strategy(text: &str) -> std::result::Result<SolverStrategy, String> {
    SolverStrategy::from_name(text).ok_or_else(|| format!("unknown strategy '{text}'"))
}

fn suffixed_name(target: &Path) -> String {
    let stem = target.file_stem().unwrap_or_default();
    let extension = target.extension().unwrap_or_default();
    format!(
        "{}{}.{}",
        stem.to_string_lossy(),
        OUTPUT_SUFFIX,
        extension.to_string_lossy()
    )
}

fn is_output(path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX))
}

/// Orchestrates batch processing of targets with progress tracking
pub struct MosaicProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MosaicProcessor {
    /// Create a new processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process targets according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the target or tile
    /// directory cannot be read, or a mosaic fails to build or save
    pub fn process(&mut self) -> Result<()> {
        let config = self.cli.load_config()?;
        let targets = self.collect_targets()?;

        if targets.is_empty() {
            return Ok(());
        }

        let sources = load_pool(&self.cli.tiles)?;
        let mut pools = HashMap::new();

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(targets.len());
        }

        for (index, target) in targets.iter().enumerate() {
            self.process_target(target, index, &config, &sources, &mut pools)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn collect_targets(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        let candidates = if target.is_file() {
            if !is_supported(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file is not a supported image",
                ));
            }
            vec![target.clone()]
        } else if target.is_dir() {
            collect_images(target)?
                .into_iter()
                .filter(|path| !is_output(path))
                .collect()
        } else {
            return Err(MosaicError::FileSystem {
                path: target.clone(),
                operation: "open target",
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "target must be an image file or directory",
                ),
            });
        };

        Ok(candidates
            .into_iter()
            .filter(|path| self.should_process(path))
            .collect())
    }

    fn should_process(&self, target: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = self.cli.output_path(target);
        if output_path.exists() {
            log::info!("skipping {} (output exists)", target.display());
            false
        } else {
            true
        }
    }

    fn process_target(
        &mut self,
        target_path: &Path,
        index: usize,
        config: &MosaicConfig,
        sources: &SourcePool,
        pools: &mut HashMap<(u32, u32), TilePool>,
    ) -> Result<()> {
        let start_time = Instant::now();
        let output_path = self.cli.output_path(target_path);

        let target = load_buffer(target_path)?.to_rgba();
        let run = MosaicRun::new(config);
        let cell_size = run.cell_size(run.output_size(target.dimensions()), sources)?;

        // Targets sharing a cell size share one normalized pool
        let pool = match pools.entry(cell_size) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(run.normalize(sources, cell_size)?),
        };

        let output = if let Some(ref mut pm) = self.progress_manager {
            let mut progress = pm.start_target(index, target_path);
            run.execute_with_pool(&target, pool, cell_size, &mut progress)?
        } else {
            run.execute_with_pool(&target, pool, cell_size, &mut NoopObserver)?
        };

        save_canvas(&output.canvas, &output_path)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_target(index);
        }
        log::info!(
            "wrote {} in {:.2?}",
            output_path.display(),
            start_time.elapsed()
        );

        Ok(())
    }
}
