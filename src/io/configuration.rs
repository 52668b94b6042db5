//! Run configuration, its defaults and the constants shared by the CLI

use crate::algorithm::solver::{OPTIMAL_CELL_LIMIT, SolverStrategy};
use crate::analysis::metric::ColorMetric;
use crate::analysis::signature::SignatureKind;
use crate::io::error::{MosaicError, Result, WithContext, invalid_parameter};
use serde::Deserialize;
use std::path::Path;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;
/// Intended average number of uses per tile when deriving the cell size
pub const DEFAULT_REDUNDANCY: f64 = 1.0;
/// Diversity radius in grid cells
pub const DEFAULT_DIVERSITY_RADIUS: f64 = 2.0;
/// Penalty at distance zero, on the scale of color distances
pub const DEFAULT_DIVERSITY_WEIGHT: f64 = 20.0;

// Tilted tiles are drawn larger so rotation does not open gaps
/// Overscan used when tilt is enabled and none is configured
pub const TILT_OVERSCAN: f64 = 1.1;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_mosaic";
/// Image extensions collected from tile and target directories
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

/// Every tunable of a mosaic run
///
/// Deserialized from TOML with camelCase keys. Missing keys take their
/// defaults and unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MosaicConfig {
    /// Cell size in pixels (width, height), derived from the pool if unset
    pub cell_size: Option<[u32; 2]>,
    /// Output size in pixels (width, height), the target size if unset
    pub final_size: Option<[u32; 2]>,
    /// Intended average number of uses per tile when deriving the cell size
    pub redundancy: f64,
    /// Diversity radius in grid cells
    pub diversity_radius: f64,
    /// Diversity penalty at distance zero
    pub diversity_weight: f64,
    /// Penalty factor per newer placement of the same tile, in (0, 1]
    pub recency_decay: f64,
    /// Let one tile fill several cells
    pub allow_tile_reuse: bool,
    /// With reuse, cap each tile at `ceil(cells / tiles)` placements
    pub balanced_reuse: bool,
    /// Maximum absolute tilt in degrees
    pub tilt_max_degrees: f64,
    /// Global offset of the cell grid in pixels (x, y)
    pub pixel_shift: [u32; 2],
    /// Relative position of the target crop, in [-0.5, 0.5]
    pub crop_shift: f64,
    /// Maximum per-cell jitter in pixels
    pub jitter: u32,
    /// Distance between color signatures
    pub color_metric: ColorMetric,
    /// Statistics carried by signatures
    pub signature: SignatureKind,
    /// Assignment algorithm
    pub strategy: SolverStrategy,
    /// Largest grid the `auto` strategy solves exactly
    pub optimal_cell_limit: usize,
    /// Render size of tiles relative to the cell, at least 1
    pub overscan: Option<f64>,
    /// Strength of the shift towards each cell's color, in [0, 1]
    pub color_correction: f64,
    /// Clip tiles at the canvas edge instead of failing
    pub clip: bool,
    /// Canvas fill color (RGBA)
    pub background: [u8; 4],
    /// Seed for jitter and tilt
    pub random_seed: u64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            cell_size: None,
            final_size: None,
            redundancy: DEFAULT_REDUNDANCY,
            diversity_radius: DEFAULT_DIVERSITY_RADIUS,
            diversity_weight: DEFAULT_DIVERSITY_WEIGHT,
            recency_decay: 1.0,
            allow_tile_reuse: false,
            balanced_reuse: true,
            tilt_max_degrees: 0.0,
            pixel_shift: [0, 0],
            crop_shift: 0.0,
            jitter: 0,
            color_metric: ColorMetric::default(),
            signature: SignatureKind::default(),
            strategy: SolverStrategy::default(),
            optimal_cell_limit: OPTIMAL_CELL_LIMIT,
            overscan: None,
            color_correction: 0.0,
            clip: true,
            background: [0, 0, 0, 255],
            random_seed: DEFAULT_SEED,
        }
    }
}

impl MosaicConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the document is malformed, has unknown
    /// keys or values of the wrong type
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| MosaicError::Configuration {
            path: "<inline>".into(),
            source,
        })
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the file cannot be read and `Configuration`
    /// if it cannot be parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "read configuration",
            source,
        })?;
        Self::from_toml_str(&text).with_path(path)
    }

    /// Overscan actually used: the configured one, or 1.1 with tilt
    pub fn effective_overscan(&self) -> f64 {
        self.overscan.unwrap_or(if self.tilt_max_degrees > 0.0 {
            TILT_OVERSCAN
        } else {
            1.0
        })
    }

    /// Cell size as a tuple
    pub fn cell_dimensions(&self) -> Option<(u32, u32)> {
        self.cell_size.map(|[w, h]| (w, h))
    }

    /// Final size as a tuple
    pub fn final_dimensions(&self) -> Option<(u32, u32)> {
        self.final_size.map(|[w, h]| (w, h))
    }

    /// Check every value range
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending key
    pub fn validate(&self) -> Result<()> {
        if let Some([w, h]) = self.cell_size {
            if w == 0 || h == 0 {
                return Err(invalid_parameter(
                    "cellSize",
                    &format!("{w}x{h}"),
                    &"cell dimensions must be positive",
                ));
            }
            if self.pixel_shift[0] >= w || self.pixel_shift[1] >= h {
                return Err(invalid_parameter(
                    "pixelShift",
                    &format!("{},{}", self.pixel_shift[0], self.pixel_shift[1]),
                    &"shift must be smaller than the cell",
                ));
            }
        }
        if let Some([w, h]) = self.final_size {
            if w == 0 || h == 0 {
                return Err(invalid_parameter(
                    "finalSize",
                    &format!("{w}x{h}"),
                    &"final dimensions must be positive",
                ));
            }
        }

        check_range("redundancy", self.redundancy, |v| v > 0.0, "must be positive")?;
        // A derived grid holds about tiles * redundancy cells
        if self.cell_size.is_none() && self.redundancy > 1.0 && !self.allow_tile_reuse {
            return Err(invalid_parameter(
                "redundancy",
                &self.redundancy,
                &"values above 1 need allowTileReuse",
            ));
        }
        check_range("diversityRadius", self.diversity_radius, |v| v >= 0.0, "must not be negative")?;
        check_range("diversityWeight", self.diversity_weight, |v| v >= 0.0, "must not be negative")?;
        check_range(
            "recencyDecay",
            self.recency_decay,
            |v| v > 0.0 && v <= 1.0,
            "must be in (0, 1]",
        )?;
        check_range(
            "tiltMaxDegrees",
            self.tilt_max_degrees,
            |v| (0.0..=180.0).contains(&v),
            "must be in [0, 180]",
        )?;
        check_range(
            "cropShift",
            self.crop_shift,
            |v| (-0.5..=0.5).contains(&v),
            "must be in [-0.5, 0.5]",
        )?;
        check_range(
            "colorCorrection",
            self.color_correction,
            |v| (0.0..=1.0).contains(&v),
            "must be in [0, 1]",
        )?;
        if let Some(overscan) = self.overscan {
            check_range("overscan", overscan, |v| v >= 1.0, "must be at least 1")?;
        }
        Ok(())
    }
}

fn check_range(
    parameter: &'static str,
    value: f64,
    accept: impl Fn(f64) -> bool,
    reason: &str,
) -> Result<()> {
    if value.is_finite() && accept(value) {
        Ok(())
    } else {
        Err(invalid_parameter(parameter, &value, &reason))
    }
}
