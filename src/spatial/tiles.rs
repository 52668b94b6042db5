//! Tile pools and aspect/size normalization
//!
//! Raw pool images are cropped to a common aspect ratio and resized to the
//! render size once per run. The pools are plain values owned by the
//! caller, so repeated or concurrent runs never share hidden state.

use crate::analysis::signature::{ColorSignature, SignatureKind};
use crate::io::error::{Result, WithContext};
use crate::math::statistics::{limit_denominator, median};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::geometry::crop_center_rect;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use std::fmt;

/// Largest denominator used when approximating the pool's aspect ratio
pub const MAX_ASPECT_DENOMINATOR: u64 = 20;

const TILE_FILTER: FilterType = FilterType::Triangle;

/// Identifier of a tile, usually the source file name
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(String);

impl TileId {
    /// Create an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A decoded pool image before normalization
#[derive(Clone, Debug)]
pub struct TileSource {
    /// Tile identifier
    pub id: TileId,
    /// Raw decoded pixels
    pub buffer: PixelBuffer,
}

/// A candidate mosaic piece ready for matching and rendering
#[derive(Clone, Debug)]
pub struct Tile {
    /// Tile identifier
    pub id: TileId,
    /// Raw decoded pixels as supplied
    pub source: PixelBuffer,
    /// Cropped and resized pixels, immutable once built
    pub normalized: RgbaImage,
    /// Color summary of the normalized pixels
    pub signature: ColorSignature,
    /// Width over height of the raw pixels
    pub aspect_ratio: f64,
}

/// Caller-owned collection of raw pool images
#[derive(Clone, Debug, Default)]
pub struct SourcePool {
    sources: Vec<TileSource>,
}

impl SourcePool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoded image
    pub fn push(&mut self, id: impl Into<TileId>, buffer: PixelBuffer) {
        self.sources.push(TileSource {
            id: id.into(),
            buffer,
        });
    }

    /// Number of images in the pool
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the pool has no images
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Pool images in insertion order
    pub fn sources(&self) -> &[TileSource] {
        &self.sources
    }

    /// Median aspect ratio of the pool as a small integer ratio
    ///
    /// Returns `None` for an empty pool.
    pub fn median_aspect(&self) -> Option<(u32, u32)> {
        let ratios: Vec<f64> = self
            .sources
            .iter()
            .map(|source| source.buffer.aspect_ratio())
            .collect();
        let value = median(&ratios)?;
        let (num, den) = limit_denominator(value, MAX_ASPECT_DENOMINATOR);
        (num > 0).then_some((num as u32, den as u32))
    }

    /// Normalize every image in parallel, keeping pool order
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` naming the first tile that fails to normalize
    pub fn normalize(&self, normalizer: &TileNormalizer) -> Result<TilePool> {
        let tiles = self
            .sources
            .par_iter()
            .map(|source| normalizer.normalize(&source.id, &source.buffer))
            .collect::<Result<Vec<_>>>()?;
        Ok(TilePool {
            tiles,
            tile_size: normalizer.target_size(),
        })
    }
}

impl FromIterator<TileSource> for SourcePool {
    fn from_iter<I: IntoIterator<Item = TileSource>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

/// Normalized tiles sharing one render size
#[derive(Clone, Debug)]
pub struct TilePool {
    tiles: Vec<Tile>,
    tile_size: (u32, u32),
}

impl TilePool {
    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if the pool has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in pool order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile at a pool index
    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Size every normalized buffer shares (width, height)
    pub const fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }
}

/// Crops tiles to a common aspect and resizes them to the render size
#[derive(Clone, Copy, Debug)]
pub struct TileNormalizer {
    target_size: (u32, u32),
    signature: SignatureKind,
}

impl TileNormalizer {
    /// Normalizer producing `target_size` buffers; the aspect follows from it
    pub const fn new(target_size: (u32, u32), signature: SignatureKind) -> Self {
        Self {
            target_size,
            signature,
        }
    }

    /// Output dimensions (width, height)
    pub const fn target_size(&self) -> (u32, u32) {
        self.target_size
    }

    /// Crop and resize one image, then compute its signature
    ///
    /// Buffers already at the target size pass through unchanged, so
    /// normalizing a normalized buffer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` naming `id` if the buffer has a zero dimension
    /// or the target size is empty
    pub fn normalize(&self, id: &TileId, buffer: &PixelBuffer) -> Result<Tile> {
        let normalized = self.normalize_pixels(&buffer.to_rgba()).with_tile(id)?;
        let signature = ColorSignature::of_image(&normalized, self.signature);

        Ok(Tile {
            id: id.clone(),
            source: buffer.clone(),
            normalized,
            signature,
            aspect_ratio: buffer.aspect_ratio(),
        })
    }

    /// Crop and resize raw RGBA pixels to the target size
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the image or the target size is empty
    pub fn normalize_pixels(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        let (target_w, target_h) = self.target_size;
        if width == 0 || height == 0 {
            return Err(crate::io::error::invalid_image(&format!(
                "zero dimension ({width}x{height})"
            )));
        }
        if target_w == 0 || target_h == 0 {
            return Err(crate::io::error::invalid_image(&format!(
                "normalization target {target_w}x{target_h} is empty"
            )));
        }

        let crop = crop_center_rect((width, height), self.target_size, 0.0);
        let cropped = if crop.covers(width, height) {
            image.clone()
        } else {
            imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image()
        };

        if cropped.dimensions() == self.target_size {
            Ok(cropped)
        } else {
            Ok(imageops::resize(&cropped, target_w, target_h, TILE_FILTER))
        }
    }
}
