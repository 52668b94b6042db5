//! Tile capacity tracking for the assignment loop

use bitvec::prelude::*;
use std::fmt;

/// How many times each tile may be placed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quota {
    /// At most this many placements per tile
    Limited(usize),
    /// No limit
    Unlimited,
}

impl Quota {
    /// Quota implied by the reuse options for a grid of `cells` cells and a
    /// pool of `tiles` tiles
    ///
    /// Without reuse every tile is placed at most once. Balanced reuse
    /// spreads the cells evenly, `ceil(cells / tiles)` per tile.
    pub const fn for_run(allow_reuse: bool, balanced: bool, cells: usize, tiles: usize) -> Self {
        if !allow_reuse {
            Self::Limited(1)
        } else if balanced && tiles > 0 {
            Self::Limited(cells.div_ceil(tiles))
        } else {
            Self::Unlimited
        }
    }
}

/// Set of tiles that can still be placed, with per-tile use counts
#[derive(Clone, Debug)]
pub struct TileAvailability {
    available: BitVec,
    uses: Vec<usize>,
    quota: Quota,
}

impl TileAvailability {
    /// All `tiles` tiles available under `quota`
    pub fn new(tiles: usize, quota: Quota) -> Self {
        let open = quota != Quota::Limited(0);
        Self {
            available: BitVec::repeat(open, tiles),
            uses: vec![0; tiles],
            quota,
        }
    }

    /// Test whether a tile can still be placed
    pub fn is_available(&self, tile: usize) -> bool {
        self.available.get(tile).as_deref() == Some(&true)
    }

    /// Record one placement of `tile`
    ///
    /// Returns `true` when this placement used up the tile's quota.
    pub fn consume(&mut self, tile: usize) -> bool {
        let Some(count) = self.uses.get_mut(tile) else {
            return false;
        };
        *count += 1;

        match self.quota {
            Quota::Limited(limit) if *count >= limit => {
                self.available.set(tile, false);
                true
            }
            _ => false,
        }
    }

    /// Placements recorded for a tile
    pub fn uses(&self, tile: usize) -> usize {
        self.uses.get(tile).copied().unwrap_or(0)
    }

    /// Number of tiles that can still be placed
    pub fn remaining(&self) -> usize {
        self.available.count_ones()
    }

    /// Check if no tile can be placed anymore
    pub fn is_exhausted(&self) -> bool {
        self.available.not_any()
    }

    /// Available tile indices in ascending order
    pub fn iter_available(&self) -> impl Iterator<Item = usize> + '_ {
        self.available.iter_ones()
    }

    /// Configured quota
    pub const fn quota(&self) -> Quota {
        self.quota
    }
}

impl fmt::Display for TileAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TileAvailability({} of {} tiles open)",
            self.remaining(),
            self.uses.len()
        )
    }
}
