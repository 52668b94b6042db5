/// Tile capacity tracking with per-tile quotas
pub mod availability;
/// Static color-distance matrix between cells and tiles
pub mod costs;
/// Neighborhood reuse penalty and placement history
pub mod diversity;
/// Pipeline orchestration from raw buffers to the finished canvas
pub mod executor;
/// Exact minimum-cost assignment
pub mod optimal;
/// Greedy assignment with diversity feedback
pub mod solver;
