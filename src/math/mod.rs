//! Mathematical utilities for the mosaic pipeline

/// Seeded samplers for jitter and tilt
pub mod random;
/// Rotation of RGBA buffers and rotated rectangle geometry
pub mod rotation;
/// Median and rational approximation helpers
pub mod statistics;
