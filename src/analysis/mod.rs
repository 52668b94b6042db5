//! Color analysis used to compare cells against tiles

/// Distance functions between color signatures
pub mod metric;
/// Color signature computation over pixel regions
pub mod signature;
