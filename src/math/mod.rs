//! Numeric helpers shared by detectors and the relationship analyzer

/// Arithmetic and geometric progressions over integer sequences
pub mod sequence;
/// Similarity measures between histograms, shapes and boxes
pub mod similarity;
