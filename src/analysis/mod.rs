//! Pattern detection at every level of the hierarchy
//!
//! Atomic detectors look at one grid or pair, composite and structural
//! detection combine what was found in one grid, and meta detection looks
//! across all training pairs.

/// Composite patterns from co-located atomic patterns
pub mod composite;
/// Detector trait and task-level orchestration
pub mod detector;
/// Salient-object detection
pub mod landmark;
/// Value mappings over training pairs
pub mod mapping;
/// Cross-pair meta patterns
pub mod meta;
/// Pattern data model and arena
pub mod patterns;
/// Attribute progressions across objects
pub mod progression;
/// Pairwise object placement
pub mod relations;
/// Row and column periodicity
pub mod repetition;
/// Partition-based structural patterns
pub mod structural;
/// Graded symmetry detection
pub mod symmetry;
