//! Spatial data structures and grid manipulation
//!
//! This module contains spatial-related functionality including:
//! - The validated grid model and rectangular regions
//! - Dihedral transforms, scaling and tiling
//! - Cell footprints and connected-component objects

/// Row-major cell sets over a grid
pub mod footprint;
/// Grid model, regions and cell position classes
pub mod grid;
/// Object extraction by connected-component labeling
pub mod objects;
/// Dihedral group actions and whole-grid resizing
pub mod transform;

pub use grid::{Grid, Region, Symbol};
