//! Rule induction over paired example grids
//!
//! Given a few input/output grid pairs, the crate detects patterns at several
//! levels of abstraction, relates input objects to output objects, searches
//! for the simplest transformation that reproduces every pair exactly and
//! applies it to unseen test inputs.

#![deny(unsafe_code)]

/// Rule induction: relationships, candidate synthesis, scoring and prediction
pub mod algorithm;
/// Pattern detection from atomic cues up to cross-pair meta patterns
pub mod analysis;
/// Task files, reports, configuration and error handling
pub mod io;
/// Sequence and similarity measures
pub mod math;
/// Grid model, transforms and object extraction
pub mod spatial;

pub use algorithm::predictor::Prediction;
pub use algorithm::solver::{Solver, solve_task};
pub use io::configuration::InductionConfig;
pub use io::error::{InductionError, Result};
pub use spatial::grid::Grid;
