//! Rule induction: relationships, scoring, synthesis and prediction

/// Sub-rules and transformation candidates
pub mod candidates;
/// Confidence scoring and ranking order
pub mod confidence;
/// Prediction generation and fallbacks
pub mod predictor;
/// Object correspondences and pattern relationships
pub mod relationships;
/// End-to-end pipeline and the `solve_task` entry point
pub mod solver;
/// Hypothesis generation and replay against training pairs
pub mod synthesis;
