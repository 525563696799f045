//! Task files, reports, configuration and the command-line surface

/// Command-line parsing and batch task processing
pub mod cli;
/// Constants and runtime configuration
pub mod configuration;
/// Error type and result alias
pub mod error;
/// Tracing subscriber setup
pub mod logging;
/// Batch progress display
pub mod progress;
/// Seeded synthetic task generation
pub mod synthetic;
/// Task JSON input and prediction report output
pub mod task;
