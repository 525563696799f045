//! Induction constants and runtime configuration defaults

use crate::spatial::grid::Symbol;

/// Number of distinct symbols a grid may use (`0..PALETTE_SIZE`)
pub const PALETTE_SIZE: usize = 10;

/// Symbol treated as empty space by object extraction and fallbacks
pub const DEFAULT_BACKGROUND: Symbol = 0;

// Detection thresholds
/// Minimum exactness for a symmetry to be reported as a pattern
pub const SYMMETRY_REPORT_THRESHOLD: f64 = 0.75;
/// Atomic patterns below this confidence are pruned before composition
pub const MIN_PATTERN_CONFIDENCE: f64 = 0.5;
/// Minimum number of objects for a progression to be meaningful
pub const MIN_PROGRESSION_LENGTH: usize = 3;

// Prevents quadratic blow-up on grids with many objects
/// Maximum objects per grid considered by object-level detectors
pub const MAX_OBJECTS_PER_GRID: usize = 24;
/// Maximum objects paired by the spatial-relation detector
pub const MAX_RELATION_OBJECTS: usize = 6;
/// Maximum composite patterns per grid
pub const MAX_COMPOSITES_PER_GRID: usize = 32;

// Relationship matching weights (sum to 1.0)
/// Weight of bounding-box intersection over union
pub const W_IOU: f64 = 0.4;
/// Weight of symbol histogram similarity
pub const W_HISTOGRAM: f64 = 0.3;
/// Weight of exact shape agreement
pub const W_SHAPE: f64 = 0.3;
/// Minimum score for an object correspondence
pub const MATCH_THRESHOLD: f64 = 0.3;

// Confidence scoring
/// Penalty per unit of rule complexity
pub const COMPLEXITY_WEIGHT: f64 = 0.05;

// Search bounds
/// Maximum hypotheses replayed against the training pairs per task
pub const MAX_CANDIDATES: usize = 512;

// Output settings
/// Default number of predictions per test input
pub const DEFAULT_PREDICTIONS: usize = 3;
/// Suffix added to report filenames
pub const OUTPUT_SUFFIX: &str = "_predictions";
/// Fixed seed for reproducible synthetic task generation
pub const DEFAULT_SEED: u64 = 42;
/// Training pairs per generated synthetic task
pub const SYNTHETIC_TRAIN_PAIRS: usize = 3;

// Progress display
/// Recent tasks listed beneath the batch progress bar
pub const MAX_STATUS_LINES: usize = 4;

/// Tunable parameters for a single induction run
///
/// Defaults come from the constants in this module. The configuration is
/// read-only during a run and may be shared across worker threads.
#[derive(Clone, Debug, PartialEq)]
pub struct InductionConfig {
    /// Symbol treated as background
    pub background: Symbol,
    /// Minimum exactness for reported symmetries
    pub symmetry_threshold: f64,
    /// Minimum confidence for atomic patterns to survive pruning
    pub min_pattern_confidence: f64,
    /// Minimum correspondence score between objects
    pub match_threshold: f64,
    /// Upper bound on replayed hypotheses
    pub max_candidates: usize,
    /// Upper bound on objects per grid for object-level detectors
    pub max_objects: usize,
}

impl Default for InductionConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            symmetry_threshold: SYMMETRY_REPORT_THRESHOLD,
            min_pattern_confidence: MIN_PATTERN_CONFIDENCE,
            match_threshold: MATCH_THRESHOLD,
            max_candidates: MAX_CANDIDATES,
            max_objects: MAX_OBJECTS_PER_GRID,
        }
    }
}

impl InductionConfig {
    /// Default configuration with a different background symbol
    pub fn with_background(background: Symbol) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }
}
