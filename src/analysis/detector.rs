//! Multi-level pattern detection over a whole task
//!
//! Detection runs bottom-up. Atomic detectors see one grid at a time, the
//! value-mapping and pair-structural detectors see one training pair, and
//! meta detection compares what was found across all pairs. Everything is
//! stored in one `PatternArena` owned by the returned `PatternHierarchy`.

use tracing::{debug, trace};

use crate::analysis::composite::detect_composites;
use crate::analysis::landmark::LandmarkDetector;
use crate::analysis::mapping::detect_value_mapping;
use crate::analysis::meta::detect_meta;
use crate::analysis::patterns::{Origin, Pattern, PatternArena, PatternId, PatternLevel};
use crate::analysis::progression::ProgressionDetector;
use crate::analysis::relations::SpatialRelationDetector;
use crate::analysis::repetition::RepetitionDetector;
use crate::analysis::structural::{detect_pair_partitions, detect_partitions};
use crate::analysis::symmetry::SymmetryDetector;
use crate::io::configuration::InductionConfig;
use crate::spatial::grid::{Grid, Symbol};
use crate::spatial::objects::{
    Connectivity, ExtractionParams, GridObject, Segmentation, extract_objects,
};

/// Everything an atomic detector may look at
#[derive(Debug, Clone, Copy)]
pub struct GridContext<'a> {
    /// Grid under analysis
    pub grid: &'a Grid,
    /// Objects of the grid under the detection extraction parameters
    pub objects: &'a [GridObject],
    /// Where the grid sits in the task
    pub origin: Origin,
    /// Run configuration
    pub config: &'a InductionConfig,
}

impl GridContext<'_> {
    /// Objects considered by object-level detectors, capped by configuration
    pub fn objects(&self) -> &[GridObject] {
        let limit = self.objects.len().min(self.config.max_objects);
        self.objects.get(..limit).unwrap_or(self.objects)
    }
}

/// A detector of one kind of single-grid atomic pattern
///
/// Implementations are pure: the same context always yields the same
/// patterns in the same order.
pub trait AtomicDetector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Find patterns in one grid
    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern>;
}

/// Extraction parameters used during pattern detection
pub const fn detection_params(background: Symbol) -> ExtractionParams {
    ExtractionParams::new(Connectivity::Four, Segmentation::SameSymbol, background)
}

/// Patterns and objects found in one grid
#[derive(Debug, Clone)]
pub struct GridAnalysis {
    /// Which grid this is
    pub origin: Origin,
    /// Objects under the detection extraction parameters
    pub objects: Vec<GridObject>,
    /// Atomic patterns that survived pruning
    pub atomic: Vec<PatternId>,
    /// Composite patterns
    pub composite: Vec<PatternId>,
    /// Single-grid structural patterns
    pub structural: Vec<PatternId>,
}

/// Patterns found in one training pair
#[derive(Debug, Clone)]
pub struct PairAnalysis {
    /// Pair index
    pub index: usize,
    /// Input grid analysis
    pub input: GridAnalysis,
    /// Output grid analysis
    pub output: GridAnalysis,
    /// Value mapping over the pair, when shapes agree and no conflict exists
    pub mapping: Option<PatternId>,
    /// Pair-level structural patterns
    pub structural: Vec<PatternId>,
}

/// All patterns of a task, organised by where they were found
#[derive(Debug, Clone, Default)]
pub struct PatternHierarchy {
    /// Storage for every pattern
    pub arena: PatternArena,
    /// Per training pair results
    pub pairs: Vec<PairAnalysis>,
    /// Per test input results
    pub tests: Vec<GridAnalysis>,
    /// Cross-pair meta patterns
    pub meta: Vec<PatternId>,
}

impl PatternHierarchy {
    /// Resolve ids to patterns
    pub fn patterns<'a>(
        &'a self,
        ids: &'a [PatternId],
    ) -> impl Iterator<Item = &'a Pattern> + 'a {
        self.arena.resolve(ids)
    }
}

/// Runs every detector level over a task
pub struct PatternDetector {
    config: InductionConfig,
    detectors: Vec<Box<dyn AtomicDetector>>,
}

impl PatternDetector {
    /// Detector with the default set of atomic detectors
    pub fn new(config: InductionConfig) -> Self {
        Self::with_detectors(
            config,
            vec![
                Box::new(SymmetryDetector),
                Box::new(RepetitionDetector),
                Box::new(ProgressionDetector),
                Box::new(SpatialRelationDetector),
                Box::new(LandmarkDetector),
            ],
        )
    }

    /// Detector with an explicit set of atomic detectors
    pub fn with_detectors(
        config: InductionConfig,
        detectors: Vec<Box<dyn AtomicDetector>>,
    ) -> Self {
        Self { config, detectors }
    }

    /// Configuration in use
    pub const fn config(&self) -> &InductionConfig {
        &self.config
    }

    /// Detect atomic, composite and structural patterns in one grid
    pub fn analyze_grid(
        &self,
        arena: &mut PatternArena,
        grid: &Grid,
        origin: Origin,
    ) -> GridAnalysis {
        let objects = extract_objects(grid, &detection_params(self.config.background));
        let context = GridContext {
            grid,
            objects: &objects,
            origin,
            config: &self.config,
        };

        let mut atomic = Vec::new();
        for detector in &self.detectors {
            for pattern in detector.detect(&context) {
                if pattern.confidence < self.config.min_pattern_confidence {
                    trace!(
                        detector = detector.name(),
                        confidence = pattern.confidence,
                        "pruned atomic pattern"
                    );
                    continue;
                }
                atomic.push(arena.insert(pattern));
            }
        }

        let composite: Vec<PatternId> = detect_composites(arena, &atomic, &context)
            .into_iter()
            .map(|pattern| arena.insert(pattern))
            .collect();

        let structural: Vec<PatternId> = detect_partitions(&context)
            .into_iter()
            .map(|pattern| arena.insert(pattern))
            .collect();

        GridAnalysis {
            origin,
            objects,
            atomic,
            composite,
            structural,
        }
    }

    /// Detect patterns at every level for a whole task
    pub fn analyze_task(&self, train: &[(Grid, Grid)], tests: &[Grid]) -> PatternHierarchy {
        let mut arena = PatternArena::new();
        let mut pairs = Vec::with_capacity(train.len());

        for (index, (input, output)) in train.iter().enumerate() {
            let input_analysis = self.analyze_grid(&mut arena, input, Origin::train_input(index));
            let output_analysis =
                self.analyze_grid(&mut arena, output, Origin::train_output(index));

            let mapping = detect_value_mapping(input, output, index)
                .filter(|pattern| pattern.confidence >= self.config.min_pattern_confidence)
                .map(|pattern| arena.insert(pattern));

            let structural = detect_pair_partitions(
                input,
                output,
                &input_analysis.objects,
                index,
                &self.config,
            )
            .into_iter()
            .map(|pattern| arena.insert(pattern))
            .collect();

            pairs.push(PairAnalysis {
                index,
                input: input_analysis,
                output: output_analysis,
                mapping,
                structural,
            });
        }

        let tests = tests
            .iter()
            .enumerate()
            .map(|(index, grid)| self.analyze_grid(&mut arena, grid, Origin::test(index)))
            .collect();

        let meta: Vec<PatternId> = detect_meta(&arena, &pairs)
            .into_iter()
            .map(|pattern| arena.insert(pattern))
            .collect();

        debug!(
            patterns = arena.len(),
            atomic = arena.at_level(PatternLevel::Atomic).count(),
            composite = arena.at_level(PatternLevel::Composite).count(),
            structural = arena.at_level(PatternLevel::Structural).count(),
            meta = meta.len(),
            "pattern detection complete"
        );

        PatternHierarchy {
            arena,
            pairs,
            tests,
            meta,
        }
    }
}
