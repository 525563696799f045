//! End-to-end rule induction pipeline

use tracing::{debug, info};

use crate::{
    algorithm::candidates::TransformationCandidate,
    algorithm::predictor::{FallbackContext, Prediction, predict},
    algorithm::relationships::{RelationshipGraph, analyze_relationships},
    algorithm::synthesis::synthesize,
    analysis::detector::{PatternDetector, PatternHierarchy},
    io::configuration::InductionConfig,
    io::error::{InductionError, Result, invalid_parameter},
    spatial::grid::Grid,
};

/// Everything the pipeline learned about one task
#[derive(Debug, Clone)]
pub struct TaskAnalysis {
    /// Patterns at every level
    pub hierarchy: PatternHierarchy,
    /// Object and pattern relationships
    pub relationships: RelationshipGraph,
    /// Valid candidates, best first; empty when nothing reproduced the pairs
    pub candidates: Vec<TransformationCandidate>,
    /// Number of distinct hypotheses replayed
    pub examined: usize,
    /// Default-answer summary of the training pairs
    pub fallback: FallbackContext,
}

impl TaskAnalysis {
    /// Best candidate, if any survived
    pub fn best(&self) -> Option<&TransformationCandidate> {
        self.candidates.first()
    }

    /// Predictions for one test input
    pub fn predict(&self, test_input: &Grid, k: usize) -> Vec<Prediction> {
        predict(test_input, &self.candidates, k, &self.fallback)
    }
}

/// Rule-induction pipeline with a fixed configuration
///
/// The solver holds no state between tasks; one instance may be shared
/// across threads solving different tasks.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: InductionConfig,
}

impl Solver {
    /// Create a solver
    pub const fn new(config: InductionConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub const fn config(&self) -> &InductionConfig {
        &self.config
    }

    /// Run detection, relationship analysis and synthesis on a task
    ///
    /// A task without any valid candidate is not an error here: the
    /// analysis carries an empty candidate list and the predictor falls back.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if there are no training pairs
    pub fn analyze(&self, train: &[(Grid, Grid)], tests: &[Grid]) -> Result<TaskAnalysis> {
        if train.is_empty() {
            return Err(invalid_parameter(
                "train_pairs",
                &0,
                &"at least one training pair is required",
            ));
        }

        let detector = PatternDetector::new(self.config.clone());
        let hierarchy = detector.analyze_task(train, tests);
        let relationships = analyze_relationships(
            &hierarchy,
            self.config.match_threshold,
            self.config.max_objects,
        );
        debug!(edges = relationships.edges.len(), "relationship analysis complete");

        let (candidates, examined) =
            match synthesize(train, &hierarchy, &relationships, &self.config) {
                Ok(synthesis) => (synthesis.candidates, synthesis.examined),
                Err(InductionError::NoValidCandidate { examined }) => {
                    info!(examined, "no candidate reproduces every training pair");
                    (Vec::new(), examined)
                }
                Err(other) => return Err(other),
            };

        Ok(TaskAnalysis {
            hierarchy,
            relationships,
            candidates,
            examined,
            fallback: FallbackContext::from_training(train, self.config.background),
        })
    }

    /// Predict up to `k` outputs for every test input
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `k` is zero or there are no training
    /// pairs
    pub fn solve(
        &self,
        train: &[(Grid, Grid)],
        tests: &[Grid],
        k: usize,
    ) -> Result<Vec<Vec<Prediction>>> {
        if k == 0 {
            return Err(invalid_parameter(
                "k",
                &k,
                &"at least one prediction per test input is required",
            ));
        }
        let analysis = self.analyze(train, tests)?;
        if let Some(best) = analysis.best() {
            debug!(rule = %best, confidence = best.confidence, "best candidate");
        }
        Ok(tests.iter().map(|test| analysis.predict(test, k)).collect())
    }
}

/// Infer a rule from training pairs and predict up to `k` outputs per test
/// input, using the default configuration
///
/// # Errors
///
/// Returns `InvalidParameter` if `k` is zero or there are no training pairs
pub fn solve_task(
    train: &[(Grid, Grid)],
    tests: &[Grid],
    k: usize,
) -> Result<Vec<Vec<Prediction>>> {
    Solver::default().solve(train, tests, k)
}
