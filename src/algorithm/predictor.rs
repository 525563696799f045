//! Prediction generation from ranked candidates

use std::collections::HashMap;

use serde::Serialize;
use tracing::{trace, warn};

use crate::algorithm::candidates::TransformationCandidate;
use crate::spatial::grid::{Grid, Symbol};

/// One predicted output grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted grid
    pub grid: Grid,
    /// Description of the producing rule, absent for a fallback
    pub candidate: Option<String>,
    /// Confidence of the producing rule, 0 for a fallback
    pub confidence: f64,
    /// Rank starting at 1; tied predictions share a rank
    pub rank: usize,
    /// Whether no rule applied and a default guess was made
    pub fallback: bool,
    /// Whether an equally ranked rule predicted something different
    pub ambiguous: bool,
}

/// What the training pairs say about a sensible default answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackContext {
    /// Every training pair keeps the grid shape
    pub shape_preserving: bool,
    /// Most common training output shape, earliest on ties
    pub output_shape: Option<(usize, usize)>,
    /// Fill symbol for a blank guess
    pub background: Symbol,
}

impl FallbackContext {
    /// Summarize the training pairs
    pub fn from_training(train: &[(Grid, Grid)], background: Symbol) -> Self {
        let shape_preserving = train
            .iter()
            .all(|(input, output)| input.dimensions() == output.dimensions());

        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        let mut first_seen = Vec::new();
        for (_, output) in train {
            let shape = output.dimensions();
            let count = counts.entry(shape).or_insert(0);
            if *count == 0 {
                first_seen.push(shape);
            }
            *count += 1;
        }
        let mut output_shape = None;
        let mut best = 0;
        for shape in first_seen {
            let count = counts.get(&shape).copied().unwrap_or(0);
            if count > best {
                best = count;
                output_shape = Some(shape);
            }
        }

        Self {
            shape_preserving,
            output_shape,
            background,
        }
    }

    /// Default prediction for a test input
    ///
    /// A copy of the input when training preserves shape, otherwise the most
    /// common output shape filled with background.
    pub fn prediction(&self, test_input: &Grid) -> Prediction {
        let grid = match self.output_shape {
            Some((rows, cols)) if !self.shape_preserving => {
                Grid::filled(rows, cols, self.background).unwrap_or_else(|_| test_input.clone())
            }
            _ => test_input.clone(),
        };
        Prediction {
            grid,
            candidate: None,
            confidence: 0.0,
            rank: 1,
            fallback: true,
            ambiguous: false,
        }
    }
}

/// Apply ranked candidates to a test input and keep up to `k` distinct grids
///
/// Inapplicable candidates are skipped and duplicate grids keep the
/// higher-ranked producer. Consecutive candidates with equal confidence and
/// complexity that predict different grids share a rank and are flagged as
/// ambiguous. When nothing applies, a single fallback prediction is returned.
pub fn predict(
    test_input: &Grid,
    ranked: &[TransformationCandidate],
    k: usize,
    fallback: &FallbackContext,
) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = Vec::new();
    let mut last_key: Option<(f64, usize)> = None;

    for candidate in ranked {
        if predictions.len() >= k {
            break;
        }
        let Some(grid) = candidate.apply(test_input) else {
            trace!(candidate = %candidate, "candidate not applicable to test input");
            continue;
        };
        if predictions.iter().any(|p| p.grid == grid) {
            continue;
        }

        let key = (candidate.confidence, candidate.complexity);
        let tied = last_key == Some(key);
        let rank = match predictions.last() {
            Some(previous) if tied => previous.rank,
            Some(previous) => previous.rank + 1,
            None => 1,
        };
        if tied {
            warn!(
                rank,
                candidate = %candidate,
                "equally ranked candidates disagree on the test output"
            );
            for previous in predictions.iter_mut().filter(|p| p.rank == rank) {
                previous.ambiguous = true;
            }
        }

        predictions.push(Prediction {
            grid,
            candidate: Some(candidate.to_string()),
            confidence: candidate.confidence,
            rank,
            fallback: false,
            ambiguous: tied,
        });
        last_key = Some(key);
    }

    if predictions.is_empty() {
        predictions.push(fallback.prediction(test_input));
    }
    predictions
}
