//! Exact row and column periodicity

use ndarray::Axis as ArrayAxis;

use crate::analysis::detector::{AtomicDetector, GridContext};
use crate::analysis::patterns::{Axis, Pattern, PatternKind, PatternLevel};
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::Grid;

/// Smallest period along an axis with at least two full repeats
///
/// A period `p` holds when every line at index `i >= p` equals the line at
/// `i - p`. Returns `(period, full_repeats)`.
pub fn smallest_period(grid: &Grid, axis: Axis) -> Option<(usize, usize)> {
    let array_axis = match axis {
        Axis::Rows => ArrayAxis(0),
        Axis::Cols => ArrayAxis(1),
    };
    let lines: Vec<_> = grid.cells().axis_iter(array_axis).collect();
    let length = lines.len();

    (1..=length / 2)
        .find(|&period| (period..length).all(|i| lines.get(i) == lines.get(i - period)))
        .map(|period| (period, length / period))
}

/// Detector for grids whose rows or columns repeat exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionDetector;

impl AtomicDetector for RepetitionDetector {
    fn name(&self) -> &'static str {
        "repetition"
    }

    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern> {
        let grid = context.grid;
        [Axis::Rows, Axis::Cols]
            .into_iter()
            .filter_map(|axis| {
                let (period, repeats) = smallest_period(grid, axis)?;
                Some(
                    Pattern::new(
                        PatternLevel::Atomic,
                        PatternKind::Repetition {
                            axis,
                            period,
                            repeats,
                        },
                        context.origin,
                    )
                    .with_regions(vec![grid.bounds()])
                    .with_confidence(1.0)
                    .with_evidence(repeats)
                    .with_footprint(Footprint::full(grid.rows(), grid.cols())),
                )
            })
            .collect()
    }
}
