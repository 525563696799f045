//! Symmetry detection with graded exactness
//!
//! A transform that keeps the grid shape permutes its cells. Each orbit of
//! that permutation must hold a single symbol for the grid to be invariant,
//! so the cheapest repair of an orbit rewrites every cell that differs from
//! the orbit's most common symbol. Exactness is one minus the total repair
//! cost over the cell count.

use ndarray::Array2;

use crate::algorithm::confidence::{Evidence, score};
use crate::analysis::detector::{AtomicDetector, GridContext};
use crate::analysis::patterns::{Pattern, PatternKind, PatternLevel};
use crate::io::configuration::PALETTE_SIZE;
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::Symbol;
use crate::spatial::transform::Dihedral;

/// Transforms examined for invariance
///
/// Rotate270 is omitted: a grid is invariant under it exactly when it is
/// invariant under Rotate90.
pub const SYMMETRY_TRANSFORMS: [Dihedral; 6] = [
    Dihedral::FlipRows,
    Dihedral::FlipCols,
    Dihedral::Rotate180,
    Dihedral::Rotate90,
    Dihedral::Transpose,
    Dihedral::AntiTranspose,
];

/// Orbits of the cell permutation induced by a shape-preserving transform
fn orbits(rows: usize, cols: usize, transform: Dihedral) -> Vec<Vec<(usize, usize)>> {
    let mut seen = Footprint::new(rows, cols);
    let mut result = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if seen.contains(row, col) {
                continue;
            }
            let mut orbit = Vec::new();
            let mut current = (row, col);
            while !seen.contains(current.0, current.1) {
                seen.insert(current.0, current.1);
                orbit.push(current);
                current = transform.source_of(current.0, current.1, rows, cols);
            }
            result.push(orbit);
        }
    }
    result
}

/// Cells that must change to make one orbit uniform
fn orbit_repair(cells: &Array2<Symbol>, orbit: &[(usize, usize)]) -> usize {
    let mut counts = [0_usize; PALETTE_SIZE];
    for &position in orbit {
        if let Some(count) = cells.get(position).and_then(|&s| counts.get_mut(usize::from(s))) {
            *count += 1;
        }
    }
    let most_common = counts.iter().copied().max().unwrap_or(0);
    orbit.len() - most_common.min(orbit.len())
}

/// Exactness of invariance in [0, 1], `None` when the transform changes shape
pub fn exactness(cells: &Array2<Symbol>, transform: Dihedral) -> Option<f64> {
    let (rows, cols) = cells.dim();
    if !transform.preserves_shape(rows, cols) || cells.is_empty() {
        return None;
    }
    let repair: usize = orbits(rows, cols, transform)
        .iter()
        .map(|orbit| orbit_repair(cells, orbit))
        .sum();
    Some(1.0 - repair as f64 / cells.len() as f64)
}

/// Cells whose orbit is already uniform
pub fn consistent_cells(cells: &Array2<Symbol>, transform: Dihedral) -> Option<Footprint> {
    let (rows, cols) = cells.dim();
    if !transform.preserves_shape(rows, cols) {
        return None;
    }
    let mut footprint = Footprint::new(rows, cols);
    for orbit in orbits(rows, cols, transform) {
        if orbit_repair(cells, &orbit) == 0 {
            for (row, col) in orbit {
                footprint.insert(row, col);
            }
        }
    }
    Some(footprint)
}

/// Grid- and object-scoped symmetry detector
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryDetector;

impl AtomicDetector for SymmetryDetector {
    fn name(&self) -> &'static str {
        "symmetry"
    }

    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern> {
        let grid = context.grid;
        let threshold = context.config.symmetry_threshold;
        let mut patterns = Vec::new();

        for transform in SYMMETRY_TRANSFORMS {
            let Some(value) = exactness(grid.cells(), transform) else {
                continue;
            };
            if value < threshold {
                continue;
            }
            let footprint = consistent_cells(grid.cells(), transform)
                .unwrap_or_else(|| Footprint::full(grid.rows(), grid.cols()));
            // Every orbit broken: no cell supports the symmetry
            if footprint.is_empty() {
                continue;
            }
            patterns.push(
                Pattern::new(
                    PatternLevel::Atomic,
                    PatternKind::Symmetry { transform },
                    context.origin,
                )
                .with_regions(vec![grid.bounds()])
                .with_confidence(score(&Evidence::within_grid(value, 0)))
                .with_evidence(footprint.count())
                .with_footprint(footprint),
            );
        }

        for object in context.objects() {
            if object.size() < 2 {
                continue;
            }
            for transform in SYMMETRY_TRANSFORMS {
                let Some(value) = exactness(object.patch(), transform) else {
                    continue;
                };
                if value < threshold {
                    continue;
                }
                patterns.push(
                    Pattern::new(
                        PatternLevel::Atomic,
                        PatternKind::Symmetry { transform },
                        context.origin,
                    )
                    .with_regions(vec![object.bbox])
                    .with_objects(vec![object.id])
                    .with_confidence(score(&Evidence::within_grid(value, 0)))
                    .with_evidence(object.size())
                    .with_footprint(object.footprint(grid.rows(), grid.cols())),
                );
            }
        }

        patterns
    }
}
