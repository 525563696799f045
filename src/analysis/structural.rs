//! Structural patterns: properties that hold per part of a partition
//!
//! A partition is only interesting when it explains more than the whole
//! grid does, so every structural pattern records both the per-part and
//! the whole-grid exactness and is only reported when the former is
//! strictly higher.

use ndarray::{Array2, s};

use crate::analysis::detector::{GridContext, detection_params};
use crate::analysis::patterns::{
    Origin, PartitionMeasure, PartitionScheme, Pattern, PatternKind, PatternLevel,
};
use crate::analysis::symmetry::{SYMMETRY_TRANSFORMS, exactness};
use crate::io::configuration::{InductionConfig, MAX_OBJECTS_PER_GRID};
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::{Grid, Region, Symbol};
use crate::spatial::objects::{GridObject, extract_objects};
use crate::spatial::transform::Dihedral;

/// Schemes tried on every grid, in discovery order
pub const PARTITION_SCHEMES: [PartitionScheme; 7] = [
    PartitionScheme::Quadrants,
    PartitionScheme::RowBands(2),
    PartitionScheme::RowBands(3),
    PartitionScheme::ColumnBands(2),
    PartitionScheme::ColumnBands(3),
    PartitionScheme::Separators,
    PartitionScheme::ObjectBoxes,
];

/// Halves of a dimension, skipping the middle line when it is odd
fn halves(length: usize) -> Option<[(usize, usize); 2]> {
    if length < 2 {
        return None;
    }
    let half = length / 2;
    Some([(0, half), (length - half, half)])
}

/// Maximal runs of indices not in `separators`, as (start, length)
fn runs_between(length: usize, separators: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for index in 0..=length {
        let is_gap = index < length && !separators.get(index).copied().unwrap_or(false);
        match (is_gap, start) {
            (true, None) => start = Some(index),
            (false, Some(begin)) => {
                runs.push((begin, index - begin));
                start = None;
            }
            _ => {}
        }
    }
    runs
}

/// Whether a line of cells is uniform and not background
fn is_separator<'a>(mut line: impl Iterator<Item = &'a Symbol>, background: Symbol) -> bool {
    match line.next() {
        Some(&first) if first != background => line.all(|&s| s == first),
        _ => false,
    }
}

/// Split a grid into parts under a scheme
///
/// Returns `None` when the scheme does not apply to the grid: fewer than
/// two parts, bands that do not divide the grid evenly, no separator lines,
/// or fewer than two objects.
pub fn partition(
    grid: &Grid,
    scheme: PartitionScheme,
    objects: &[GridObject],
    background: Symbol,
) -> Option<Vec<Region>> {
    let (rows, cols) = grid.dimensions();
    let parts: Vec<Region> = match scheme {
        PartitionScheme::Quadrants => {
            let row_halves = halves(rows)?;
            let col_halves = halves(cols)?;
            row_halves
                .iter()
                .flat_map(|&(top, height)| {
                    col_halves
                        .iter()
                        .map(move |&(left, width)| Region::new(top, left, height, width))
                })
                .collect()
        }
        PartitionScheme::RowBands(count) => {
            let count = usize::from(count);
            if count < 2 || rows < count || rows % count != 0 {
                return None;
            }
            let height = rows / count;
            (0..count)
                .map(|i| Region::new(i * height, 0, height, cols))
                .collect()
        }
        PartitionScheme::ColumnBands(count) => {
            let count = usize::from(count);
            if count < 2 || cols < count || cols % count != 0 {
                return None;
            }
            let width = cols / count;
            (0..count)
                .map(|i| Region::new(0, i * width, rows, width))
                .collect()
        }
        PartitionScheme::Separators => {
            let cells = grid.cells();
            let separator_rows: Vec<bool> = cells
                .rows()
                .into_iter()
                .map(|line| is_separator(line.iter(), background))
                .collect();
            let separator_cols: Vec<bool> = cells
                .columns()
                .into_iter()
                .map(|line| is_separator(line.iter(), background))
                .collect();
            if !separator_rows.contains(&true) && !separator_cols.contains(&true) {
                return None;
            }
            let row_runs = runs_between(rows, &separator_rows);
            let col_runs = runs_between(cols, &separator_cols);
            row_runs
                .iter()
                .flat_map(|&(top, height)| {
                    col_runs
                        .iter()
                        .map(move |&(left, width)| Region::new(top, left, height, width))
                })
                .collect()
        }
        PartitionScheme::ObjectBoxes => objects.iter().map(|o| o.bbox).collect(),
    };
    (parts.len() >= 2).then_some(parts)
}

/// Cells of a region that lies inside the array
fn crop(cells: &Array2<Symbol>, region: &Region) -> Array2<Symbol> {
    cells
        .slice(s![region.top..region.bottom(), region.left..region.right()])
        .to_owned()
}

/// Mean symmetry exactness over parts, `None` if any part changes shape
fn per_part_symmetry(grid: &Grid, parts: &[Region], transform: Dihedral) -> Option<f64> {
    let mut total = 0.0;
    for part in parts {
        total += exactness(&crop(grid.cells(), part), transform)?;
    }
    Some(total / parts.len() as f64)
}

/// Fraction of matching cells between two same-shape arrays
fn agreement(a: &Array2<Symbol>, b: &Array2<Symbol>) -> f64 {
    if a.dim() != b.dim() || a.is_empty() {
        return 0.0;
    }
    let matching = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matching as f64 / a.len() as f64
}

/// Mean per-part agreement between the transformed input part and the
/// output part, `None` if any part changes shape
pub fn per_part_reproduction(
    input: &Grid,
    output: &Grid,
    parts: &[Region],
    transform: Dihedral,
) -> Option<f64> {
    let mut total = 0.0;
    for part in parts {
        if !part.fits_within(output.rows(), output.cols()) {
            return None;
        }
        let source = crop(input.cells(), part);
        if !transform.preserves_shape(part.height, part.width) {
            return None;
        }
        total += agreement(&transform.apply_array(&source), &crop(output.cells(), part));
    }
    Some(total / parts.len() as f64)
}

fn structural_pattern(
    scheme: PartitionScheme,
    measure: PartitionMeasure,
    whole: f64,
    per_part: f64,
    parts: Vec<Region>,
    origin: Origin,
    grid: &Grid,
) -> Pattern {
    let evidence = parts.len();
    Pattern::new(
        PatternLevel::Structural,
        PatternKind::Partition {
            scheme,
            measure,
            whole,
            per_part,
        },
        origin,
    )
    .with_regions(parts)
    .with_confidence(per_part)
    .with_evidence(evidence)
    .with_footprint(Footprint::full(grid.rows(), grid.cols()))
}

/// Best transform for a scheme: highest score, earliest transform on ties
fn best<I>(scored: I) -> Option<(Dihedral, f64, f64)>
where
    I: IntoIterator<Item = (Dihedral, f64, f64)>,
{
    scored.into_iter().fold(None, |acc, item| match acc {
        Some(current) if current.2 >= item.2 => Some(current),
        _ => Some(item),
    })
}

/// Single-grid structural patterns
///
/// For each scheme, reports the symmetry whose mean per-part exactness is
/// strictly higher than the whole grid's and reaches the report threshold.
pub fn detect_partitions(context: &GridContext<'_>) -> Vec<Pattern> {
    let grid = context.grid;
    let threshold = context.config.symmetry_threshold;
    let mut patterns = Vec::new();

    for scheme in PARTITION_SCHEMES {
        let Some(parts) = partition(grid, scheme, context.objects(), context.config.background)
        else {
            continue;
        };
        let scored = SYMMETRY_TRANSFORMS.into_iter().filter_map(|transform| {
            let per_part = per_part_symmetry(grid, &parts, transform)?;
            let whole = exactness(grid.cells(), transform).unwrap_or(0.0);
            (per_part > whole && per_part >= threshold).then_some((transform, whole, per_part))
        });
        if let Some((transform, whole, per_part)) = best(scored) {
            patterns.push(structural_pattern(
                scheme,
                PartitionMeasure::Symmetry(transform),
                whole,
                per_part,
                parts,
                context.origin,
                grid,
            ));
        }
    }

    patterns
}

/// Pair-level structural patterns
///
/// For a same-shape pair, reports per scheme the transform that reproduces
/// the output part by part strictly better than it reproduces the whole.
pub fn detect_pair_partitions(
    input: &Grid,
    output: &Grid,
    input_objects: &[GridObject],
    pair: usize,
    config: &InductionConfig,
) -> Vec<Pattern> {
    if input.dimensions() != output.dimensions() {
        return Vec::new();
    }
    let objects = input_objects
        .get(..input_objects.len().min(config.max_objects))
        .unwrap_or(input_objects);
    let mut patterns = Vec::new();

    for scheme in PARTITION_SCHEMES {
        let Some(parts) = partition(input, scheme, objects, config.background) else {
            continue;
        };
        let scored = Dihedral::NON_IDENTITY.into_iter().filter_map(|transform| {
            let per_part = per_part_reproduction(input, output, &parts, transform)?;
            let whole = if transform.preserves_shape(input.rows(), input.cols()) {
                agreement(transform.apply(input).cells(), output.cells())
            } else {
                0.0
            };
            (per_part > whole && per_part >= config.symmetry_threshold)
                .then_some((transform, whole, per_part))
        });
        if let Some((transform, whole, per_part)) = best(scored) {
            patterns.push(structural_pattern(
                scheme,
                PartitionMeasure::Reproduction(transform),
                whole,
                per_part,
                parts,
                Origin::Pair(pair),
                input,
            ));
        }
    }

    patterns
}

/// Objects used for the object-box scheme when a rule is replayed
pub fn partition_objects(grid: &Grid, background: Symbol) -> Vec<GridObject> {
    let mut objects = extract_objects(grid, &detection_params(background));
    objects.truncate(MAX_OBJECTS_PER_GRID);
    objects
}
