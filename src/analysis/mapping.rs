//! Symbol substitution over a training pair

use std::collections::BTreeMap;

use crate::algorithm::confidence::{Evidence, score};
use crate::analysis::patterns::{Origin, Pattern, PatternKind, PatternLevel};
use crate::io::configuration::PALETTE_SIZE;
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::{Grid, Symbol};

/// Symbol table read from the changed cells of a same-shape pair
///
/// Returns `None` when shapes differ or a source symbol would need two
/// different targets. Unchanged cells contribute nothing.
pub fn infer_table(input: &Grid, output: &Grid) -> Option<BTreeMap<Symbol, Symbol>> {
    if input.dimensions() != output.dimensions() {
        return None;
    }
    let mut table = BTreeMap::new();
    for (&from, &to) in input.cells().iter().zip(output.cells().iter()) {
        if from == to {
            continue;
        }
        match table.insert(from, to) {
            Some(previous) if previous != to => return None,
            _ => {}
        }
    }
    Some(table)
}

/// Merge per-pair tables, `None` on any conflict
pub fn merge_tables<'a>(
    tables: impl IntoIterator<Item = &'a BTreeMap<Symbol, Symbol>>,
) -> Option<BTreeMap<Symbol, Symbol>> {
    let mut merged = BTreeMap::new();
    for table in tables {
        for (&from, &to) in table {
            match merged.insert(from, to) {
                Some(previous) if previous != to => return None,
                _ => {}
            }
        }
    }
    Some(merged)
}

/// Apply a symbol table to every cell; unmapped symbols are kept
pub fn apply_table(grid: &Grid, table: &BTreeMap<Symbol, Symbol>) -> Grid {
    Grid::from_valid(grid.cells().mapv(|s| table.get(&s).copied().unwrap_or(s)))
}

fn find_root(parent: &[usize; PALETTE_SIZE], mut node: usize) -> usize {
    while let Some(&next) = parent.get(node) {
        if next == node {
            break;
        }
        node = next;
    }
    node
}

/// Number of connected components of the substitution graph
///
/// Every non-trivial entry links its source and target symbol, so a swap
/// of two symbols is one component while two unrelated recolorings are two.
pub fn mapping_components(table: &BTreeMap<Symbol, Symbol>) -> usize {
    let mut parent: [usize; PALETTE_SIZE] = std::array::from_fn(|i| i);
    let mut involved = [false; PALETTE_SIZE];

    for (&from, &to) in table {
        let (a, b) = (usize::from(from), usize::from(to));
        if a == b || a >= PALETTE_SIZE || b >= PALETTE_SIZE {
            continue;
        }
        for node in [a, b] {
            if let Some(flag) = involved.get_mut(node) {
                *flag = true;
            }
        }
        let (root_a, root_b) = (find_root(&parent, a), find_root(&parent, b));
        if root_a != root_b {
            if let Some(slot) = parent.get_mut(root_a) {
                *slot = root_b;
            }
        }
    }

    involved
        .iter()
        .enumerate()
        .filter(|&(node, &flag)| flag && find_root(&parent, node) == node)
        .count()
}

/// Value-mapping pattern of one training pair
///
/// Exactness is the fraction of cells the table reproduces, so a table that
/// would also rewrite cells that stayed put scores below 1.
pub fn detect_value_mapping(input: &Grid, output: &Grid, pair: usize) -> Option<Pattern> {
    let table = infer_table(input, output)?;
    if table.is_empty() {
        return None;
    }

    let (rows, cols) = input.dimensions();
    let mut changed = Footprint::new(rows, cols);
    let mut reproduced = 0;
    for (((r, c), &from), &to) in input.cells().indexed_iter().zip(output.cells().iter()) {
        if from != to {
            changed.insert(r, c);
        }
        if table.get(&from).copied().unwrap_or(from) == to {
            reproduced += 1;
        }
    }
    let exactness = reproduced as f64 / input.area() as f64;

    Some(
        Pattern::new(
            PatternLevel::Atomic,
            PatternKind::ValueMapping { table },
            Origin::Pair(pair),
        )
        .with_regions(vec![input.bounds()])
        .with_confidence(score(&Evidence::within_grid(exactness, 0)))
        .with_evidence(changed.count())
        .with_footprint(changed),
    )
}
