//! Hypothesis generation, replay and ranking
//!
//! Generators propose rule sequences in a fixed discovery order, reading
//! the pattern hierarchy and the object correspondences. Every proposal is
//! replayed on every training pair and dropped on the first mismatch, so
//! only exact rules survive to be scored.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::algorithm::candidates::{
    ObjectAction, ObjectSelector, SubRule, TransformationCandidate,
};
use crate::algorithm::confidence::{Evidence, rank_order, score};
use crate::algorithm::relationships::{ObjectMatch, RelationshipGraph, match_objects};
use crate::analysis::detector::{PatternHierarchy, detection_params};
use crate::analysis::mapping::{infer_table, merge_tables};
use crate::analysis::patterns::{Delta, PartitionMeasure, PatternKind, TrackingKey};
use crate::analysis::symmetry::SYMMETRY_TRANSFORMS;
use crate::io::configuration::InductionConfig;
use crate::io::error::{InductionError, Result};
use crate::spatial::grid::{Grid, PositionClass, Symbol};
use crate::spatial::objects::{ExtractionParams, GridObject, extract_objects};
use crate::spatial::transform::{Dihedral, integer_factors, upscale};

/// Ordered, de-duplicated collection of proposed rule sequences
struct Hypotheses {
    seen: HashSet<Vec<SubRule>>,
    ordered: Vec<Vec<SubRule>>,
    limit: usize,
}

impl Hypotheses {
    fn new(limit: usize) -> Self {
        Self {
            seen: HashSet::new(),
            ordered: Vec::new(),
            limit,
        }
    }

    fn propose(&mut self, steps: Vec<SubRule>) {
        if self.ordered.len() >= self.limit || self.seen.contains(&steps) {
            return;
        }
        self.seen.insert(steps.clone());
        self.ordered.push(steps);
    }
}

/// Merge per-pair tables computed after a preprocessing step
fn remap_after(
    train: &[(Grid, Grid)],
    prepare: impl Fn(&Grid) -> Option<Grid>,
) -> Option<BTreeMap<Symbol, Symbol>> {
    let tables: Option<Vec<_>> = train
        .iter()
        .map(|(input, output)| infer_table(&prepare(input)?, output))
        .collect();
    let merged = merge_tables(tables?.iter())?;
    (!merged.is_empty()).then_some(merged)
}

/// Table merged from the per-pair value-mapping patterns
///
/// Identity pairs contribute an empty table; a pair that changed but has
/// no surviving mapping pattern rules the hypothesis out.
fn remap_from_patterns(
    train: &[(Grid, Grid)],
    hierarchy: &PatternHierarchy,
) -> Option<BTreeMap<Symbol, Symbol>> {
    let mut tables = Vec::with_capacity(train.len());
    for (pair, (input, output)) in hierarchy.pairs.iter().zip(train) {
        let pattern = pair.mapping.and_then(|id| hierarchy.arena.get(id));
        match pattern.map(|p| &p.kind) {
            Some(PatternKind::ValueMapping { table }) => tables.push(table.clone()),
            _ if input == output => tables.push(BTreeMap::new()),
            _ => return None,
        }
    }
    let merged = merge_tables(tables.iter())?;
    (!merged.is_empty()).then_some(merged)
}

/// Symbol table keyed by position class, merged across pairs
fn positional_table(
    train: &[(Grid, Grid)],
) -> Option<BTreeMap<(PositionClass, Symbol), Symbol>> {
    let mut table = BTreeMap::new();
    for (input, output) in train {
        if input.dimensions() != output.dimensions() {
            return None;
        }
        for (((r, c), &from), &to) in input.cells().indexed_iter().zip(output.cells().iter()) {
            if from == to {
                continue;
            }
            let key = (input.position_class(r, c), from);
            match table.insert(key, to) {
                Some(previous) if previous != to => return None,
                _ => {}
            }
        }
    }
    (!table.is_empty()).then_some(table)
}

/// Resize factors shared by every pair, excluding the trivial (1, 1)
fn shared_factors(train: &[(Grid, Grid)]) -> Option<(usize, usize)> {
    let mut factors = train
        .iter()
        .map(|(input, output)| integer_factors(input.dimensions(), output.dimensions()));
    let first = factors.next()??;
    (factors.all(|f| f == Some(first)) && first != (1, 1)).then_some(first)
}

/// Actions that turn one matched input object into its output object
pub fn infer_actions(input: &GridObject, output: &GridObject) -> Vec<ObjectAction> {
    let mut actions = Vec::new();
    let same_corner = input.bbox.top == output.bbox.top && input.bbox.left == output.bbox.left;

    if input.patch() == output.patch() && input.mask == output.mask {
        if input.bbox == output.bbox {
            actions.push(ObjectAction::Identity);
        } else {
            actions.push(ObjectAction::Translate {
                dr: output.bbox.top as isize - input.bbox.top as isize,
                dc: output.bbox.left as isize - input.bbox.left as isize,
            });
        }
    }

    if same_corner {
        for transform in [Dihedral::FlipRows, Dihedral::FlipCols] {
            if input.patch() != output.patch()
                && transform.apply_array(input.patch()) == *output.patch()
            {
                actions.push(ObjectAction::Reflect(transform));
            }
        }
        for turns in 1..=3 {
            let transform = Dihedral::rotation(turns);
            if input.patch() != output.patch()
                && transform.apply_array(input.patch()) == *output.patch()
            {
                actions.push(ObjectAction::Rotate(turns));
            }
        }
        if input.bbox == output.bbox
            && input.mask == output.mask
            && output.is_uniform()
            && input.patch() != output.patch()
        {
            actions.push(ObjectAction::Recolor(output.dominant_symbol()));
        }
        let factor = output.bbox.height / input.bbox.height.max(1);
        if factor >= 2 {
            if let Ok(source) = Grid::from_array(input.patch().clone()) {
                let enlarged = upscale(&source, factor, factor);
                if enlarged.is_some_and(|big| big.cells() == output.patch()) {
                    actions.push(ObjectAction::Resize(factor));
                }
            }
        }
    }

    actions
}

/// Object matches of every pair under one extraction parameter set
///
/// The detection parameters reuse the matches already stored in the
/// relationship graph.
fn pair_matches(
    train: &[(Grid, Grid)],
    hierarchy: &PatternHierarchy,
    relationships: &RelationshipGraph,
    params: &ExtractionParams,
    config: &InductionConfig,
) -> Vec<(Vec<GridObject>, Vec<GridObject>, Vec<ObjectMatch>)> {
    let reuse = *params == detection_params(config.background)
        && relationships.matches.len() == hierarchy.pairs.len();

    train
        .iter()
        .enumerate()
        .map(|(index, (input, output))| {
            if reuse {
                if let (Some(pair), Some(matches)) =
                    (hierarchy.pairs.get(index), relationships.matches.get(index))
                {
                    return (
                        pair.input.objects.clone(),
                        pair.output.objects.clone(),
                        matches.clone(),
                    );
                }
            }
            let mut inputs = extract_objects(input, params);
            let mut outputs = extract_objects(output, params);
            inputs.truncate(config.max_objects);
            outputs.truncate(config.max_objects);
            let matches = match_objects(&inputs, &outputs, config.match_threshold);
            (inputs, outputs, matches)
        })
        .collect()
}

fn propose_object_rules(
    hypotheses: &mut Hypotheses,
    train: &[(Grid, Grid)],
    hierarchy: &PatternHierarchy,
    relationships: &RelationshipGraph,
    config: &InductionConfig,
) {
    let landmark_actions: Vec<ObjectAction> = hierarchy
        .patterns(&hierarchy.meta)
        .filter_map(|pattern| match pattern.kind {
            PatternKind::MetaDelta {
                key: TrackingKey::Landmark,
                delta,
                ..
            } => match delta {
                Delta::Translated { dr, dc } => Some(ObjectAction::Translate { dr, dc }),
                Delta::Recolored { to, .. } => Some(ObjectAction::Recolor(to)),
                Delta::Scaled { factor } => Some(ObjectAction::Resize(factor)),
                _ => None,
            },
            _ => None,
        })
        .collect();

    for params in ExtractionParams::search_space(config.background) {
        for &action in &landmark_actions {
            hypotheses.propose(vec![SubRule::Object {
                params,
                selector: ObjectSelector::Largest,
                action,
            }]);
        }

        for (inputs, outputs, matches) in
            pair_matches(train, hierarchy, relationships, &params, config)
        {
            for m in &matches {
                let (Some(input), Some(output)) = (
                    inputs.iter().find(|o| o.id == m.input),
                    outputs.iter().find(|o| o.id == m.output),
                ) else {
                    continue;
                };
                for action in infer_actions(input, output) {
                    if action == ObjectAction::Identity {
                        continue;
                    }
                    for selector in [
                        ObjectSelector::All,
                        ObjectSelector::Symbol(input.dominant_symbol()),
                        ObjectSelector::Largest,
                        ObjectSelector::Smallest,
                    ] {
                        hypotheses.propose(vec![SubRule::Object {
                            params,
                            selector,
                            action,
                        }]);
                    }
                }
            }
        }
    }
}

fn propose_all(
    train: &[(Grid, Grid)],
    hierarchy: &PatternHierarchy,
    relationships: &RelationshipGraph,
    config: &InductionConfig,
) -> Hypotheses {
    let mut hypotheses = Hypotheses::new(config.max_candidates);
    let factors = shared_factors(train);

    hypotheses.propose(Vec::new());

    if let Some(table) = remap_from_patterns(train, hierarchy) {
        hypotheses.propose(vec![SubRule::Remap(table)]);
    }
    for transform in Dihedral::NON_IDENTITY {
        if let Some(table) = remap_after(train, |grid| Some(transform.apply(grid))) {
            hypotheses.propose(vec![SubRule::Global(transform), SubRule::Remap(table)]);
        }
    }
    if let Some((rows, cols)) = factors {
        if let Some(table) = remap_after(train, |grid| upscale(grid, rows, cols)) {
            hypotheses.propose(vec![SubRule::Scale { rows, cols }, SubRule::Remap(table)]);
        }
    }

    if let Some(table) = positional_table(train) {
        hypotheses.propose(vec![SubRule::PositionalRemap(table)]);
    }

    for transform in Dihedral::NON_IDENTITY {
        hypotheses.propose(vec![SubRule::Global(transform)]);
    }

    if let Some((rows, cols)) = factors {
        hypotheses.propose(vec![SubRule::Scale { rows, cols }]);
        hypotheses.propose(vec![SubRule::Tile { rows, cols }]);
    }

    for pattern in hierarchy.patterns(&hierarchy.meta) {
        if let PatternKind::MetaDelta {
            key: TrackingKey::Symmetry(transform),
            delta: Delta::Added,
            ..
        } = pattern.kind
        {
            hypotheses.propose(vec![SubRule::Complete {
                transform,
                background: config.background,
            }]);
        }
    }
    for transform in SYMMETRY_TRANSFORMS {
        let every_output_exact = hierarchy.pairs.iter().all(|pair| {
            hierarchy.patterns(&pair.output.atomic).any(|p| {
                p.is_grid_scoped()
                    && p.confidence >= 1.0
                    && p.kind == PatternKind::Symmetry { transform }
            })
        });
        if every_output_exact && !hierarchy.pairs.is_empty() {
            hypotheses.propose(vec![SubRule::Complete {
                transform,
                background: config.background,
            }]);
        }
    }

    propose_object_rules(&mut hypotheses, train, hierarchy, relationships, config);

    for pair in &hierarchy.pairs {
        for pattern in hierarchy.patterns(&pair.structural) {
            if let PatternKind::Partition {
                scheme,
                measure: PartitionMeasure::Reproduction(inner),
                per_part,
                ..
            } = pattern.kind
            {
                if per_part >= 1.0 {
                    hypotheses.propose(vec![SubRule::PartitionWise {
                        scheme,
                        inner,
                        background: config.background,
                    }]);
                }
            }
        }
    }

    hypotheses
}

/// Score a candidate that reproduces every pair
///
/// A pair supports the candidate when the candidate changed something on
/// it, or when the pair itself leaves the grid unchanged.
fn scored(
    mut candidate: TransformationCandidate,
    train: &[(Grid, Grid)],
) -> TransformationCandidate {
    candidate.supporting = train
        .iter()
        .filter(|(input, output)| {
            input == output || candidate.apply(input).is_some_and(|result| result != *input)
        })
        .count();
    candidate.confidence = score(&Evidence::across_pairs(
        candidate.supporting,
        1.0,
        candidate.complexity,
    ));
    candidate
}

/// Outcome of hypothesis replay
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// Valid candidates, best first
    pub candidates: Vec<TransformationCandidate>,
    /// Number of distinct hypotheses replayed
    pub examined: usize,
}

/// Ranked candidates that reproduce every training pair
///
/// # Errors
///
/// Returns `NoValidCandidate` when no proposed rule reproduces every pair
pub fn synthesize(
    train: &[(Grid, Grid)],
    hierarchy: &PatternHierarchy,
    relationships: &RelationshipGraph,
    config: &InductionConfig,
) -> Result<Synthesis> {
    let hypotheses = propose_all(train, hierarchy, relationships, config);
    let examined = hypotheses.ordered.len();

    let mut valid: Vec<TransformationCandidate> = hypotheses
        .ordered
        .into_par_iter()
        .enumerate()
        .filter_map(|(order, steps)| {
            let candidate = TransformationCandidate::new(steps, order);
            if candidate.reproduces(train) {
                Some(scored(candidate, train))
            } else {
                trace!(candidate = %candidate, "rejected hypothesis");
                None
            }
        })
        .collect();

    valid.sort_by(|a, b| rank_order(a.rank_key(), b.rank_key()));
    debug!(examined, valid = valid.len(), "hypothesis replay complete");

    if valid.is_empty() {
        return Err(InductionError::NoValidCandidate { examined });
    }
    Ok(Synthesis {
        candidates: valid,
        examined,
    })
}
