//! Composite patterns built from co-located atomic patterns

use std::collections::BTreeMap;

use crate::analysis::detector::GridContext;
use crate::analysis::patterns::{
    CompositeRelation, Pattern, PatternArena, PatternId, PatternKind, PatternLevel,
};
use crate::io::configuration::MAX_COMPOSITES_PER_GRID;
use crate::spatial::footprint::Footprint;
use crate::spatial::transform::Dihedral;

/// Objectwise composites: one exact symmetry shared by every non-trivial object
fn objectwise(
    arena: &PatternArena,
    atomic: &[PatternId],
    context: &GridContext<'_>,
) -> Vec<Pattern> {
    let non_trivial: Vec<usize> = context
        .objects()
        .iter()
        .filter(|o| o.size() >= 2)
        .map(|o| o.id)
        .collect();
    if non_trivial.len() < 2 {
        return Vec::new();
    }

    let mut by_transform: BTreeMap<Dihedral, Vec<(usize, PatternId)>> = BTreeMap::new();
    for pattern in arena.resolve(atomic) {
        if let PatternKind::Symmetry { transform } = pattern.kind {
            if let [object] = pattern.objects.as_slice() {
                if pattern.confidence >= 1.0 {
                    by_transform
                        .entry(transform)
                        .or_default()
                        .push((*object, pattern.id));
                }
            }
        }
    }

    let (rows, cols) = context.grid.dimensions();
    by_transform
        .into_iter()
        .filter(|(_, members)| {
            non_trivial
                .iter()
                .all(|id| members.iter().any(|(object, _)| object == id))
        })
        .map(|(transform, members)| {
            let mut footprint = Footprint::new(rows, cols);
            let mut regions = Vec::new();
            for object in context.objects().iter().filter(|o| non_trivial.contains(&o.id)) {
                footprint = footprint.union(&object.footprint(rows, cols));
                regions.push(object.bbox);
            }
            let parts: Vec<PatternId> = members.iter().map(|&(_, id)| id).collect();
            Pattern::new(
                PatternLevel::Composite,
                PatternKind::Composite {
                    parts,
                    relation: CompositeRelation::Objectwise(transform),
                },
                context.origin,
            )
            .with_regions(regions)
            .with_objects(non_trivial.clone())
            .with_confidence(1.0)
            .with_evidence(non_trivial.len())
            .with_footprint(footprint)
        })
        .collect()
}

/// Overlap or contact between two footprints
fn relate(a: &Footprint, b: &Footprint) -> Option<(CompositeRelation, Footprint)> {
    let shared = a.intersection(b);
    if !shared.is_empty() {
        return Some((CompositeRelation::Overlapping, shared));
    }
    let contact = a.contact(b).union(&b.contact(a));
    (!contact.is_empty()).then_some((CompositeRelation::Adjacent, contact))
}

/// Composite patterns of one grid
///
/// Pairs of atomic patterns of different kinds combine when their
/// footprints overlap or touch. Evidence is the shared cells (or the contact
/// cells when they only touch) and confidence is the product of the parts.
/// Objectwise composites come first; the total is capped per grid.
pub fn detect_composites(
    arena: &PatternArena,
    atomic: &[PatternId],
    context: &GridContext<'_>,
) -> Vec<Pattern> {
    let mut composites = objectwise(arena, atomic, context);
    let candidates: Vec<&Pattern> = arena
        .resolve(atomic)
        .filter(|p| p.footprint.is_some())
        .collect();

    'outer: for (i, first) in candidates.iter().enumerate() {
        for second in candidates.iter().skip(i + 1) {
            if composites.len() >= MAX_COMPOSITES_PER_GRID {
                break 'outer;
            }
            if first.kind.name() == second.kind.name() {
                continue;
            }
            let (Some(a), Some(b)) = (&first.footprint, &second.footprint) else {
                continue;
            };
            let Some((relation, evidence)) = relate(a, b) else {
                continue;
            };

            let mut objects: Vec<usize> = first.objects.clone();
            for &object in &second.objects {
                if !objects.contains(&object) {
                    objects.push(object);
                }
            }
            let mut regions = first.regions.clone();
            regions.extend(second.regions.iter().copied());

            composites.push(
                Pattern::new(
                    PatternLevel::Composite,
                    PatternKind::Composite {
                        parts: vec![first.id, second.id],
                        relation,
                    },
                    context.origin,
                )
                .with_regions(regions)
                .with_objects(objects)
                .with_confidence(first.confidence * second.confidence)
                .with_evidence(evidence.count())
                .with_footprint(evidence),
            );
        }
    }

    composites.truncate(MAX_COMPOSITES_PER_GRID);
    composites
}
