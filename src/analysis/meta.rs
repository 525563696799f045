//! Meta patterns: changes that repeat identically across training pairs
//!
//! Each tracked property is looked up in the input and the output analysis
//! of every pair and the change is classified. A meta pattern exists only
//! when every pair yields the same classified change, parameters included.

use crate::algorithm::confidence::{Evidence, score};
use crate::analysis::detector::{GridAnalysis, PairAnalysis};
use crate::analysis::patterns::{
    Axis, CompositeRelation, Delta, LandmarkDescriptor, Origin, Pattern, PatternArena, PatternId,
    PatternKind, PatternLevel, TrackingKey,
};
use crate::analysis::symmetry::SYMMETRY_TRANSFORMS;

/// Property a pattern can be tracked by, if any
///
/// Grid-scoped symmetries, repetitions and landmarks are tracked among
/// atomic patterns, objectwise symmetries among composites.
pub fn tracking_key(pattern: &Pattern) -> Option<TrackingKey> {
    match (pattern.level, &pattern.kind) {
        (PatternLevel::Atomic, PatternKind::Symmetry { transform }) if pattern.is_grid_scoped() => {
            Some(TrackingKey::Symmetry(*transform))
        }
        (PatternLevel::Atomic, PatternKind::Repetition { axis, .. }) => {
            Some(TrackingKey::Repetition(*axis))
        }
        (PatternLevel::Atomic, PatternKind::Landmark { .. }) => Some(TrackingKey::Landmark),
        (
            PatternLevel::Composite,
            PatternKind::Composite {
                relation: CompositeRelation::Objectwise(transform),
                ..
            },
        ) => Some(TrackingKey::ObjectwiseSymmetry(*transform)),
        _ => None,
    }
}

/// Every key meta detection looks at, in discovery order
pub fn tracked_keys() -> Vec<TrackingKey> {
    let mut keys: Vec<TrackingKey> = SYMMETRY_TRANSFORMS
        .into_iter()
        .map(TrackingKey::Symmetry)
        .collect();
    keys.push(TrackingKey::Repetition(Axis::Rows));
    keys.push(TrackingKey::Repetition(Axis::Cols));
    keys.push(TrackingKey::Landmark);
    keys.extend(
        SYMMETRY_TRANSFORMS
            .into_iter()
            .map(TrackingKey::ObjectwiseSymmetry),
    );
    keys
}

/// First atomic or composite pattern of a grid carrying `key`
///
/// Symmetries only count when exact, so a nearly symmetric input that
/// becomes exactly symmetric classifies as `Added`.
fn find_keyed<'a>(
    arena: &'a PatternArena,
    grid: &'a GridAnalysis,
    key: TrackingKey,
) -> Option<&'a Pattern> {
    let ids: &[PatternId] = match key {
        TrackingKey::ObjectwiseSymmetry(_) => &grid.composite,
        _ => &grid.atomic,
    };
    arena.resolve(ids).find(|pattern| {
        tracking_key(pattern) == Some(key)
            && (!matches!(key, TrackingKey::Symmetry(_)) || pattern.confidence >= 1.0)
    })
}

/// Classify the change between two landmark descriptors
pub fn landmark_delta(input: &LandmarkDescriptor, output: &LandmarkDescriptor) -> Option<Delta> {
    let same_shape = input.bbox.height == output.bbox.height
        && input.bbox.width == output.bbox.width
        && input.mask == output.mask;

    if same_shape && input.symbol == output.symbol {
        if input.bbox == output.bbox {
            return Some(Delta::Unchanged);
        }
        let dr = output.bbox.top as isize - input.bbox.top as isize;
        let dc = output.bbox.left as isize - input.bbox.left as isize;
        return Some(Delta::Translated { dr, dc });
    }

    if same_shape && input.bbox == output.bbox && input.uniform && output.uniform {
        return Some(Delta::Recolored {
            from: input.symbol,
            to: output.symbol,
        });
    }

    let height = input.bbox.height.max(1);
    let factor = output.bbox.height / height;
    let scaled = factor >= 2
        && output.bbox.height == input.bbox.height * factor
        && output.bbox.width == input.bbox.width * factor
        && output.size == input.size * factor * factor
        && output.symbol == input.symbol;
    scaled.then_some(Delta::Scaled { factor })
}

/// Classify the change of one key over one pair
fn classify(input: Option<&Pattern>, output: Option<&Pattern>) -> Option<Delta> {
    match (input, output) {
        (None, None) => None,
        (None, Some(_)) => Some(Delta::Added),
        (Some(_), None) => Some(Delta::Removed),
        (Some(before), Some(after)) => match (&before.kind, &after.kind) {
            (PatternKind::Symmetry { .. }, PatternKind::Symmetry { .. })
            | (PatternKind::Composite { .. }, PatternKind::Composite { .. }) => {
                Some(Delta::Unchanged)
            }
            (
                PatternKind::Repetition { period: p_in, .. },
                PatternKind::Repetition { period: p_out, .. },
            ) => {
                if p_in == p_out {
                    Some(Delta::Unchanged)
                } else if *p_in > 0 && p_out % p_in == 0 {
                    Some(Delta::Scaled {
                        factor: p_out / p_in,
                    })
                } else {
                    None
                }
            }
            (
                PatternKind::Landmark {
                    descriptor: d_in, ..
                },
                PatternKind::Landmark {
                    descriptor: d_out, ..
                },
            ) => landmark_delta(d_in, d_out),
            _ => None,
        },
    }
}

/// Meta patterns over all training pairs
///
/// Needs at least two pairs; a single pair cannot show consistency.
pub fn detect_meta(arena: &PatternArena, pairs: &[PairAnalysis]) -> Vec<Pattern> {
    if pairs.len() < 2 {
        return Vec::new();
    }

    let mut patterns = Vec::new();
    for key in tracked_keys() {
        let mut shared: Option<Delta> = None;
        let mut observations = Vec::new();
        let mut consistent = true;

        for pair in pairs {
            let before = find_keyed(arena, &pair.input, key);
            let after = find_keyed(arena, &pair.output, key);
            let Some(delta) = classify(before, after) else {
                consistent = false;
                break;
            };
            if shared.is_some_and(|existing| existing != delta) {
                consistent = false;
                break;
            }
            shared = Some(delta);
            observations.extend(before.map(|p| p.id));
            observations.extend(after.map(|p| p.id));
        }

        let Some(delta) = shared.filter(|_| consistent) else {
            continue;
        };
        patterns.push(
            Pattern::new(
                PatternLevel::Meta,
                PatternKind::MetaDelta {
                    key,
                    delta,
                    observations,
                },
                Origin::Task,
            )
            .with_confidence(score(&Evidence::across_pairs(pairs.len(), 1.0, 0)))
            .with_evidence(pairs.len()),
        );
    }
    patterns
}
