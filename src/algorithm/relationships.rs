//! Relationships between objects and patterns across a training pair
//!
//! Objects are matched input-to-output by a weighted similarity score and a
//! greedy assignment. Output objects left unmatched are linked to the
//! nearest input object instead. Patterns sharing a tracking key are linked
//! across each pair, and composite and meta patterns depend on their parts.

use std::cmp::Ordering;

use serde::Serialize;

use crate::analysis::detector::PatternHierarchy;
use crate::analysis::meta::tracking_key;
use crate::analysis::patterns::{Origin, PatternId, PatternLevel};
use crate::math::similarity::correspondence_score;
use crate::spatial::objects::GridObject;

/// One end of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    /// A pattern in the arena
    Pattern(PatternId),
    /// An object of one grid
    Object {
        /// Grid holding the object
        origin: Origin,
        /// Object id within that grid
        id: usize,
    },
}

/// Type of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    /// Same entity seen in input and output
    CorrespondsTo,
    /// Higher-level pattern built from a lower-level one
    DependsOn,
    /// Output object with no counterpart, placed relative to an input object
    SpatiallyDerivedFrom,
}

/// Directed, typed, weighted edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Relationship {
    /// Source endpoint
    pub from: Endpoint,
    /// Target endpoint
    pub to: Endpoint,
    /// Edge type
    pub kind: RelationKind,
    /// Strength in [0, 1]
    pub strength: f64,
}

/// Assignment of one input object to one output object
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectMatch {
    /// Input object id
    pub input: usize,
    /// Output object id
    pub output: usize,
    /// Correspondence score
    pub score: f64,
}

/// Relationship edges and per-pair object assignments of a task
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationshipGraph {
    /// All edges in discovery order
    pub edges: Vec<Relationship>,
    /// Object assignments, one list per training pair
    pub matches: Vec<Vec<ObjectMatch>>,
}

impl RelationshipGraph {
    /// Edges of one kind
    pub fn of_kind(&self, kind: RelationKind) -> impl Iterator<Item = &Relationship> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

/// Greedy one-to-one matching of input to output objects
///
/// Pairs scoring at least `threshold` are taken in descending score order;
/// ties go to the smaller input id, then the smaller output id.
pub fn match_objects(
    inputs: &[GridObject],
    outputs: &[GridObject],
    threshold: f64,
) -> Vec<ObjectMatch> {
    let mut scored: Vec<ObjectMatch> = inputs
        .iter()
        .flat_map(|input| {
            outputs.iter().map(move |output| ObjectMatch {
                input: input.id,
                output: output.id,
                score: correspondence_score(input, output),
            })
        })
        .filter(|candidate| candidate.score >= threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.input.cmp(&b.input))
            .then(a.output.cmp(&b.output))
    });

    let mut used_inputs = Vec::new();
    let mut used_outputs = Vec::new();
    let mut matches = Vec::new();
    for candidate in scored {
        if used_inputs.contains(&candidate.input) || used_outputs.contains(&candidate.output) {
            continue;
        }
        used_inputs.push(candidate.input);
        used_outputs.push(candidate.output);
        matches.push(candidate);
    }
    matches
}

/// Nearest input object to an output object by centroid distance
fn nearest<'a>(inputs: &'a [GridObject], output: &GridObject) -> Option<(&'a GridObject, f64)> {
    inputs
        .iter()
        .map(|input| (input, input.centroid_distance(output)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

/// Build the relationship graph of a task from its pattern hierarchy
pub fn analyze_relationships(
    hierarchy: &PatternHierarchy,
    match_threshold: f64,
    max_objects: usize,
) -> RelationshipGraph {
    let mut graph = RelationshipGraph::default();

    for pair in &hierarchy.pairs {
        let inputs = pair
            .input
            .objects
            .get(..pair.input.objects.len().min(max_objects))
            .unwrap_or(&pair.input.objects);
        let outputs = pair
            .output
            .objects
            .get(..pair.output.objects.len().min(max_objects))
            .unwrap_or(&pair.output.objects);

        let matches = match_objects(inputs, outputs, match_threshold);
        for m in &matches {
            graph.edges.push(Relationship {
                from: Endpoint::Object {
                    origin: pair.input.origin,
                    id: m.input,
                },
                to: Endpoint::Object {
                    origin: pair.output.origin,
                    id: m.output,
                },
                kind: RelationKind::CorrespondsTo,
                strength: m.score,
            });
        }

        for output in outputs {
            if matches.iter().any(|m| m.output == output.id) {
                continue;
            }
            if let Some((input, distance)) = nearest(inputs, output) {
                graph.edges.push(Relationship {
                    from: Endpoint::Object {
                        origin: pair.output.origin,
                        id: output.id,
                    },
                    to: Endpoint::Object {
                        origin: pair.input.origin,
                        id: input.id,
                    },
                    kind: RelationKind::SpatiallyDerivedFrom,
                    strength: 1.0 / (1.0 + distance),
                });
            }
        }

        let input_tracked: Vec<PatternId> = [&pair.input.atomic, &pair.input.composite]
            .into_iter()
            .flatten()
            .copied()
            .collect();
        let output_tracked: Vec<PatternId> = [&pair.output.atomic, &pair.output.composite]
            .into_iter()
            .flatten()
            .copied()
            .collect();
        for before in hierarchy.patterns(&input_tracked) {
            let Some(key) = tracking_key(before) else {
                continue;
            };
            for after in hierarchy.patterns(&output_tracked) {
                if tracking_key(after) == Some(key) {
                    graph.edges.push(Relationship {
                        from: Endpoint::Pattern(before.id),
                        to: Endpoint::Pattern(after.id),
                        kind: RelationKind::CorrespondsTo,
                        strength: before.confidence.min(after.confidence),
                    });
                }
            }
        }

        graph.matches.push(matches);
    }

    for pattern in hierarchy.arena.iter() {
        if !matches!(pattern.level, PatternLevel::Composite | PatternLevel::Meta) {
            continue;
        }
        for &part in pattern.kind.parts() {
            graph.edges.push(Relationship {
                from: Endpoint::Pattern(pattern.id),
                to: Endpoint::Pattern(part),
                kind: RelationKind::DependsOn,
                strength: pattern.confidence,
            });
        }
    }

    graph
}
