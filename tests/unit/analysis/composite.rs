//! Tests for composite pattern formation

#[cfg(test)]
mod tests {
    use gridrule::analysis::composite::detect_composites;
    use gridrule::analysis::detector::{GridContext, detection_params};
    use gridrule::analysis::patterns::{
        Axis, CompositeRelation, Origin, Pattern, PatternArena, PatternKind, PatternLevel,
    };
    use gridrule::io::configuration::InductionConfig;
    use gridrule::spatial::footprint::Footprint;
    use gridrule::spatial::grid::{Grid, Region};
    use gridrule::spatial::objects::extract_objects;
    use gridrule::spatial::transform::Dihedral;

    fn atomic(kind: PatternKind, confidence: f64) -> Pattern {
        Pattern::new(PatternLevel::Atomic, kind, Origin::train_input(0)).with_confidence(confidence)
    }

    fn symmetry(transform: Dihedral) -> PatternKind {
        PatternKind::Symmetry { transform }
    }

    fn repetition(axis: Axis) -> PatternKind {
        PatternKind::Repetition {
            axis,
            period: 1,
            repeats: 2,
        }
    }

    // Tests overlapping and touching footprints of different kinds combine
    // Verified by allowing same-kind pairs
    #[test]
    fn test_pairwise_composites() {
        let g = Grid::filled(3, 4, 0).expect("valid grid");
        let config = InductionConfig::default();
        let context = GridContext {
            grid: &g,
            objects: &[],
            origin: Origin::train_input(0),
            config: &config,
        };

        let mut arena = PatternArena::new();
        let ids = vec![
            arena.insert(
                atomic(symmetry(Dihedral::FlipCols), 0.8)
                    .with_footprint(Footprint::from_region(3, 4, &Region::new(0, 0, 2, 2))),
            ),
            arena.insert(
                atomic(repetition(Axis::Rows), 0.5)
                    .with_footprint(Footprint::from_region(3, 4, &Region::new(1, 1, 2, 2))),
            ),
            arena.insert(
                atomic(symmetry(Dihedral::FlipRows), 1.0)
                    .with_footprint(Footprint::from_region(3, 4, &Region::new(0, 2, 1, 1))),
            ),
            arena.insert(atomic(repetition(Axis::Cols), 1.0)),
        ];

        let composites = detect_composites(&arena, &ids, &context);
        assert_eq!(composites.len(), 2);

        let first = &composites[0];
        assert_eq!(
            first.kind,
            PatternKind::Composite {
                parts: vec![ids[0], ids[1]],
                relation: CompositeRelation::Overlapping,
            }
        );
        assert_eq!(first.level, PatternLevel::Composite);
        assert_eq!(first.evidence, 1);
        assert!((first.confidence - 0.4).abs() < 1e-12);

        let second = &composites[1];
        assert_eq!(
            second.kind,
            PatternKind::Composite {
                parts: vec![ids[1], ids[2]],
                relation: CompositeRelation::Adjacent,
            }
        );
        assert_eq!(second.evidence, 2, "Contact cells on both sides");
    }

    // Tests an exact symmetry shared by every non-trivial object forms an
    // objectwise composite
    #[test]
    fn test_objectwise_composite() {
        let g = Grid::from_rows(&[vec![1, 1, 0, 2, 2, 0, 3]]).expect("valid grid");
        let config = InductionConfig::default();
        let objects = extract_objects(&g, &detection_params(0));
        let context = GridContext {
            grid: &g,
            objects: &objects,
            origin: Origin::train_input(0),
            config: &config,
        };

        let mut arena = PatternArena::new();
        let ids = vec![
            arena.insert(atomic(symmetry(Dihedral::FlipCols), 1.0).with_objects(vec![0])),
            arena.insert(atomic(symmetry(Dihedral::FlipCols), 1.0).with_objects(vec![1])),
        ];

        let composites = detect_composites(&arena, &ids, &context);
        assert_eq!(composites.len(), 1);
        assert_eq!(
            composites[0].kind,
            PatternKind::Composite {
                parts: ids.clone(),
                relation: CompositeRelation::Objectwise(Dihedral::FlipCols),
            }
        );
        assert_eq!(composites[0].objects, vec![0, 1], "Single cells are trivial");
        assert_eq!(composites[0].footprint.as_ref().map(Footprint::count), Some(4));

        let partial = detect_composites(&arena, &ids[..1], &context);
        assert!(partial.is_empty());
    }
}
