//! Tests for partitions and per-part structural patterns

#[cfg(test)]
mod tests {
    use gridrule::analysis::detector::{GridContext, detection_params};
    use gridrule::analysis::patterns::{
        Origin, PartitionMeasure, PartitionScheme, PatternKind, PatternLevel,
    };
    use gridrule::analysis::structural::{
        detect_pair_partitions, detect_partitions, partition, partition_objects,
        per_part_reproduction,
    };
    use gridrule::io::configuration::{InductionConfig, MAX_OBJECTS_PER_GRID};
    use gridrule::spatial::grid::{Grid, Region};
    use gridrule::spatial::objects::extract_objects;
    use gridrule::spatial::transform::Dihedral;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    // Tests quadrants skip the middle line of odd dimensions
    // Verified by rounding the second half start down
    #[test]
    fn test_quadrants_skip_middle_line() {
        let g = Grid::filled(5, 5, 0).expect("valid grid");
        let parts = partition(&g, PartitionScheme::Quadrants, &[], 0).expect("applies");
        assert_eq!(
            parts,
            vec![
                Region::new(0, 0, 2, 2),
                Region::new(0, 3, 2, 2),
                Region::new(3, 0, 2, 2),
                Region::new(3, 3, 2, 2),
            ]
        );
        let thin = Grid::filled(1, 4, 0).expect("valid grid");
        assert!(partition(&thin, PartitionScheme::Quadrants, &[], 0).is_none());
    }

    // Tests bands only apply when they divide the grid evenly
    #[test]
    fn test_bands() {
        let g = Grid::filled(4, 6, 0).expect("valid grid");
        let rows = partition(&g, PartitionScheme::RowBands(2), &[], 0).expect("applies");
        assert_eq!(rows, vec![Region::new(0, 0, 2, 6), Region::new(2, 0, 2, 6)]);
        assert!(partition(&g, PartitionScheme::RowBands(3), &[], 0).is_none());
        let cols = partition(&g, PartitionScheme::ColumnBands(3), &[], 0).expect("applies");
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[2], Region::new(0, 4, 4, 2));
    }

    // Tests separator lines must be uniform and not background
    // Verified by accepting background lines as separators
    #[test]
    fn test_separators() {
        let g = grid(&[&[1, 2, 5, 3, 4], &[0, 1, 5, 0, 2], &[3, 3, 5, 1, 0]]);
        let parts = partition(&g, PartitionScheme::Separators, &[], 0).expect("applies");
        assert_eq!(parts, vec![Region::new(0, 0, 3, 2), Region::new(0, 3, 3, 2)]);

        let blank_column = grid(&[&[1, 0, 2], &[3, 0, 4]]);
        assert!(partition(&blank_column, PartitionScheme::Separators, &[], 0).is_none());
    }

    // Tests object boxes need at least two objects
    #[test]
    fn test_object_boxes() {
        let single = grid(&[&[1, 1, 0]]);
        let objects = extract_objects(&single, &detection_params(0));
        assert!(partition(&single, PartitionScheme::ObjectBoxes, &objects, 0).is_none());

        let double = grid(&[&[1, 0, 2]]);
        let objects = extract_objects(&double, &detection_params(0));
        let parts = partition(&double, PartitionScheme::ObjectBoxes, &objects, 0).expect("applies");
        assert_eq!(parts, vec![Region::new(0, 0, 1, 1), Region::new(0, 2, 1, 1)]);
    }

    // Tests per-part reproduction of a transform applied inside each part
    #[test]
    fn test_per_part_reproduction() {
        let input = grid(&[&[1, 2, 3, 4], &[5, 6, 7, 8]]);
        let output = grid(&[&[2, 1, 4, 3], &[6, 5, 8, 7]]);
        let parts = vec![Region::new(0, 0, 2, 2), Region::new(0, 2, 2, 2)];
        let value = per_part_reproduction(&input, &output, &parts, Dihedral::FlipCols);
        assert_eq!(value, Some(1.0));
        let stretched = vec![Region::new(0, 0, 1, 2), Region::new(1, 0, 1, 2)];
        assert_eq!(
            per_part_reproduction(&input, &output, &stretched, Dihedral::Rotate90),
            None
        );
    }

    // Tests symmetry that holds per band but not on the whole grid is reported
    // Verified by dropping the strictly-better-than-whole condition
    #[test]
    fn test_detect_partitions() {
        let g = grid(&[&[1, 1, 2, 2], &[3, 3, 4, 4]]);
        let config = InductionConfig::default();
        let objects = extract_objects(&g, &detection_params(0));
        let context = GridContext {
            grid: &g,
            objects: &objects,
            origin: Origin::train_input(0),
            config: &config,
        };
        let patterns = detect_partitions(&context);
        assert!(patterns.iter().all(|p| p.level == PatternLevel::Structural));

        let bands = patterns
            .iter()
            .find(|p| {
                matches!(
                    p.kind,
                    PatternKind::Partition {
                        scheme: PartitionScheme::ColumnBands(2),
                        ..
                    }
                )
            })
            .expect("column band pattern");
        match bands.kind {
            PatternKind::Partition {
                measure,
                whole,
                per_part,
                ..
            } => {
                assert_eq!(measure, PartitionMeasure::Symmetry(Dihedral::FlipCols));
                assert!((whole - 0.5).abs() < 1e-12);
                assert!((per_part - 1.0).abs() < f64::EPSILON);
            }
            _ => unreachable!(),
        }

        let symmetric = grid(&[&[1, 2, 2, 1]]);
        let objects = extract_objects(&symmetric, &detection_params(0));
        let context = GridContext {
            grid: &symmetric,
            objects: &objects,
            origin: Origin::train_input(0),
            config: &config,
        };
        assert!(
            detect_partitions(&context).iter().all(|p| !matches!(
                p.kind,
                PatternKind::Partition {
                    measure: PartitionMeasure::Symmetry(Dihedral::FlipCols),
                    ..
                }
            )),
            "Whole grid already explains the symmetry"
        );
    }

    // Tests pair partitions find the transform applied inside each part
    #[test]
    fn test_detect_pair_partitions() {
        let input = grid(&[&[1, 2, 3, 4], &[5, 6, 7, 8]]);
        let output = grid(&[&[2, 1, 4, 3], &[6, 5, 8, 7]]);
        let config = InductionConfig::default();
        let objects = extract_objects(&input, &detection_params(0));
        let patterns = detect_pair_partitions(&input, &output, &objects, 2, &config);

        let bands = patterns
            .iter()
            .find(|p| {
                matches!(
                    p.kind,
                    PatternKind::Partition {
                        scheme: PartitionScheme::ColumnBands(2),
                        ..
                    }
                )
            })
            .expect("column band pattern");
        assert_eq!(bands.origin, Origin::Pair(2));
        assert!(matches!(
            bands.kind,
            PatternKind::Partition {
                measure: PartitionMeasure::Reproduction(Dihedral::FlipCols),
                ..
            }
        ));

        let taller = grid(&[&[1, 2, 3, 4], &[5, 6, 7, 8], &[0, 0, 0, 0]]);
        assert!(detect_pair_partitions(&input, &taller, &objects, 0, &config).is_empty());
    }

    // Tests object lists for replay are capped
    #[test]
    fn test_partition_objects_cap() {
        let row: Vec<u8> = (0..60).map(|i| if i % 2 == 0 { 3 } else { 0 }).collect();
        let g = Grid::from_rows(&[row]).expect("valid grid");
        assert_eq!(partition_objects(&g, 0).len(), MAX_OBJECTS_PER_GRID);
    }
}
