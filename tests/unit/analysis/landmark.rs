//! Tests for salient-object selection and description

#[cfg(test)]
mod tests {
    use gridrule::analysis::detector::{AtomicDetector, GridContext, detection_params};
    use gridrule::analysis::landmark::{
        LandmarkDetector, describe, largest_object, smallest_object,
    };
    use gridrule::analysis::patterns::{Origin, PatternKind};
    use gridrule::io::configuration::InductionConfig;
    use gridrule::spatial::grid::{Grid, Region};
    use gridrule::spatial::objects::{GridObject, extract_objects};

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    fn objects(g: &Grid) -> Vec<GridObject> {
        extract_objects(g, &detection_params(0))
    }

    // Tests largest and smallest selection with ties to the lower id
    // Verified by breaking ties toward the higher id
    #[test]
    fn test_largest_and_smallest() {
        let g = grid(&[&[1, 1, 0, 2], &[0, 0, 0, 2], &[3, 0, 0, 0]]);
        let found = objects(&g);
        assert_eq!(largest_object(&found).map(|o| o.dominant_symbol()), Some(1));
        assert_eq!(smallest_object(&found).map(|o| o.dominant_symbol()), Some(3));
        assert!(largest_object(&[]).is_none());
    }

    // Tests the descriptor captures box, size, symbol and mask
    #[test]
    fn test_describe() {
        let g = grid(&[&[0, 4, 0], &[4, 4, 0]]);
        let found = objects(&g);
        let descriptor = describe(&found[0]);
        assert_eq!(descriptor.bbox, Region::new(0, 0, 2, 2));
        assert_eq!(descriptor.size, 3);
        assert_eq!(descriptor.symbol, 4);
        assert!(descriptor.uniform);
        assert_eq!(descriptor.mask, vec![false, true, true, true]);
    }

    // Tests confidence reflects how much the landmark stands out
    #[test]
    fn test_detector_confidence() {
        let config = InductionConfig::default();
        let run = |g: &Grid| {
            let found = objects(g);
            let context = GridContext {
                grid: g,
                objects: &found,
                origin: Origin::train_input(0),
                config: &config,
            };
            LandmarkDetector.detect(&context)
        };

        let lone = run(&grid(&[&[0, 5], &[5, 5]]));
        assert_eq!(lone.len(), 1);
        assert!((lone[0].confidence - 1.0).abs() < f64::EPSILON);
        assert!(matches!(lone[0].kind, PatternKind::Landmark { object: 0, .. }));

        let tied = run(&grid(&[&[5, 0, 6]]));
        assert!((tied[0].confidence - 0.5).abs() < f64::EPSILON);

        assert!(run(&Grid::filled(2, 2, 0).expect("valid grid")).is_empty());
    }
}
