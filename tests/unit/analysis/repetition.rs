//! Tests for row and column periodicity detection

#[cfg(test)]
mod tests {
    use gridrule::analysis::detector::{AtomicDetector, GridContext, detection_params};
    use gridrule::analysis::patterns::{Axis, Origin, PatternKind};
    use gridrule::analysis::repetition::{RepetitionDetector, smallest_period};
    use gridrule::io::configuration::InductionConfig;
    use gridrule::spatial::grid::Grid;
    use gridrule::spatial::objects::extract_objects;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    // Tests the smallest row period is found with its repeat count
    // Verified by searching periods from the largest down
    #[test]
    fn test_smallest_row_period() {
        let g = grid(&[&[1, 2], &[3, 4], &[1, 2], &[3, 4], &[1, 2]]);
        assert_eq!(smallest_period(&g, Axis::Rows), Some((2, 2)));
    }

    // Tests column periods and uniform grids
    #[test]
    fn test_column_period_and_uniform_grid() {
        let g = grid(&[&[5, 6, 5, 6, 5, 6]]);
        assert_eq!(smallest_period(&g, Axis::Cols), Some((2, 3)));

        let uniform = Grid::filled(2, 4, 7).expect("valid grid");
        assert_eq!(smallest_period(&uniform, Axis::Cols), Some((1, 4)));
    }

    // Tests a period needs at least two full repeats
    #[test]
    fn test_no_period_without_two_repeats() {
        let g = grid(&[&[1, 2, 3, 1, 2]]);
        assert_eq!(smallest_period(&g, Axis::Cols), None);
        assert_eq!(smallest_period(&g, Axis::Rows), None);
    }

    // Tests the detector reports one pattern per periodic axis
    #[test]
    fn test_detector_reports_periodic_axes() {
        let g = grid(&[&[1, 2, 1, 2], &[1, 2, 1, 2]]);
        let config = InductionConfig::default();
        let objects = extract_objects(&g, &detection_params(config.background));
        let context = GridContext {
            grid: &g,
            objects: &objects,
            origin: Origin::train_output(1),
            config: &config,
        };
        let patterns = RepetitionDetector.detect(&context);
        assert_eq!(patterns.len(), 2);
        assert!(patterns.iter().any(|p| matches!(
            p.kind,
            PatternKind::Repetition {
                axis: Axis::Cols,
                period: 2,
                repeats: 2
            }
        )));
        assert!(patterns.iter().all(|p| p.origin == Origin::train_output(1)));
    }
}
