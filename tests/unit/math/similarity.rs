//! Tests for histogram, shape and weighted correspondence similarity

#[cfg(test)]
mod tests {
    use gridrule::io::configuration::{W_HISTOGRAM, W_IOU, W_SHAPE};
    use gridrule::math::similarity::{correspondence_score, histogram_intersection, shape_match};
    use gridrule::spatial::grid::Grid;
    use gridrule::spatial::objects::{ExtractionParams, GridObject, extract_objects};

    fn objects(rows: &[&[u8]]) -> Vec<GridObject> {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        let grid = Grid::from_rows(&rows).expect("valid test grid");
        extract_objects(&grid, &ExtractionParams::default())
    }

    // Tests histogram intersection normalizes by the larger total
    // Verified by dividing by the smaller total
    #[test]
    fn test_histogram_intersection() {
        let mut a = [0; 10];
        let mut b = [0; 10];
        a[1] = 4;
        b[1] = 2;
        b[2] = 2;
        assert!((histogram_intersection(&a, &b) - 0.5).abs() < f64::EPSILON);
        assert!((histogram_intersection(&a, &a) - 1.0).abs() < f64::EPSILON);
        assert!(histogram_intersection(&[0; 10], &[0; 10]).abs() < f64::EPSILON);
    }

    // Tests identical objects score the sum of all weights
    #[test]
    fn test_identical_objects_score_one() {
        let found = objects(&[&[3, 3], &[0, 3]]);
        let score = correspondence_score(&found[0], &found[0]);
        assert!((score - (W_IOU + W_HISTOGRAM + W_SHAPE)).abs() < 1e-12);
        assert!((shape_match(&found[0], &found[0]) - 1.0).abs() < f64::EPSILON);
    }

    // Tests a moved recolored object keeps only the shape component
    #[test]
    fn test_moved_recolored_object() {
        let before = objects(&[&[2, 2, 0, 0], &[0, 0, 0, 0]]);
        let after = objects(&[&[0, 0, 0, 0], &[0, 0, 5, 5]]);
        let score = correspondence_score(&before[0], &after[0]);
        assert!((score - W_SHAPE).abs() < 1e-12);
    }

    // Tests different shapes score zero shape agreement
    #[test]
    fn test_shape_mismatch() {
        let found = objects(&[&[1, 1, 0, 2], &[0, 0, 0, 2]]);
        assert!(shape_match(&found[0], &found[1]).abs() < f64::EPSILON);
    }
}
