//! Tests for prediction generation and fallbacks

#[cfg(test)]
mod tests {
    use gridrule::algorithm::candidates::{SubRule, TransformationCandidate};
    use gridrule::algorithm::predictor::{FallbackContext, predict};
    use gridrule::spatial::grid::Grid;
    use gridrule::spatial::transform::Dihedral;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    fn candidate(steps: Vec<SubRule>, confidence: f64, order: usize) -> TransformationCandidate {
        let mut candidate = TransformationCandidate::new(steps, order);
        candidate.confidence = confidence;
        candidate
    }

    fn preserving() -> FallbackContext {
        FallbackContext {
            shape_preserving: true,
            output_shape: Some((1, 2)),
            background: 0,
        }
    }

    // Tests predictions follow the ranking and stop at k
    #[test]
    fn test_ranked_and_limited() {
        let ranked = vec![
            candidate(vec![SubRule::Global(Dihedral::FlipCols)], 0.9, 0),
            candidate(vec![SubRule::Remap([(1, 5)].into_iter().collect())], 0.8, 1),
            candidate(Vec::new(), 0.7, 2),
        ];
        let test = grid(&[&[1, 2]]);
        let predictions = predict(&test, &ranked, 2, &preserving());

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].grid, grid(&[&[2, 1]]));
        assert_eq!(predictions[0].rank, 1);
        assert_eq!(predictions[0].candidate.as_deref(), Some("flip_cols"));
        assert_eq!(predictions[1].grid, grid(&[&[5, 2]]));
        assert_eq!(predictions[1].rank, 2);
        assert!(predictions.iter().all(|p| !p.fallback && !p.ambiguous));
    }

    // Tests duplicate grids keep only the higher-ranked producer
    // Verified by removing the duplicate check
    #[test]
    fn test_duplicates_removed() {
        let ranked = vec![
            candidate(vec![SubRule::Global(Dihedral::FlipCols)], 0.9, 0),
            candidate(vec![SubRule::Global(Dihedral::Rotate180)], 0.8, 1),
            candidate(Vec::new(), 0.7, 2),
        ];
        let predictions = predict(&grid(&[&[1, 2]]), &ranked, 3, &preserving());
        assert_eq!(predictions.len(), 2);
        assert!((predictions[0].confidence - 0.9).abs() < f64::EPSILON);
        assert!(predictions[1].grid == grid(&[&[1, 2]]));
    }

    // Tests inapplicable candidates are skipped
    #[test]
    fn test_inapplicable_skipped() {
        let ranked = vec![
            candidate(
                vec![SubRule::Complete {
                    transform: Dihedral::Transpose,
                    background: 0,
                }],
                0.9,
                0,
            ),
            candidate(vec![SubRule::Global(Dihedral::FlipCols)], 0.8, 1),
        ];
        let predictions = predict(&grid(&[&[1, 2, 3]]), &ranked, 3, &preserving());
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].grid, grid(&[&[3, 2, 1]]));
        assert_eq!(predictions[0].rank, 1);
    }

    // Tests tied candidates that disagree share a rank and are flagged
    // Verified by assigning consecutive ranks regardless of ties
    #[test]
    fn test_ambiguous_ties() {
        let ranked = vec![
            candidate(vec![SubRule::Global(Dihedral::FlipCols)], 0.8, 0),
            candidate(vec![SubRule::Global(Dihedral::FlipRows)], 0.8, 1),
            candidate(Vec::new(), 0.5, 2),
        ];
        let test = grid(&[&[1, 2], &[3, 4]]);
        let predictions = predict(&test, &ranked, 3, &preserving());

        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].rank, 1);
        assert_eq!(predictions[1].rank, 1);
        assert!(predictions[0].ambiguous && predictions[1].ambiguous);
        assert_eq!(predictions[2].rank, 2);
        assert!(!predictions[2].ambiguous);
    }

    // Tests the fallback copies the input for shape-preserving tasks
    #[test]
    fn test_fallback_copy() {
        let test = grid(&[&[4, 5]]);
        let predictions = predict(&test, &[], 3, &preserving());
        assert_eq!(predictions.len(), 1);
        assert!(predictions[0].fallback);
        assert_eq!(predictions[0].grid, test);
        assert_eq!(predictions[0].candidate, None);
        assert!(predictions[0].confidence.abs() < f64::EPSILON);
    }

    // Tests the fallback context picks the most common output shape
    #[test]
    fn test_fallback_context() {
        let train = vec![
            (grid(&[&[1]]), grid(&[&[1, 1]])),
            (grid(&[&[2]]), grid(&[&[2], &[2]])),
            (grid(&[&[3]]), grid(&[&[3], &[3]])),
        ];
        let context = FallbackContext::from_training(&train, 7);
        assert!(!context.shape_preserving);
        assert_eq!(context.output_shape, Some((2, 1)));

        let guess = context.prediction(&grid(&[&[9]]));
        assert_eq!(guess.grid, grid(&[&[7], &[7]]));
        assert!(guess.fallback);

        let same = FallbackContext::from_training(&[(grid(&[&[1]]), grid(&[&[2]]))], 0);
        assert!(same.shape_preserving);
    }

    // Tests shape ties resolve to the earliest output shape
    #[test]
    fn test_fallback_shape_tie() {
        let train = vec![
            (grid(&[&[1]]), grid(&[&[1, 1, 1]])),
            (grid(&[&[2]]), grid(&[&[2], &[2]])),
        ];
        let context = FallbackContext::from_training(&train, 0);
        assert_eq!(context.output_shape, Some((1, 3)));
    }
}
