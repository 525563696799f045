//! Tests for configuration constants and defaults

#[cfg(test)]
mod tests {
    use gridrule::io::configuration::{
        COMPLEXITY_WEIGHT, DEFAULT_BACKGROUND, InductionConfig, MATCH_THRESHOLD,
        MAX_CANDIDATES, MAX_OBJECTS_PER_GRID, MAX_RELATION_OBJECTS, MIN_PATTERN_CONFIDENCE,
        OUTPUT_SUFFIX, PALETTE_SIZE, SYMMETRY_REPORT_THRESHOLD, W_HISTOGRAM, W_IOU, W_SHAPE,
    };

    // Tests similarity weights form a convex combination
    // Verified by changing one weight
    #[test]
    fn test_similarity_weights_sum_to_one() {
        assert!((W_IOU + W_HISTOGRAM + W_SHAPE - 1.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&MATCH_THRESHOLD));
    }

    // Tests thresholds lie in the unit interval
    #[test]
    fn test_thresholds_in_range() {
        for value in [SYMMETRY_REPORT_THRESHOLD, MIN_PATTERN_CONFIDENCE] {
            assert!((0.0..=1.0).contains(&value));
        }
        assert!(COMPLEXITY_WEIGHT > 0.0);
    }

    // Tests limits are consistent with each other
    #[test]
    fn test_limits() {
        assert!(MAX_RELATION_OBJECTS <= MAX_OBJECTS_PER_GRID);
        assert!(MAX_CANDIDATES > 0);
        assert!(usize::from(DEFAULT_BACKGROUND) < PALETTE_SIZE);
        assert!(!OUTPUT_SUFFIX.is_empty());
    }

    // Tests defaults come from the constants
    #[test]
    fn test_default_config() {
        let config = InductionConfig::default();
        assert_eq!(config.background, DEFAULT_BACKGROUND);
        assert_eq!(config.max_candidates, MAX_CANDIDATES);
        assert_eq!(config.max_objects, MAX_OBJECTS_PER_GRID);
        assert!((config.match_threshold - MATCH_THRESHOLD).abs() < f64::EPSILON);
    }

    // Tests overriding the background keeps every other default
    #[test]
    fn test_with_background() {
        let config = InductionConfig::with_background(4);
        assert_eq!(config.background, 4);
        assert_eq!(
            InductionConfig {
                background: DEFAULT_BACKGROUND,
                ..config
            },
            InductionConfig::default()
        );
    }
}
