//! Tests for the end-to-end pipeline

#[cfg(test)]
mod tests {
    use gridrule::algorithm::solver::Solver;
    use gridrule::io::configuration::InductionConfig;
    use gridrule::spatial::grid::Grid;
    use gridrule::{InductionError, solve_task};

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    fn flip_task() -> Vec<(Grid, Grid)> {
        vec![
            (grid(&[&[1, 2, 0]]), grid(&[&[0, 2, 1]])),
            (grid(&[&[3, 0], &[4, 5]]), grid(&[&[0, 3], &[5, 4]])),
        ]
    }

    // Tests empty training input is rejected
    #[test]
    fn test_rejects_empty_training() {
        let result = Solver::default().analyze(&[], &[]);
        assert!(matches!(
            result,
            Err(InductionError::InvalidParameter {
                parameter: "train_pairs",
                ..
            })
        ));
    }

    // Tests zero predictions per test is rejected
    #[test]
    fn test_rejects_zero_k() {
        let result = solve_task(&flip_task(), &[grid(&[&[1]])], 0);
        assert!(matches!(
            result,
            Err(InductionError::InvalidParameter { parameter: "k", .. })
        ));
    }

    // Tests the analysis exposes the best rule
    #[test]
    fn test_analyze_best() {
        let solver = Solver::new(InductionConfig::default());
        let analysis = solver.analyze(&flip_task(), &[]).expect("valid task");
        let best = analysis.best().expect("candidate");
        assert_eq!(best.to_string(), "flip_cols");
        assert_eq!(analysis.hierarchy.pairs.len(), 2);
        assert!(analysis.examined >= analysis.candidates.len());
    }

    // Tests one prediction list per test input
    #[test]
    fn test_solve_per_test() {
        let tests = vec![grid(&[&[7, 8, 9]]), grid(&[&[1, 0]])];
        let predictions = Solver::default()
            .solve(&flip_task(), &tests, 2)
            .expect("valid task");
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0][0].grid, grid(&[&[9, 8, 7]]));
        assert_eq!(predictions[1][0].grid, grid(&[&[0, 1]]));
        assert!(predictions.iter().all(|list| !list.is_empty() && list.len() <= 2));
    }

    // Tests a task with no valid rule still predicts through the fallback
    #[test]
    fn test_unsolvable_task_falls_back() {
        let train = vec![(grid(&[&[1]]), grid(&[&[2, 3]]))];
        let analysis = Solver::default().analyze(&train, &[]).expect("valid task");
        assert!(analysis.candidates.is_empty());

        let predictions = solve_task(&train, &[grid(&[&[4]])], 3).expect("valid task");
        assert_eq!(predictions[0].len(), 1);
        assert!(predictions[0][0].fallback);
        assert_eq!(predictions[0][0].grid, grid(&[&[0, 0]]));
    }
}
