//! Task files and prediction reports
//!
//! A task file holds training pairs and test inputs as nested integer
//! arrays. Test cases may carry the expected output, in which case the
//! report records whether any of the top predictions matched it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::algorithm::predictor::Prediction;
use crate::io::configuration::OUTPUT_SUFFIX;
use crate::io::error::{InductionError, Result, file_system};
use crate::spatial::grid::Grid;

/// One training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPair {
    /// Example input
    pub input: Grid,
    /// Example output
    pub output: Grid,
}

/// One test input, optionally with its expected output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Input to predict an output for
    pub input: Grid,
    /// Expected output, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Grid>,
}

/// Training pairs and test inputs of one puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Training examples
    pub train: Vec<TaskPair>,
    /// Test cases
    #[serde(default)]
    pub test: Vec<TestCase>,
}

impl Task {
    /// Training examples as `(input, output)` tuples
    pub fn train_pairs(&self) -> Vec<(Grid, Grid)> {
        self.train
            .iter()
            .map(|pair| (pair.input.clone(), pair.output.clone()))
            .collect()
    }

    /// Test inputs in file order
    pub fn test_inputs(&self) -> Vec<Grid> {
        self.test.iter().map(|case| case.input.clone()).collect()
    }
}

/// Read and validate a task file
///
/// # Errors
///
/// Returns `FileSystem` if the file cannot be read and `TaskFormat` if it
/// is not valid task JSON (including malformed grids)
pub fn load_task(path: &Path) -> Result<Task> {
    let content = fs::read_to_string(path).map_err(file_system(path, "read task"))?;
    serde_json::from_str(&content).map_err(|source| InductionError::TaskFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a task file
///
/// # Errors
///
/// Returns `TaskFormat` if serialization fails and `FileSystem` if the file
/// cannot be written
pub fn save_task(task: &Task, path: &Path) -> Result<()> {
    let json = serde_json::to_string(task).map_err(|source| InductionError::TaskFormat {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(file_system(path, "write task"))
}

/// Predictions for one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    /// Position of the test case in the task file
    pub index: usize,
    /// Ranked predictions
    pub predictions: Vec<Prediction>,
    /// Whether a prediction matched the expected output, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
}

/// Outcome of solving one task file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    /// Task name, the file stem
    pub task: String,
    /// Description of the best rule, absent when every prediction fell back
    pub rule: Option<String>,
    /// Per-test results
    pub tests: Vec<TestReport>,
}

impl TaskReport {
    /// Pair predictions with the task's test cases
    pub fn new(name: impl Into<String>, task: &Task, predictions: Vec<Vec<Prediction>>) -> Self {
        let tests: Vec<TestReport> = predictions
            .into_iter()
            .enumerate()
            .map(|(index, predictions)| {
                let solved = task
                    .test
                    .get(index)
                    .and_then(|case| case.output.as_ref())
                    .map(|expected| predictions.iter().any(|p| &p.grid == expected));
                TestReport {
                    index,
                    predictions,
                    solved,
                }
            })
            .collect();

        let rule = tests
            .iter()
            .flat_map(|test| test.predictions.first())
            .find_map(|prediction| prediction.candidate.clone());

        Self {
            task: name.into(),
            rule,
            tests,
        }
    }

    /// Number of test cases solved and number that carried an expected output
    pub fn score(&self) -> (usize, usize) {
        self.tests
            .iter()
            .filter_map(|test| test.solved)
            .fold((0, 0), |(solved, scored), hit| {
                (solved + usize::from(hit), scored + 1)
            })
    }

    /// Whether every scored test case was solved; false when none were scored
    pub fn is_solved(&self) -> bool {
        let (solved, scored) = self.score();
        scored > 0 && solved == scored
    }
}

/// Write a report as pretty-printed JSON
///
/// # Errors
///
/// Returns `TaskFormat` if serialization fails and `FileSystem` if the file
/// cannot be written
pub fn save_report(report: &TaskReport, path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).map_err(|source| InductionError::TaskFormat {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, json).map_err(file_system(path, "write report"))
}

/// Report path for a task file: `<stem>_predictions.json` beside it
pub fn report_path(task_path: &Path) -> PathBuf {
    let stem = task_path.file_stem().unwrap_or_default();
    let report_name = format!("{}{OUTPUT_SUFFIX}.json", stem.to_string_lossy());

    if let Some(parent) = task_path.parent() {
        parent.join(report_name)
    } else {
        PathBuf::from(report_name)
    }
}

/// Whether a path names a report rather than a task
pub fn is_report_path(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
