//! Command-line interface for batch solving of task files

use crate::algorithm::solver::Solver;
use crate::io::configuration::{
    DEFAULT_BACKGROUND, DEFAULT_PREDICTIONS, DEFAULT_SEED, InductionConfig, PALETTE_SIZE,
    SYNTHETIC_TRAIN_PAIRS,
};
use crate::io::error::{Result, file_system, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::io::synthetic::TaskGenerator;
use crate::io::task::{
    TaskReport, is_report_path, load_task, report_path, save_report, save_task,
};
use crate::spatial::grid::Symbol;
use clap::{ArgAction, Parser};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "gridrule")]
#[command(
    author,
    version,
    about = "Induce grid transformation rules from examples and predict test outputs"
)]
/// Command-line arguments for the rule induction tool
pub struct Cli {
    /// Task JSON file or directory of task files
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Predictions per test input
    #[arg(short = 'k', long = "predictions", default_value_t = DEFAULT_PREDICTIONS)]
    pub k: usize,

    /// Symbol treated as background
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_BACKGROUND,
        value_parser = clap::value_parser!(u8).range(0..PALETTE_SIZE as i64)
    )]
    pub background: Symbol,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Process tasks even if a report exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Write this many synthetic tasks into TARGET instead of solving
    #[arg(short, long, value_name = "N")]
    pub generate: Option<usize>,

    /// Random seed for synthetic task generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl Cli {
    /// Check if existing reports should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Induction configuration implied by the flags
    pub fn induction_config(&self) -> InductionConfig {
        InductionConfig::with_background(self.background)
    }
}

/// Totals for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Task files solved and reported
    pub processed: usize,
    /// Task files skipped because a report existed
    pub skipped: usize,
    /// Test cases whose expected output was among the predictions
    pub solved: usize,
    /// Test cases that carried an expected output
    pub scored: usize,
    /// Task files that could not be processed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Synthetic task files written
    pub generated: Vec<PathBuf>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.generated.is_empty() {
            return write!(f, "Generated {} synthetic tasks", self.generated.len());
        }
        write!(
            f,
            "Processed {} tasks ({} skipped, {} failed); solved {}/{} test cases",
            self.processed,
            self.skipped,
            self.failed.len(),
            self.solved,
            self.scored
        )
    }
}

/// Orchestrates batch solving of task files with progress tracking
pub struct TaskProcessor {
    cli: Cli,
    solver: Solver,
    progress_manager: Option<ProgressManager>,
}

impl TaskProcessor {
    /// Create a new task processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);
        let solver = Solver::new(cli.induction_config());

        Self {
            cli,
            solver,
            progress_manager,
        }
    }

    /// Solve or generate tasks according to CLI arguments
    ///
    /// Failures of individual task files are recorded in the summary and do
    /// not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid, the thread pool cannot be
    /// built, or synthetic tasks cannot be written
    pub fn process(&mut self) -> Result<BatchSummary> {
        if let Some(count) = self.cli.generate {
            return self.generate(count);
        }

        let (files, skipped) = self.collect_files()?;
        let mut summary = BatchSummary {
            skipped,
            ..BatchSummary::default()
        };
        if files.is_empty() {
            return Ok(summary);
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.cli.jobs.unwrap_or(0))
            .build()
            .map_err(|e| invalid_parameter("jobs", &self.cli.jobs.unwrap_or(0), &e))?;

        let this = &*self;
        let outcomes: Vec<(PathBuf, Result<TaskReport>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| (path.clone(), this.process_file(path)))
                .collect()
        });

        for (path, outcome) in outcomes {
            match outcome {
                Ok(report) => {
                    let (solved, scored) = report.score();
                    summary.processed += 1;
                    summary.solved += solved;
                    summary.scored += scored;
                }
                Err(e) => {
                    error!(task = %path.display(), "{e}");
                    summary.failed.push((path, e.to_string()));
                }
            }
        }

        if let Some(ref pm) = self.progress_manager {
            pm.set_tally(summary.solved, summary.scored);
            pm.finish();
        }

        Ok(summary)
    }

    fn generate(&self, count: usize) -> Result<BatchSummary> {
        std::fs::create_dir_all(&self.cli.target)
            .map_err(file_system(&self.cli.target, "create directory"))?;

        let mut generator = TaskGenerator::new(self.cli.seed);
        let tasks = generator.generate_batch(count, SYNTHETIC_TRAIN_PAIRS)?;

        let mut generated = Vec::with_capacity(tasks.len());
        for (index, generated_task) in tasks.iter().enumerate() {
            let path = self
                .cli
                .target
                .join(format!("synthetic_{index:03}_{}.json", generated_task.family));
            save_task(&generated_task.task, &path)?;
            debug!(path = %path.display(), rule = %generated_task.rule, "wrote synthetic task");
            generated.push(path);
        }

        Ok(BatchSummary {
            generated,
            ..BatchSummary::default()
        })
    }

    /// Task files to solve and the number skipped for existing reports
    fn collect_files(&self) -> Result<(Vec<PathBuf>, usize)> {
        let candidates = if self.cli.target.is_file() {
            if is_task_file(&self.cli.target) {
                vec![self.cli.target.clone()]
            } else {
                return Err(invalid_parameter(
                    "target",
                    &self.cli.target.display(),
                    &"target file must be a task JSON file",
                ));
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            let entries = std::fs::read_dir(&self.cli.target)
                .map_err(file_system(&self.cli.target, "read directory"))?;
            for entry in entries {
                let path = entry
                    .map_err(file_system(&self.cli.target, "read directory"))?
                    .path();
                if is_task_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            files
        } else {
            return Err(invalid_parameter(
                "target",
                &self.cli.target.display(),
                &"target must be a task JSON file or directory",
            ));
        };

        let total = candidates.len();
        let files: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|path| self.should_process_file(path))
            .collect();
        let skipped = total - files.len();
        Ok((files, skipped))
    }

    fn should_process_file(&self, task_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        if report_path(task_path).exists() {
            info!(task = %task_path.display(), "skipping, report exists");
            false
        } else {
            true
        }
    }

    fn process_file(&self, task_path: &Path) -> Result<TaskReport> {
        let start_time = Instant::now();
        let name = task_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let task = load_task(task_path)?;
        let predictions =
            self.solver
                .solve(&task.train_pairs(), &task.test_inputs(), self.cli.k)?;
        let report = TaskReport::new(name.clone(), &task, predictions);
        save_report(&report, &report_path(task_path))?;

        debug!(
            task = %name,
            rule = report.rule.as_deref().unwrap_or("fallback"),
            elapsed_ms = start_time.elapsed().as_millis(),
            "task solved"
        );

        if let Some(ref pm) = self.progress_manager {
            let outcome = match report.score() {
                (_, 0) => "·",
                (solved, scored) if solved == scored => "✓",
                _ => "✗",
            };
            pm.complete_task(&name, outcome);
        }

        Ok(report)
    }
}

fn is_task_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json") && !is_report_path(path)
}
