//! Batch progress display for solving many task files

use crate::io::configuration::MAX_STATUS_LINES;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};

/// Coordinates progress display for a batch of tasks
///
/// A single bar counts finished tasks; beneath it a rolling window lists the
/// most recently finished tasks with their outcome. All methods take `&self`
/// so worker threads can report directly.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: ProgressBar,
    status_bars: Vec<ProgressBar>,
    /// Most recent status lines, newest last
    recent: Mutex<VecDeque<String>>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Tasks: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static STATUS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        let multi_progress = MultiProgress::new();
        let batch_bar = multi_progress.add(ProgressBar::new(0));
        batch_bar.set_style(BATCH_STYLE.clone());
        Self {
            multi_progress,
            batch_bar,
            status_bars: Vec::new(),
            recent: Mutex::new(VecDeque::with_capacity(MAX_STATUS_LINES)),
        }
    }

    /// Size the display for a batch of `task_count` tasks
    pub fn initialize(&mut self, task_count: usize) {
        self.batch_bar.set_length(task_count as u64);
        self.batch_bar.set_position(0);

        let lines = task_count.min(MAX_STATUS_LINES);
        for _ in self.status_bars.len()..lines {
            let bar = ProgressBar::new(0);
            bar.set_style(STATUS_STYLE.clone());
            self.status_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Record a finished task and advance the batch bar
    pub fn complete_task(&self, name: &str, outcome: &str) {
        self.batch_bar.inc(1);
        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() >= MAX_STATUS_LINES {
                recent.pop_front();
            }
            recent.push_back(format!("{outcome} {name}"));
            self.render(&recent);
        }
    }

    /// Show a running tally beside the batch bar
    pub fn set_tally(&self, solved: usize, scored: usize) {
        self.batch_bar.set_message(format!("solved {solved}/{scored}"));
    }

    /// Number of tasks recorded so far
    pub fn completed(&self) -> u64 {
        self.batch_bar.position()
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        self.batch_bar.finish_with_message("All tasks processed");
        let _ = self.multi_progress.clear();
    }

    fn render(&self, recent: &VecDeque<String>) {
        for (index, bar) in self.status_bars.iter().enumerate() {
            bar.set_message(recent.get(index).cloned().unwrap_or_default());
        }
    }
}
