use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// What the batch driver does after a file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Report the failure and end the run, leaving the remaining files alone
    StopOnFirstError,
    /// Report the failure and move on to the next file
    ContinueOnError,
}

/// Result of one successfully processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Set when the transform deleted its input (in-place conversion)
    pub removed_source: bool,
}

/// Per-run tally of a batch
#[derive(Debug)]
pub struct BatchReport {
    pub total_files: usize,
    pub completed: Vec<FileOutcome>,
    pub failures: Vec<(PathBuf, Error)>,
    /// Files never attempted because the run was stopped
    pub skipped: usize,
    pub aborted: bool,
    pub duration: Duration,
}

impl BatchReport {
    fn new(total_files: usize) -> Self {
        Self {
            total_files,
            completed: Vec::new(),
            failures: Vec::new(),
            skipped: 0,
            aborted: false,
            duration: Duration::new(0, 0),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.completed.len() as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn average_duration(&self) -> Duration {
        let attempted = self.attempted();
        if attempted == 0 {
            Duration::new(0, 0)
        } else {
            self.duration / attempted as u32
        }
    }
}

/// Process files one after another in the given order.
///
/// `process_fn` transforms a single file; `on_result` is called right after
/// each attempt so the caller can report progress before the next file
/// starts. Under [`ErrorPolicy::StopOnFirstError`] the first failure ends the
/// run and every later file is counted as skipped.
pub fn process_files_sequential<F, R>(
    files: &[PathBuf],
    policy: ErrorPolicy,
    mut process_fn: F,
    mut on_result: R,
) -> BatchReport
where
    F: FnMut(&Path) -> Result<FileOutcome>,
    R: FnMut(&Path, &Result<FileOutcome>),
{
    let start_time = Instant::now();
    let mut report = BatchReport::new(files.len());

    for (index, file_path) in files.iter().enumerate() {
        let result = process_fn(file_path.as_path());
        on_result(file_path.as_path(), &result);

        match result {
            Ok(outcome) => report.completed.push(outcome),
            Err(e) => {
                report.failures.push((file_path.clone(), e));
                if policy == ErrorPolicy::StopOnFirstError {
                    report.skipped = files.len() - index - 1;
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    report.duration = start_time.elapsed();
    report
}
