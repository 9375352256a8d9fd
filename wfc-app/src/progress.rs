// wfc-app/src/progress.rs

use anyhow::Result;
use std::time::{Duration, Instant};
use wfc_core::{ProgressInfo, WfcError};
use wfc_rules::Symbol;

/// Trait for reporting the progress of a solve.
///
/// Implementors of this trait can display progress information in various ways
/// (e.g., log lines, a status bar).
pub trait ProgressReporter: Send {
    /// Called after every step with the latest snapshot from the runner.
    fn report<S: Symbol>(&mut self, info: &ProgressInfo<'_, S>) -> Result<()>;

    /// Called when the solve completes successfully.
    fn finish(&mut self) -> Result<()>;

    /// Called when the solve fails with an error.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// A `ProgressReporter` that logs status lines, at most once per interval.
#[derive(Debug)]
pub struct ConsoleProgressReporter {
    start_time: Instant,
    last_report_time: Option<Instant>,
    report_interval: Duration,
    reports: usize,
}

impl ConsoleProgressReporter {
    /// Creates a new `ConsoleProgressReporter`.
    ///
    /// # Arguments
    ///
    /// * `report_interval` - The minimum time that must elapse between progress reports.
    pub fn new(report_interval: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            last_report_time: None,
            report_interval,
            reports: 0,
        }
    }

    /// Number of progress lines logged so far.
    pub fn reports(&self) -> usize {
        self.reports
    }

    fn due(&self, now: Instant) -> bool {
        self.last_report_time
            .map_or(true, |last| now.duration_since(last) >= self.report_interval)
    }

    fn format_duration(duration: Duration) -> String {
        format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
    }

    fn eta<S: Symbol>(info: &ProgressInfo<'_, S>) -> String {
        if info.resolved_cells == 0 || info.resolved_cells >= info.total_cells {
            return "N/A".to_string();
        }
        let per_cell = info.elapsed_time.as_secs_f64() / info.resolved_cells as f64;
        let remaining = (info.total_cells - info.resolved_cells) as f64;
        Self::format_duration(Duration::from_secs_f64(per_cell * remaining))
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report<S: Symbol>(&mut self, info: &ProgressInfo<'_, S>) -> Result<()> {
        let now = Instant::now();
        if !self.due(now) {
            return Ok(());
        }
        log::info!(
            "Progress: Iter: {} | Resolved: {}/{} ({:.1}%) | Elapsed: {} | ETA: {}",
            info.iterations,
            info.resolved_cells,
            info.total_cells,
            info.percent(),
            Self::format_duration(info.elapsed_time),
            Self::eta(info)
        );
        self.last_report_time = Some(now);
        self.reports += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            "Solve finished. Total time: {}",
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        log::error!(
            "Solve failed: {}. Total time: {}",
            error,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }
}
