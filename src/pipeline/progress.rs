//! Progress reporting
//!
//! Processing reports its progress through a [`ProgressReporter`]. Reports are
//! informational only and never influence the results.

use std::fmt;
use tracing::info;

/// Receives progress updates while an upload is processed
pub trait ProgressReporter: fmt::Debug {
    /// `done` of `total` steps are complete
    fn on_progress(&mut self, done: usize, total: usize, message: &str);
}

/// Discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_progress(&mut self, _done: usize, _total: usize, _message: &str) {}
}

/// Logs updates as structured `info` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn on_progress(&mut self, done: usize, total: usize, message: &str) {
        info!(done, total, percent = percent(done, total), "{}", message);
    }
}

/// Completion percentage, 100 when there is nothing to do
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
