//! Load statistics

use chrono::{DateTime, Local};
use serde::Serialize;

/// Counters accumulated over one load
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    /// Rows committed so far
    pub rows_inserted: usize,
    /// Batches committed so far
    pub batches: usize,
    /// When the run started
    pub started_at: DateTime<Local>,
    /// When the load finished, if it did
    pub finished_at: Option<DateTime<Local>>,
}

impl LoadSummary {
    /// Start a summary now
    pub fn start() -> Self {
        Self::started_at(Local::now())
    }

    /// Start a summary at the given time
    pub fn started_at(started_at: DateTime<Local>) -> Self {
        Self {
            rows_inserted: 0,
            batches: 0,
            started_at,
            finished_at: None,
        }
    }

    /// Record a committed batch
    pub fn record_batch(&mut self, rows: usize) {
        self.rows_inserted += rows;
        self.batches += 1;
    }

    /// Mark the load finished now
    pub fn finish(&mut self) -> DateTime<Local> {
        let now = Local::now();
        self.finished_at = Some(now);
        now
    }

    /// Time between start and finish (or now, if unfinished)
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Local::now) - self.started_at
    }

    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().num_milliseconds() as f64 / 1000.0
    }
}
