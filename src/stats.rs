//! Run statistics for `dirgrep`.
//!
//! This module provides:
//! - [`WalkStats`] - lock-free counters updated by every worker
//! - [`WalkSummary`] - a serializable snapshot taken once the pool finishes
//! - [`print_summary`] - one-line human summary on stderr
//! - [`save_stats_json`] - JSON output for scripting integration

use crate::error::WalkResult;
use crate::report::EventKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared by all workers of one walk.
#[derive(Debug)]
pub struct WalkStats {
    dirs: AtomicU64,
    enqueued: AtomicU64,
    present: AtomicU64,
    absent: AtomicU64,
    errors: AtomicU64,
    per_worker_dirs: Vec<AtomicU64>,
}

impl WalkStats {
    pub fn new(workers: usize) -> Self {
        Self {
            dirs: AtomicU64::new(0),
            enqueued: AtomicU64::new(0),
            present: AtomicU64::new(0),
            absent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            per_worker_dirs: (0..workers).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Records one event emitted by `worker`.
    pub fn record(&self, worker: usize, kind: EventKind) {
        let counter = match kind {
            EventKind::Dir => {
                self.per_worker_dirs[worker].fetch_add(1, Ordering::Relaxed);
                &self.dirs
            }
            EventKind::Enqueue => &self.enqueued,
            EventKind::Present => &self.present,
            EventKind::Absent => &self.absent,
            EventKind::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the counters.
    pub fn summarize(&self, started_at: DateTime<Utc>, elapsed: Duration) -> WalkSummary {
        WalkSummary {
            started_at,
            elapsed,
            dirs_visited: self.dirs.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            present: self.present.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            dirs_per_worker: self
                .per_worker_dirs
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

/// Outcome of a completed walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkSummary {
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", with = "duration_serde")]
    pub elapsed: Duration,
    pub dirs_visited: u64,
    pub enqueued: u64,
    pub present: u64,
    pub absent: u64,
    pub errors: u64,
    pub dirs_per_worker: Vec<u64>,
}

impl WalkSummary {
    /// Regular files that were classified as present or absent.
    pub fn files_searched(&self) -> u64 {
        self.present + self.absent
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Prints a one-line summary to stderr, keeping stdout for events.
///
/// # Example Output
/// ```text
/// 12 dirs, 40 files (3 present, 37 absent), 0 errors in 18 ms across 4 workers
/// ```
pub fn print_summary(summary: &WalkSummary) {
    eprintln!(
        "{} dirs, {} files ({} present, {} absent), {} errors in {} ms across {} workers",
        summary.dirs_visited,
        summary.files_searched(),
        summary.present,
        summary.absent,
        summary.errors,
        summary.elapsed.as_millis(),
        summary.dirs_per_worker.len()
    );
}

/// Writes the summary as pretty-printed JSON to `path`.
pub fn save_stats_json(path: &Path, summary: &WalkSummary) -> WalkResult<()> {
    let json = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
    std::fs::write(path, json)?;
    Ok(())
}
