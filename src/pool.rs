//! Fixed-size worker pool.
//!
//! [`WorkerPool::run`] seeds the task queue with the root directory, starts
//! one named thread per worker, and blocks until every worker has observed
//! quiescence (or the walk was cancelled by a fatal error).

use crate::config::{UnreadablePolicy, WalkConfig};
use crate::detector::TerminationDetector;
use crate::error::{WalkError, WalkResult};
use crate::lister::DirLister;
use crate::matcher::PatternMatcher;
use crate::queue::TaskQueue;
use crate::report::EventSink;
use crate::stats::{WalkStats, WalkSummary};
use crate::task::{DEFAULT_MAX_PATH_LEN, Task};
use crate::walker::{WalkContext, Walker};
use chrono::Utc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    max_path_len: usize,
    on_unreadable: UnreadablePolicy,
}

impl WorkerPool {
    /// Creates a pool of `workers` threads. Any positive count is accepted
    /// here; the CLI applies its own upper bound through [`WalkConfig`].
    pub fn new(workers: usize) -> WalkResult<Self> {
        if workers == 0 {
            return Err(WalkError::NoWorkers);
        }
        Ok(Self {
            workers,
            max_path_len: DEFAULT_MAX_PATH_LEN,
            on_unreadable: UnreadablePolicy::Abort,
        })
    }

    pub fn from_config(config: &WalkConfig) -> WalkResult<Self> {
        Ok(Self::new(config.workers)?
            .with_max_path_len(config.max_path_len)
            .with_unreadable_policy(config.on_unreadable))
    }

    pub fn with_max_path_len(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }

    pub fn with_unreadable_policy(mut self, policy: UnreadablePolicy) -> Self {
        self.on_unreadable = policy;
        self
    }

    /// Walks the tree under `root` and returns once all workers are done.
    ///
    /// # Errors
    /// Returns the first fatal error raised by a worker (lowest worker id
    /// first), a spawn failure, or a panic. Per-entry failures are reported
    /// as events and do not fail the walk.
    pub fn run(
        &self,
        root: Task,
        lister: &dyn DirLister,
        matcher: &dyn PatternMatcher,
        sink: &dyn EventSink,
    ) -> WalkResult<WalkSummary> {
        let queue = TaskQueue::new();
        let detector = TerminationDetector::new(self.workers);
        let stats = WalkStats::new(self.workers);

        info!(root = %root.path().display(), workers = self.workers, "starting walk");
        queue.enqueue(root);

        let ctx = WalkContext {
            queue: &queue,
            detector: &detector,
            lister,
            matcher,
            sink,
            stats: &stats,
            max_path_len: self.max_path_len,
            on_unreadable: self.on_unreadable,
        };

        let started_at = Utc::now();
        let start = Instant::now();

        let results: Vec<WalkResult<()>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.workers);
            let mut results = Vec::new();

            for id in 0..self.workers {
                let ctx = &ctx;
                let spawned = thread::Builder::new()
                    .name(format!("walker-{id}"))
                    .spawn_scoped(s, move || Walker::new(id, ctx).run());
                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(source) => {
                        detector.cancel();
                        results.push(Err(WalkError::WorkerSpawn { id, source }));
                        break;
                    }
                }
            }

            let mut joined: Vec<WalkResult<()>> = handles
                .into_iter()
                .map(|(id, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(WalkError::WorkerPanicked { id }))
                })
                .collect();
            joined.append(&mut results);
            joined
        });

        let elapsed = start.elapsed();
        debug!(
            enqueued = queue.enqueued_total(),
            dequeued = queue.dequeued_total(),
            remaining = queue.len(),
            cancelled = detector.is_cancelled(),
            "pool stopped"
        );

        if let Some(err) = results.into_iter().find_map(Result::err) {
            return Err(err);
        }

        let summary = stats.summarize(started_at, elapsed);
        info!(
            dirs = summary.dirs_visited,
            files = summary.files_searched(),
            elapsed_ms = elapsed.as_millis() as u64,
            "walk complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::{FsLister, ListedEntry};
    use crate::matcher::{LiteralMatcher, MatchMode};
    use crate::report::{EventKind, MemoryReporter};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_zero_workers_rejected() {
        let err = WorkerPool::new(0).unwrap_err();
        assert!(matches!(err, WalkError::NoWorkers));
        assert!(!err.to_string().contains(&usize::MAX.to_string()));
    }

    #[test]
    fn test_empty_root() {
        let temp = TempDir::new().unwrap();
        let sink = MemoryReporter::new();
        let matcher = LiteralMatcher::new("x", MatchMode::Lines);
        let root = Task::new(temp.path(), DEFAULT_MAX_PATH_LEN).unwrap();

        let summary = WorkerPool::new(4)
            .unwrap()
            .run(root, &FsLister, &matcher, &sink)
            .unwrap();

        assert_eq!(summary.dirs_visited, 1);
        assert_eq!(summary.dirs_per_worker.len(), 4);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_more_workers_than_dirs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one.txt"), "x").unwrap();
        let sink = MemoryReporter::new();
        let matcher = LiteralMatcher::new("x", MatchMode::Lines);
        let root = Task::new(temp.path(), DEFAULT_MAX_PATH_LEN).unwrap();

        let summary = WorkerPool::new(8)
            .unwrap()
            .run(root, &FsLister, &matcher, &sink)
            .unwrap();
        assert_eq!(summary.present, 1);
    }

    struct PanickingLister;

    impl DirLister for PanickingLister {
        fn list<'a>(
            &'a self,
            _dir: &Path,
        ) -> WalkResult<Box<dyn Iterator<Item = std::io::Result<ListedEntry>> + 'a>> {
            panic!("lister exploded");
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let sink = MemoryReporter::new();
        let matcher = LiteralMatcher::new("x", MatchMode::Lines);
        let root = Task::new("/virtual", DEFAULT_MAX_PATH_LEN).unwrap();

        let err = WorkerPool::new(3)
            .unwrap()
            .run(root, &PanickingLister, &matcher, &sink)
            .unwrap_err();
        assert!(matches!(err, WalkError::WorkerPanicked { .. }));
        assert_eq!(sink.events()[0].kind, EventKind::Dir);
    }
}
