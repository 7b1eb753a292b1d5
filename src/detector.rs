//! Decentralized termination detection for the worker pool.
//!
//! Every worker owns one [`WorkerStatus`] slot. A worker only marks itself
//! [`WorkerStatus::Idle`] after a failed dequeue, and is marked
//! [`WorkerStatus::Active`] again before its next dequeue attempt, so it is
//! always active while it holds a task. New tasks are only produced while
//! expanding a dequeued task, so a moment where every slot reads idle and the
//! queue is empty is stable: nobody can produce more work.
//!
//! Instead of polling, an idle worker blocks on a condition variable. It is
//! woken when a task is enqueued, when the pool is found quiescent, or when
//! the walk is cancelled. The queue length is re-read under the status lock
//! before blocking; together with [`TerminationDetector::notify_work`] taking
//! the same lock, this rules out lost wake-ups.

use crate::queue::TaskQueue;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Active,
    Idle,
}

/// What an idle worker should do after [`TerminationDetector::wait_for_work`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The queue may hold work; the worker is active again and should retry.
    Retry,
    /// Every worker is idle and the queue is empty.
    Quiescent,
    /// The walk was cancelled.
    Cancelled,
}

#[derive(Debug)]
struct State {
    status: Vec<WorkerStatus>,
    quiescent: bool,
    cancelled: bool,
}

impl State {
    fn all_idle(&self) -> bool {
        self.status.iter().all(|s| *s == WorkerStatus::Idle)
    }
}

#[derive(Debug)]
pub struct TerminationDetector {
    state: Mutex<State>,
    wake: Condvar,
}

impl TerminationDetector {
    /// Creates a detector for `workers` workers, all initially active.
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(State {
                status: vec![WorkerStatus::Active; workers],
                quiescent: false,
                cancelled: false,
            }),
            wake: Condvar::new(),
        }
    }

    /// Snapshot check made at the top of every worker iteration: has the
    /// pool reached quiescence, or been cancelled?
    pub fn should_stop(&self) -> bool {
        let state = self.state.lock();
        state.quiescent || state.cancelled
    }

    pub fn is_quiescent(&self) -> bool {
        self.state.lock().quiescent
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    pub fn status(&self, worker: usize) -> WorkerStatus {
        self.state.lock().status[worker]
    }

    pub fn mark_active(&self, worker: usize) {
        self.state.lock().status[worker] = WorkerStatus::Active;
    }

    /// Called after every enqueue so blocked workers can retry.
    pub fn notify_work(&self) {
        let _state = self.state.lock();
        self.wake.notify_one();
    }

    /// Stops the walk. Every worker observes this on its next check.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if !state.cancelled {
            debug!("walk cancelled");
        }
        state.cancelled = true;
        self.wake.notify_all();
    }

    /// Called by `worker` after a failed dequeue. Marks it idle and blocks
    /// until there may be work again, the pool is quiescent, or the walk is
    /// cancelled. On [`Wake::Retry`] the worker has already been marked
    /// active.
    pub fn wait_for_work(&self, worker: usize, queue: &TaskQueue) -> Wake {
        let mut state = self.state.lock();
        state.status[worker] = WorkerStatus::Idle;

        loop {
            if state.cancelled {
                return Wake::Cancelled;
            }
            if state.quiescent {
                return Wake::Quiescent;
            }
            if !queue.is_empty() {
                state.status[worker] = WorkerStatus::Active;
                return Wake::Retry;
            }
            if state.all_idle() {
                debug!(worker, "pool quiescent");
                state.quiescent = true;
                self.wake.notify_all();
                return Wake::Quiescent;
            }
            trace!(worker, "waiting for work");
            self.wake.wait(&mut state);
        }
    }
}
