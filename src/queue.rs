//! Two-lock FIFO of pending directory tasks.
//!
//! The queue is a singly linked list that always starts with a sentinel node.
//! The head lock serializes dequeuers and the tail lock serializes enqueuers,
//! so one producer and one consumer can run at the same time. The sentinel
//! is never handed out: a successful dequeue frees the old sentinel and the
//! node it just emptied becomes the new one.
//!
//! The only field shared between the two sides is the `next` link of the node
//! the tail points at, which is an [`AtomicPtr`] written with `Release` and
//! read with `Acquire`.

use crate::task::Task;
use parking_lot::Mutex;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};

struct Node {
    task: Option<Task>,
    next: AtomicPtr<Node>,
}

impl Node {
    fn alloc(task: Option<Task>) -> *mut Node {
        Box::into_raw(Box::new(Node {
            task,
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

pub struct TaskQueue {
    head: Mutex<*mut Node>,
    tail: Mutex<*mut Node>,
    /// Never smaller than the number of published, undequeued tasks.
    len: AtomicUsize,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
}

// SAFETY: the raw node pointers are only dereferenced while holding the lock
// that owns them (head or tail), and nodes move between threads only through
// the queue. `Task` itself is `Send`.
unsafe impl Send for TaskQueue {}
unsafe impl Sync for TaskQueue {}

impl TaskQueue {
    pub fn new() -> Self {
        let sentinel = Node::alloc(None);
        Self {
            head: Mutex::new(sentinel),
            tail: Mutex::new(sentinel),
            len: AtomicUsize::new(0),
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
        }
    }

    /// Appends `task` at the tail.
    pub fn enqueue(&self, task: Task) {
        let node = Node::alloc(Some(task));
        let mut tail = self.tail.lock();
        self.len.fetch_add(1, Ordering::SeqCst);
        // SAFETY: `*tail` is live. A node is freed only after the head has
        // moved past it, which requires its `next` to be set, and only the
        // holder of the tail lock sets the tail node's `next`.
        unsafe { (**tail).next.store(node, Ordering::Release) };
        *tail = node;
        drop(tail);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes the task at the head, or returns `None` if the queue is empty.
    pub fn dequeue(&self) -> Option<Task> {
        let mut head = self.head.lock();
        let sentinel = *head;
        // SAFETY: the head always points at the live sentinel.
        let next = unsafe { (*sentinel).next.load(Ordering::Acquire) };
        if next.is_null() {
            return None;
        }
        // SAFETY: `next` was fully initialised before being published with
        // `Release`. Its `task` field is only touched by the head lock holder;
        // enqueuers only ever touch its `next` field.
        let task = unsafe { (*next).task.take() };
        *head = next;
        self.len.fetch_sub(1, Ordering::SeqCst);
        drop(head);

        // SAFETY: the old sentinel is no longer reachable. The head moved to
        // `next`, and the tail moved on before `next` became visible here.
        drop(unsafe { Box::from_raw(sentinel) });
        self.dequeued.fetch_add(1, Ordering::Relaxed);
        task
    }

    /// Approximate number of queued tasks.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of tasks ever enqueued.
    pub fn enqueued_total(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Total number of tasks ever dequeued.
    pub fn dequeued_total(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        let mut cur = *self.head.get_mut();
        while !cur.is_null() {
            // SAFETY: `&mut self` means no other thread holds a node; every
            // node from the sentinel onwards is owned by the queue.
            let node = unsafe { Box::from_raw(cur) };
            cur = node.next.load(Ordering::Relaxed);
        }
    }
}
