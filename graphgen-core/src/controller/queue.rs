//! Blocking job queue and completion latch shared by the worker pool.

use std::{
    collections::VecDeque,
    sync::{
        Condvar, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

/// One unit of work: builds a single graph and reports it.
pub(super) type Job<'job> = Box<dyn FnOnce() + Send + 'job>;

/// FIFO of pending jobs. Idle workers block on a condition variable instead
/// of polling.
///
/// The queue never runs caller code while its lock is held, so a poisoned
/// lock still guards a consistent `VecDeque` and is recovered.
pub(super) struct JobQueue<'job> {
    jobs: Mutex<VecDeque<Job<'job>>>,
    available: Condvar,
}

impl<'job> JobQueue<'job> {
    pub(super) fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    pub(super) fn push(&self, job: Job<'job>) {
        self.lock().push_back(job);
        self.available.notify_one();
    }

    /// Blocks until a job is available or `terminate` is raised. Pending jobs
    /// are handed out before termination is honoured.
    pub(super) fn pop(&self, terminate: &AtomicBool) -> Option<Job<'job>> {
        let mut jobs = self.lock();
        loop {
            if let Some(job) = jobs.pop_front() {
                return Some(job);
            }
            if terminate.load(Ordering::Acquire) {
                return None;
            }
            jobs = self
                .available
                .wait(jobs)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wakes every blocked worker so it can re-check its terminate flag.
    ///
    /// Taking the lock first orders the wake-up after any worker that has
    /// checked its flag but not yet started waiting.
    pub(super) fn wake_all(&self) {
        drop(self.lock());
        self.available.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job<'job>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts outstanding jobs; [`CompletionLatch::wait`] blocks until all of
/// them have reported back.
pub(super) struct CompletionLatch {
    remaining: Mutex<usize>,
    finished: Condvar,
}

impl CompletionLatch {
    pub(super) fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            finished: Condvar::new(),
        }
    }

    pub(super) fn count_down(&self) {
        let mut remaining = self
            .remaining
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.finished.notify_all();
        }
    }

    pub(super) fn wait(&self) {
        let remaining = self
            .remaining
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(
            self.finished
                .wait_while(remaining, |remaining| *remaining > 0)
                .unwrap_or_else(PoisonError::into_inner),
        );
    }
}
