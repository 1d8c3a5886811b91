//! Worker threads that drain the job queue.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, Scope, ScopedJoinHandle},
};

use tracing::{Dispatch, Span, debug, dispatcher, warn};

use super::{error::ControllerError, queue::JobQueue};

/// Lifecycle of a worker thread.
///
/// `Idle -> Working` on start, `Working -> ShouldTerminate` when a stop is
/// requested, and back to `Idle` once the thread has been joined.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WorkerState {
    /// No thread is running; the worker may be started.
    Idle,
    /// The thread is claiming and running jobs.
    Working,
    /// A stop was requested and the thread is being joined.
    ShouldTerminate,
}

impl WorkerState {
    /// Returns the snake-case name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::ShouldTerminate => "should_terminate",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one worker thread in a scoped pool.
pub(super) struct Worker<'scope, 'job> {
    index: usize,
    state: WorkerState,
    queue: &'scope JobQueue<'job>,
    terminate: Arc<AtomicBool>,
    handle: Option<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope, 'job> Worker<'scope, 'job> {
    pub(super) fn new(index: usize, queue: &'scope JobQueue<'job>) -> Self {
        Self {
            index,
            state: WorkerState::Idle,
            queue,
            terminate: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub(super) const fn state(&self) -> WorkerState {
        self.state
    }

    /// Spawns the worker thread inside `scope`.
    ///
    /// The thread inherits the caller's tracing dispatcher and current span.
    pub(super) fn start(&mut self, scope: &'scope Scope<'scope, '_>) -> Result<(), ControllerError> {
        if self.state != WorkerState::Idle {
            return Err(self.invalid_transition("start"));
        }

        self.terminate.store(false, Ordering::Release);
        let index = self.index;
        let queue = self.queue;
        let terminate = Arc::clone(&self.terminate);
        let dispatch = dispatcher::get_default(Dispatch::clone);
        let span = Span::current();
        let handle = thread::Builder::new()
            .name(format!("graphgen-worker-{index}"))
            .spawn_scoped(scope, move || {
                dispatcher::with_default(&dispatch, || {
                    span.in_scope(|| run_worker(index, queue, &terminate));
                });
            })
            .map_err(|source| ControllerError::SpawnFailed {
                worker: index,
                source,
            })?;

        self.handle = Some(handle);
        self.state = WorkerState::Working;
        Ok(())
    }

    /// Asks the worker to finish and joins its thread. A job already running
    /// is allowed to complete.
    pub(super) fn stop(&mut self) -> Result<(), ControllerError> {
        if self.state != WorkerState::Working {
            return Err(self.invalid_transition("stop"));
        }

        self.state = WorkerState::ShouldTerminate;
        self.terminate.store(true, Ordering::Release);
        self.queue.wake_all();
        let joined = self.handle.take().map_or(Ok(()), |handle| {
            handle.join().map_err(|_| ControllerError::WorkerPanicked {
                worker: self.index,
            })
        });
        self.state = WorkerState::Idle;
        joined
    }

    const fn invalid_transition(&self, action: &'static str) -> ControllerError {
        ControllerError::InvalidWorkerTransition {
            worker: self.index,
            state: self.state,
            action,
        }
    }
}

impl Drop for Worker<'_, '_> {
    fn drop(&mut self) {
        if self.state == WorkerState::Working
            && let Err(error) = self.stop()
        {
            warn!(
                worker = self.index,
                code = %error.code(),
                %error,
                "worker failed while stopping on drop"
            );
        }
    }
}

fn run_worker(index: usize, queue: &JobQueue<'_>, terminate: &AtomicBool) {
    debug!(worker = index, "worker started");
    let mut completed = 0_usize;
    while let Some(job) = queue.pop(terminate) {
        job();
        completed += 1;
    }
    debug!(worker = index, completed, "worker terminated");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    use rstest::rstest;

    use crate::{ControllerErrorCode, controller::queue::CompletionLatch};

    #[rstest]
    fn worker_runs_queued_jobs_until_stopped() {
        let runs = AtomicUsize::new(0);
        let latch = CompletionLatch::new(3);
        let queue = JobQueue::new();
        thread::scope(|scope| {
            let mut worker = Worker::new(0, &queue);
            worker.start(scope).expect("idle worker must start");
            assert_eq!(worker.state(), WorkerState::Working);
            for _ in 0..3 {
                let (runs, latch) = (&runs, &latch);
                queue.push(Box::new(move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    latch.count_down();
                }));
            }
            latch.wait();
            worker.stop().expect("working worker must stop");
            assert_eq!(worker.state(), WorkerState::Idle);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    fn starting_twice_is_rejected() {
        let queue = JobQueue::new();
        thread::scope(|scope| {
            let mut worker = Worker::new(4, &queue);
            worker.start(scope).expect("idle worker must start");
            let error = worker.start(scope).expect_err("second start must fail");
            assert_eq!(error.code(), ControllerErrorCode::InvalidWorkerTransition);
            assert_eq!(error.to_string(), "worker 4 cannot start while working");
            worker.stop().expect("working worker must stop");
        });
    }

    #[rstest]
    fn stopping_an_idle_worker_is_rejected() {
        let queue = JobQueue::new();
        thread::scope(|_| {
            let mut worker = Worker::new(1, &queue);
            let error = worker.stop().expect_err("idle worker cannot stop");
            assert!(matches!(
                error,
                ControllerError::InvalidWorkerTransition {
                    worker: 1,
                    state: WorkerState::Idle,
                    action: "stop",
                }
            ));
        });
    }

    #[rstest]
    fn stopped_worker_can_be_restarted() {
        let queue = JobQueue::new();
        thread::scope(|scope| {
            let mut worker = Worker::new(2, &queue);
            worker.start(scope).expect("first start");
            worker.stop().expect("first stop");
            worker.start(scope).expect("restart from idle");
            worker.stop().expect("second stop");
        });
    }

    #[rstest]
    fn dropping_a_working_worker_stops_it() {
        let queue = JobQueue::new();
        thread::scope(|scope| {
            let mut worker = Worker::new(3, &queue);
            worker.start(scope).expect("idle worker must start");
            drop(worker);
        });
    }
}
