//! Runs many independent graph generations on a bounded worker pool.
//!
//! Every job builds one graph with its own [`GraphGenerator`]. Jobs are
//! claimed from a blocking queue by scoped worker threads; the caller blocks
//! on a completion latch, then stops and joins every worker. The start and
//! finish callbacks share one mutex, so caller code never runs concurrently
//! even though generation does.

mod error;
mod queue;
mod worker;

use std::{
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, MutexGuard, PoisonError},
    thread,
};

use tracing::{debug, error, info, instrument};

use crate::{
    generator::{GeneratorParams, GraphGenerator},
    graph::{Graph, GraphView},
};

pub use self::{
    error::{ControllerError, ControllerErrorCode},
    worker::WorkerState,
};

use self::{
    queue::{CompletionLatch, JobQueue},
    worker::Worker,
};

/// Schedules `graphs_count` generation jobs across `threads_count` workers.
///
/// # Examples
/// ```
/// use graphgen_core::{GenerationController, GeneratorParams, GraphView};
///
/// let controller = GenerationController::new(2, 3, GeneratorParams::new(3, 2));
/// let mut finished = Vec::new();
/// controller
///     .generate(|_| {}, |index, graph| finished.push((index, graph.vertices_count())))
///     .expect("generation must succeed");
/// finished.sort_unstable();
/// assert_eq!(finished.len(), 3);
/// assert_eq!(finished[0].0, 0);
/// ```
#[derive(Clone, Debug)]
pub struct GenerationController {
    threads_count: usize,
    graphs_count: usize,
    params: GeneratorParams,
}

struct Callbacks<S, F> {
    on_started: S,
    on_finished: F,
}

impl GenerationController {
    /// Creates a controller. `threads_count` is clamped to
    /// `[1, available_parallelism]`.
    #[must_use]
    pub fn new(threads_count: usize, graphs_count: usize, params: GeneratorParams) -> Self {
        let available = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            threads_count: threads_count.clamp(1, available),
            graphs_count,
            params,
        }
    }

    /// Number of worker threads used by [`GenerationController::generate`].
    #[must_use]
    #[rustfmt::skip]
    pub const fn threads_count(&self) -> usize { self.threads_count }

    /// Number of graphs produced per run.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graphs_count(&self) -> usize { self.graphs_count }

    /// Parameters shared by every job. Seeded runs derive a distinct seed per
    /// job index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn params(&self) -> &GeneratorParams { &self.params }

    /// Generates every graph and blocks until all jobs have finished.
    ///
    /// `on_started(index)` runs when a job begins and `on_finished(index,
    /// graph)` exactly once per successful job. Callback invocations never
    /// overlap; their order across jobs is unspecified.
    ///
    /// # Errors
    /// Returns the first failing job's error after every job has run, or a
    /// [`ControllerError`] when the worker pool cannot be started or joined.
    #[instrument(
        name = "controller.generate",
        skip_all,
        fields(graphs_count = self.graphs_count, threads_count = self.threads_count),
    )]
    pub fn generate<S, F>(&self, on_started: S, on_finished: F) -> Result<(), ControllerError>
    where
        S: FnMut(usize) + Send,
        F: FnMut(usize, Graph) + Send,
    {
        if self.graphs_count == 0 {
            debug!("no graphs requested");
            return Ok(());
        }

        let callbacks = Mutex::new(Callbacks {
            on_started,
            on_finished,
        });
        let latch = CompletionLatch::new(self.graphs_count);
        let failure = Mutex::new(None);

        // Queued jobs borrow `failure`; the queue must be gone before it is read.
        {
            let queue = JobQueue::new();
            run_pool(self.threads_count, &queue, &latch, |queue| {
                for index in 0..self.graphs_count {
                    let (params, callbacks, latch, failure) =
                        (&self.params, &callbacks, &latch, &failure);
                    queue.push(Box::new(move || {
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                            run_job(index, params, callbacks)
                        }))
                        .unwrap_or_else(|_| Err(ControllerError::JobPanicked { index }));
                        if let Err(error) = outcome {
                            record_failure(failure, error);
                        }
                        latch.count_down();
                    }));
                }
            })?;
        }

        let failure = failure.into_inner().unwrap_or_else(PoisonError::into_inner);
        failure.map_or(Ok(()), Err)
    }
}

/// Starts `threads_count` workers over `queue`, lets `enqueue` fill it, waits
/// for `latch`, then stops and joins every worker.
fn run_pool<'job>(
    threads_count: usize,
    queue: &JobQueue<'job>,
    latch: &CompletionLatch,
    enqueue: impl FnOnce(&JobQueue<'job>),
) -> Result<(), ControllerError> {
    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(threads_count);
        for index in 0..threads_count {
            let mut worker = Worker::new(index, queue);
            worker.start(scope)?;
            workers.push(worker);
        }

        enqueue(queue);

        latch.wait();
        let mut stopped = Ok(());
        for worker in &mut workers {
            let outcome = worker.stop();
            if stopped.is_ok() {
                stopped = outcome;
            }
        }
        stopped
    })
}

fn run_job<S, F>(
    index: usize,
    params: &GeneratorParams,
    callbacks: &Mutex<Callbacks<S, F>>,
) -> Result<(), ControllerError>
where
    S: FnMut(usize),
    F: FnMut(usize, Graph),
{
    (lock_callbacks(callbacks)?.on_started)(index);
    info!(index, "generation started");

    let graph = GraphGenerator::new(params.for_job(index))
        .generate()
        .map_err(|source| ControllerError::Generation { index, source })?;
    info!(
        index,
        vertices = graph.vertices_count(),
        edges = graph.edges_count(),
        "generation finished"
    );
    #[cfg(feature = "metrics")]
    metrics::counter!("graphgen_graphs_generated").increment(1);

    (lock_callbacks(callbacks)?.on_finished)(index, graph);
    Ok(())
}

fn lock_callbacks<S, F>(
    callbacks: &Mutex<Callbacks<S, F>>,
) -> Result<MutexGuard<'_, Callbacks<S, F>>, ControllerError> {
    callbacks.lock().map_err(|_| ControllerError::LockPoisoned {
        resource: "controller callbacks",
    })
}

fn record_failure(slot: &Mutex<Option<ControllerError>>, failure: ControllerError) {
    error!(code = %failure.code(), error = %failure, "generation job failed");
    #[cfg(feature = "metrics")]
    metrics::counter!("graphgen_generation_failures").increment(1);

    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        *slot = Some(failure);
    }
}
