//! Grey (tree) phase of graph generation.
//!
//! The root is created first, then `new_vertices_count` branch tasks extend
//! it in parallel on a dedicated Rayon pool. Each successful branch spawns
//! `new_vertices_count` further tasks rooted at the new child. Branching
//! decisions are independent; every graph mutation goes through one mutex.

use std::{
    num::NonZeroUsize,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

use rayon::{Scope, ThreadPoolBuilder};
use tracing::{Dispatch, Span, debug, dispatcher, instrument, trace};

use crate::graph::{DEFAULT_DEPTH, Graph, GraphDepth, VertexId};

use super::{
    error::GeneratorError,
    params::GeneratorParams,
    rng::{RngFactory, check_probability},
};

/// Builds the tree skeleton of a graph.
///
/// # Errors
/// Returns [`GeneratorError`] when the pool cannot be built, a lock is
/// poisoned, or the graph rejects a tree edge.
#[instrument(
    name = "generator.grey_phase",
    skip_all,
    fields(depth = params.depth(), new_vertices_count = params.new_vertices_count()),
)]
pub(super) fn run_grey_phase(
    params: &GeneratorParams,
    rngs: &RngFactory,
) -> Result<Graph, GeneratorError> {
    let mut graph = Graph::new();
    let root = graph.add_vertex();

    let branches = params.new_vertices_count();
    if branches == 0 || params.depth() <= DEFAULT_DEPTH {
        debug!(vertices = 1, "no branching possible, keeping the root only");
        return Ok(graph);
    }

    let threads = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(branches);
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("graphgen-grey-{index}"))
        .build()
        .map_err(|error| GeneratorError::ThreadPool {
            message: error.to_string(),
        })?;

    let builder = BranchBuilder {
        params,
        rngs,
        graph: Mutex::new(graph),
        grown: AtomicUsize::new(0),
        aborted: AtomicBool::new(false),
        failure: Mutex::new(None),
        dispatch: dispatcher::get_default(Dispatch::clone),
        span: Span::current(),
    };
    pool.scope(|scope| {
        for _ in 0..branches {
            builder.spawn_branch(scope, root, DEFAULT_DEPTH);
        }
    });

    builder.finish(threads)
}

struct BranchBuilder<'a> {
    params: &'a GeneratorParams,
    rngs: &'a RngFactory,
    graph: Mutex<Graph>,
    grown: AtomicUsize,
    aborted: AtomicBool,
    failure: Mutex<Option<GeneratorError>>,
    dispatch: Dispatch,
    span: Span,
}

impl<'a> BranchBuilder<'a> {
    /// Queues a branch task. Pool threads run it under the caller's
    /// dispatcher and inside the grey phase span.
    fn spawn_branch<'scope>(&'scope self, scope: &Scope<'scope>, from: VertexId, depth: GraphDepth)
    where
        'a: 'scope,
    {
        scope.spawn(move |scope| {
            dispatcher::with_default(&self.dispatch, || {
                self.span.in_scope(|| self.grow(scope, from, depth));
            });
        });
    }

    /// Attempts to extend the tree below `from`, which sits at `depth`.
    fn grow<'scope>(&'scope self, scope: &Scope<'scope>, from: VertexId, depth: GraphDepth)
    where
        'a: 'scope,
    {
        if depth >= self.params.depth() || self.aborted.load(Ordering::Acquire) {
            return;
        }

        let mut rng = self.rngs.stream();
        if !check_probability(&mut rng, self.branch_probability(depth)) {
            return;
        }

        let child = match self.attach_child(from) {
            Ok(child) => child,
            Err(error) => {
                self.abort(error);
                return;
            }
        };
        self.grown.fetch_add(1, Ordering::Relaxed);
        trace!(from, child, depth = depth + 1, "grey edge added");

        for _ in 0..self.params.new_vertices_count() {
            self.spawn_branch(scope, child, depth + 1);
        }
    }

    /// Linear decay from `1.0` at the root level to `0.0` at the maximum
    /// depth. Only called with `depth < max`, and `max >= 2` there.
    fn branch_probability(&self, depth: GraphDepth) -> f64 {
        let max = self.params.depth();
        (max - depth) as f64 / (max - DEFAULT_DEPTH) as f64
    }

    fn attach_child(&self, from: VertexId) -> Result<VertexId, GeneratorError> {
        let mut graph = self
            .graph
            .lock()
            .map_err(|_| GeneratorError::LockPoisoned {
                resource: "grey phase graph",
            })?;
        let child = graph.add_vertex();
        graph.add_edge(from, child)?;
        Ok(child)
    }

    fn abort(&self, error: GeneratorError) {
        self.aborted.store(true, Ordering::Release);
        if let Ok(mut slot) = self.failure.lock()
            && slot.is_none()
        {
            *slot = Some(error);
        }
    }

    fn finish(self, threads: usize) -> Result<Graph, GeneratorError> {
        let failure = self
            .failure
            .into_inner()
            .map_err(|_| GeneratorError::LockPoisoned {
                resource: "grey phase failure slot",
            })?;
        if let Some(error) = failure {
            return Err(error);
        }

        let graph = self
            .graph
            .into_inner()
            .map_err(|_| GeneratorError::LockPoisoned {
                resource: "grey phase graph",
            })?;
        debug!(
            threads,
            grey_edges = self.grown.into_inner(),
            "grey phase completed"
        );
        Ok(graph)
    }
}
