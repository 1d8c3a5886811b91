//! Colored phase of graph generation.
//!
//! Runs after the grey phase has finished, so the depth buckets are final.
//! They are captured once in a [`DepthSnapshot`] that the green, yellow, and
//! red passes read without locking; the passes run on their own threads and
//! serialise every graph access through one shared mutex.

use std::{
    sync::{Mutex, MutexGuard},
    thread,
};

use rand::rngs::SmallRng;
use tracing::{Dispatch, Span, debug, dispatcher, instrument};

use crate::graph::{
    DEFAULT_DEPTH, Graph, GraphDepth, GraphError, GraphView, RED_DEPTH_STEP, VertexId,
    YELLOW_DEPTH_STEP,
};

use super::{
    error::GeneratorError,
    rng::{RngFactory, check_probability, pick_vertex},
};

const GREEN_EDGE_PROBABILITY: f64 = 0.1;
const RED_EDGE_PROBABILITY: f64 = 1.0 / 3.0;

/// Immutable copy of the depth buckets taken at the end of the grey phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct DepthSnapshot {
    levels: Vec<Vec<VertexId>>,
}

impl DepthSnapshot {
    pub(super) fn capture(graph: &Graph) -> Result<Self, GraphError> {
        let levels = (DEFAULT_DEPTH..DEFAULT_DEPTH + graph.depth())
            .map(|depth| {
                graph
                    .depth_vertex_ids(depth)
                    .map(|bucket| bucket.iter().copied().collect())
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { levels })
    }

    /// Number of levels captured.
    pub(super) fn depth(&self) -> GraphDepth {
        self.levels.len()
    }

    /// Vertices at `depth`, or an empty slice beyond the deepest level.
    pub(super) fn level(&self, depth: GraphDepth) -> &[VertexId] {
        depth
            .checked_sub(DEFAULT_DEPTH)
            .and_then(|index| self.levels.get(index))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.levels.iter().flatten().copied()
    }
}

/// One of the three concurrent colored passes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum ColoredPass {
    Green,
    Yellow,
    Red,
}

impl ColoredPass {
    const ALL: [Self; 3] = [Self::Green, Self::Yellow, Self::Red];

    const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// Runs the pass and returns the number of edges it added.
    fn run(
        self,
        snapshot: &DepthSnapshot,
        graph: &Mutex<Graph>,
        mut rng: SmallRng,
    ) -> Result<usize, GeneratorError> {
        let added = match self {
            Self::Green => add_green_edges(snapshot, graph, &mut rng)?,
            Self::Yellow => add_yellow_edges(snapshot, graph, &mut rng)?,
            Self::Red => add_red_edges(snapshot, graph, &mut rng)?,
        };
        debug!(pass = self.name(), added, "colored pass completed");
        Ok(added)
    }
}

fn lock_graph(graph: &Mutex<Graph>) -> Result<MutexGuard<'_, Graph>, GeneratorError> {
    graph.lock().map_err(|_| GeneratorError::LockPoisoned {
        resource: "colored phase graph",
    })
}

/// Adds a self-loop to each vertex with probability
/// [`GREEN_EDGE_PROBABILITY`].
fn add_green_edges(
    snapshot: &DepthSnapshot,
    graph: &Mutex<Graph>,
    rng: &mut SmallRng,
) -> Result<usize, GeneratorError> {
    let mut added = 0;
    for vertex in snapshot.vertices() {
        if check_probability(rng, GREEN_EDGE_PROBABILITY) {
            lock_graph(graph)?.add_edge(vertex, vertex)?;
            added += 1;
        }
    }
    Ok(added)
}

/// Links vertices to an unconnected vertex one level deeper. The chance grows
/// linearly from `0` at depth 1 to `1` at the second-deepest level; graphs
/// with two levels or fewer get no yellow edges.
///
/// The connectivity check and the insertion share one critical section.
fn add_yellow_edges(
    snapshot: &DepthSnapshot,
    graph: &Mutex<Graph>,
    rng: &mut SmallRng,
) -> Result<usize, GeneratorError> {
    let max_depth = snapshot.depth();
    if max_depth <= YELLOW_DEPTH_STEP + DEFAULT_DEPTH {
        return Ok(0);
    }

    let mut added = 0;
    for depth in DEFAULT_DEPTH..max_depth {
        let probability = yellow_probability(depth, max_depth);
        let targets = snapshot.level(depth + YELLOW_DEPTH_STEP);
        for &from in snapshot.level(depth) {
            if !check_probability(rng, probability) {
                continue;
            }
            let mut graph = lock_graph(graph)?;
            let candidates = unconnected_targets(&graph, from, targets)?;
            if let Some(to) = pick_vertex(rng, &candidates) {
                graph.add_edge(from, to)?;
                added += 1;
            }
        }
    }
    Ok(added)
}

/// Links vertices to a random vertex two levels deeper with probability
/// [`RED_EDGE_PROBABILITY`].
fn add_red_edges(
    snapshot: &DepthSnapshot,
    graph: &Mutex<Graph>,
    rng: &mut SmallRng,
) -> Result<usize, GeneratorError> {
    let mut added = 0;
    for depth in DEFAULT_DEPTH..=snapshot.depth().saturating_sub(RED_DEPTH_STEP) {
        let targets = snapshot.level(depth + RED_DEPTH_STEP);
        for &from in snapshot.level(depth) {
            if !check_probability(rng, RED_EDGE_PROBABILITY) {
                continue;
            }
            if let Some(to) = pick_vertex(rng, targets) {
                lock_graph(graph)?.add_edge(from, to)?;
                added += 1;
            }
        }
    }
    Ok(added)
}

fn yellow_probability(depth: GraphDepth, max_depth: GraphDepth) -> f64 {
    let span = max_depth - YELLOW_DEPTH_STEP - DEFAULT_DEPTH;
    (depth - DEFAULT_DEPTH) as f64 / span as f64
}

fn unconnected_targets(
    graph: &Graph,
    from: VertexId,
    targets: &[VertexId],
) -> Result<Vec<VertexId>, GraphError> {
    let mut candidates = Vec::with_capacity(targets.len());
    for &to in targets {
        if !graph.are_connected(from, to)? {
            candidates.push(to);
        }
    }
    Ok(candidates)
}

/// Runs the three colored passes concurrently over `graph`.
///
/// # Errors
/// Returns the first [`GeneratorError`] reported by a pass, or
/// [`GeneratorError::SpawnFailed`]/[`GeneratorError::PassPanicked`] when a
/// pass thread could not run to completion.
#[instrument(name = "generator.colored_phase", skip_all, fields(depth = graph.depth()))]
pub(super) fn run_colored_phase(graph: Graph, rngs: &RngFactory) -> Result<Graph, GeneratorError> {
    let snapshot = DepthSnapshot::capture(&graph)?;
    let graph = Mutex::new(graph);
    let dispatch = dispatcher::get_default(Dispatch::clone);
    let span = Span::current();

    thread::scope(|scope| -> Result<(), GeneratorError> {
        let mut handles = Vec::with_capacity(ColoredPass::ALL.len());
        for pass in ColoredPass::ALL {
            let rng = rngs.stream();
            let (snapshot, graph, dispatch, span) = (&snapshot, &graph, &dispatch, &span);
            let handle = thread::Builder::new()
                .name(format!("graphgen-{}", pass.name()))
                .spawn_scoped(scope, move || {
                    dispatcher::with_default(dispatch, || {
                        span.in_scope(|| pass.run(snapshot, graph, rng))
                    })
                })
                .map_err(|source| GeneratorError::SpawnFailed {
                    pass: pass.name(),
                    source,
                })?;
            handles.push((pass, handle));
        }

        let mut first_error = None;
        for (pass, handle) in handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(GeneratorError::PassPanicked { pass: pass.name() }));
            if let Err(error) = outcome
                && first_error.is_none()
            {
                first_error = Some(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    })?;

    graph.into_inner().map_err(|_| GeneratorError::LockPoisoned {
        resource: "colored phase graph",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rstest::rstest;

    fn chain(levels: usize) -> Graph {
        let mut graph = Graph::new();
        let mut parent = graph.add_vertex();
        for _ in 1..levels {
            let child = graph.add_vertex();
            graph.add_edge(parent, child).expect("chain edge is grey");
            parent = child;
        }
        graph
    }

    #[rstest]
    fn snapshot_copies_every_level() {
        let snapshot = DepthSnapshot::capture(&chain(3)).expect("capture must succeed");
        assert_eq!(snapshot.depth(), 3);
        assert_eq!(snapshot.level(1), &[0]);
        assert_eq!(snapshot.level(3), &[2]);
        assert!(snapshot.level(0).is_empty());
        assert!(snapshot.level(4).is_empty());
        assert_eq!(snapshot.vertices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[rstest]
    #[case(1, 4, 0.0)]
    #[case(2, 4, 0.5)]
    #[case(3, 4, 1.0)]
    fn yellow_probability_interpolates_linearly(
        #[case] depth: GraphDepth,
        #[case] max_depth: GraphDepth,
        #[case] expected: f64,
    ) {
        assert!((yellow_probability(depth, max_depth) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case::single_level(1)]
    #[case::two_levels(2)]
    fn yellow_pass_is_a_no_op_for_shallow_graphs(#[case] levels: usize) {
        let graph = chain(levels);
        let snapshot = DepthSnapshot::capture(&graph).expect("capture must succeed");
        let shared = Mutex::new(graph);
        let added = ColoredPass::Yellow
            .run(&snapshot, &shared, SmallRng::seed_from_u64(1))
            .expect("pass must succeed");
        assert_eq!(added, 0);
    }

    #[rstest]
    fn red_pass_only_skips_one_level() {
        let graph = chain(4);
        let snapshot = DepthSnapshot::capture(&graph).expect("capture must succeed");
        let shared = Mutex::new(graph);
        let added = ColoredPass::Red
            .run(&snapshot, &shared, SmallRng::seed_from_u64(9))
            .expect("pass must succeed");
        let graph = shared.into_inner().expect("lock is healthy");
        assert_eq!(graph.edges_count(), 3 + added);
        for edge in graph.edges().skip(3) {
            let from = graph.vertex_depth(edge.from_vertex_id()).expect("known");
            let to = graph.vertex_depth(edge.to_vertex_id()).expect("known");
            assert_eq!(to - from, RED_DEPTH_STEP);
        }
    }

    #[rstest]
    fn colored_phase_leaves_depths_untouched() {
        let graph = chain(5);
        let rngs = RngFactory::new(Some(21));
        let colored = run_colored_phase(graph, &rngs).expect("phase must succeed");
        assert_eq!(colored.depth(), 5);
        for vertex in 0..5 {
            assert_eq!(colored.vertex_depth(vertex), Ok(vertex + 1));
        }
        assert!(colored.edges_count() >= 4);
    }
}
