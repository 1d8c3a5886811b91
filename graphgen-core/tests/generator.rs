//! Properties and scenarios for whole-graph generation.

use std::collections::BTreeSet;

use graphgen_core::{
    DEFAULT_DEPTH, Edge, EdgeColor, GeneratorParams, Graph, GraphGenerator, GraphView,
};
use graphgen_test_support::pbt;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use rstest::rstest;

fn generate(depth: usize, new_vertices_count: usize, seed: u64) -> Graph {
    GraphGenerator::new(GeneratorParams::new(depth, new_vertices_count).with_rng_seed(seed))
        .generate()
        .expect("generation must succeed")
}

/// Recomputes the color of `edge` from the finished graph: a grey edge is the
/// first edge ever attached to its target.
fn rederive_color(graph: &Graph, edge: &Edge) -> Option<EdgeColor> {
    let (from, to) = (edge.from_vertex_id(), edge.to_vertex_id());
    if from == to {
        return Some(EdgeColor::Green);
    }
    let first_into_target = graph.connected_edge_ids(to).ok()?.first().copied();
    if first_into_target == Some(edge.id()) {
        return Some(EdgeColor::Grey);
    }
    let step = graph
        .vertex_depth(to)
        .ok()?
        .checked_sub(graph.vertex_depth(from).ok()?);
    match step {
        Some(1) => Some(EdgeColor::Yellow),
        Some(2) => Some(EdgeColor::Red),
        _ => None,
    }
}

fn check_invariants(graph: &Graph, max_depth: usize) -> Result<(), TestCaseError> {
    let vertex_ids: Vec<_> = graph.vertices().map(|vertex| vertex.id()).collect();
    prop_assert_eq!(vertex_ids, (0..graph.vertices_count()).collect::<Vec<_>>());
    let edge_ids: Vec<_> = graph.edges().map(Edge::id).collect();
    prop_assert_eq!(edge_ids, (0..graph.edges_count()).collect::<Vec<_>>());

    let mut grey_parents = vec![Vec::new(); graph.vertices_count()];
    for edge in graph.edges() {
        prop_assert_eq!(rederive_color(graph, edge), Some(edge.color()));
        if edge.color() == EdgeColor::Grey {
            grey_parents[edge.to_vertex_id()].push(edge.from_vertex_id());
        }
    }
    for (vertex, parents) in grey_parents.iter().enumerate() {
        let depth = graph.vertex_depth(vertex).expect("known vertex");
        prop_assert!(depth <= max_depth);
        if vertex == 0 {
            prop_assert!(parents.is_empty());
            prop_assert_eq!(depth, DEFAULT_DEPTH);
            continue;
        }
        prop_assert_eq!(parents.len(), 1);
        let parent_depth = graph.vertex_depth(parents[0]).expect("known parent");
        prop_assert_eq!(depth, parent_depth + 1);
    }

    let depths: BTreeSet<_> = distinct_depths(graph);
    prop_assert_eq!(graph.depth(), depths.len());

    for a in 0..graph.vertices_count() {
        let has_loop = graph
            .connected_edge_ids(a)
            .expect("known vertex")
            .iter()
            .filter_map(|id| graph.edge(*id))
            .any(|edge| edge.color() == EdgeColor::Green);
        prop_assert_eq!(graph.are_connected(a, a), Ok(has_loop));
        for b in (a + 1)..graph.vertices_count() {
            prop_assert_eq!(graph.are_connected(a, b), graph.are_connected(b, a));
        }
    }
    Ok(())
}

fn distinct_depths(graph: &Graph) -> BTreeSet<usize> {
    graph
        .vertices()
        .map(|vertex| graph.vertex_depth(vertex.id()).expect("known vertex"))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(pbt::cases(32)))]

    #[test]
    fn generated_graphs_uphold_depth_and_color_invariants(
        depth in 0_usize..=5,
        new_vertices_count in 0_usize..=3,
        seed in any::<u64>(),
    ) {
        let graph = generate(depth, new_vertices_count, seed);
        check_invariants(&graph, depth)?;
    }
}

#[rstest]
fn zero_depth_graph_is_empty() {
    let graph = generate(0, 3, 7);
    assert_eq!(graph.vertices_count(), 0);
    assert_eq!(graph.edges_count(), 0);
}

#[rstest]
#[case::depth_one(1, 3)]
#[case::no_branching(3, 0)]
fn root_only_graphs_have_only_self_loops(#[case] depth: usize, #[case] new_vertices_count: usize) {
    for seed in 0..32 {
        let graph = generate(depth, new_vertices_count, seed);
        assert_eq!(graph.vertices_count(), 1);
        let distribution = graph.color_distribution();
        assert_eq!(distribution.count(EdgeColor::Grey), 0);
        assert_eq!(distribution.count(EdgeColor::Yellow), 0);
        assert_eq!(distribution.count(EdgeColor::Red), 0);
        assert!(distribution.count(EdgeColor::Green) <= 1);
    }
}

#[rstest]
fn unseeded_generation_succeeds() {
    let graph = GraphGenerator::new(GeneratorParams::new(4, 2))
        .generate()
        .expect("generation must succeed");
    assert!(graph.vertices_count() >= 3);
    assert!((2..=4).contains(&graph.depth()));
}
