//! Read-only capability view over a finished graph.
//!
//! Rendering code is written against [`GraphView`] rather than the concrete
//! [`crate::Graph`] so it can never mutate what it prints.

use std::collections::BTreeSet;

use super::{ColorDistribution, Edge, EdgeId, GraphDepth, GraphError, Vertex, VertexId};

/// Read access to vertices, edges, adjacency, and depth buckets.
///
/// Traversals are in insertion order and repeatable for a given instance.
/// Adjacency sets and depth buckets iterate in ascending id order.
pub trait GraphView {
    /// Number of populated depth buckets.
    fn depth(&self) -> GraphDepth;

    /// Number of vertices created so far.
    fn vertices_count(&self) -> usize;

    /// Number of edges created so far.
    fn edges_count(&self) -> usize;

    /// Returns the depth of `id`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] when `id` was never created.
    fn vertex_depth(&self, id: VertexId) -> Result<GraphDepth, GraphError>;

    /// Returns the ids of every edge touching `id`. A self-loop is listed once.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] when `id` was never created.
    fn connected_edge_ids(&self, id: VertexId) -> Result<&BTreeSet<EdgeId>, GraphError>;

    /// Returns the vertices currently placed at `depth`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownDepth`] when no vertex was ever placed at
    /// `depth`.
    fn depth_vertex_ids(&self, depth: GraphDepth) -> Result<&BTreeSet<VertexId>, GraphError>;

    /// Returns the edge with identifier `id`, if it exists.
    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    /// Iterates all vertices in creation order.
    fn vertices(&self) -> impl Iterator<Item = &Vertex>;

    /// Iterates all edges in creation order.
    fn edges(&self) -> impl Iterator<Item = &Edge>;

    /// Calls `handler` for every vertex in creation order.
    fn for_each_vertex<F: FnMut(&Vertex)>(&self, handler: F) {
        self.vertices().for_each(handler);
    }

    /// Calls `handler` for every edge in creation order.
    fn for_each_edge<F: FnMut(&Edge)>(&self, handler: F) {
        self.edges().for_each(handler);
    }

    /// Counts edges per color.
    ///
    /// # Examples
    /// ```
    /// use graphgen_core::{EdgeColor, Graph, GraphView};
    ///
    /// let mut graph = Graph::new();
    /// let root = graph.add_vertex();
    /// let child = graph.add_vertex();
    /// graph.add_edge(root, child).expect("tree edge");
    /// graph.add_edge(child, child).expect("self-loop");
    /// let distribution = graph.color_distribution();
    /// assert_eq!(distribution.count(EdgeColor::Grey), 1);
    /// assert_eq!(distribution.count(EdgeColor::Green), 1);
    /// assert_eq!(distribution.total(), 2);
    /// ```
    fn color_distribution(&self) -> ColorDistribution {
        let mut distribution = ColorDistribution::default();
        self.for_each_edge(|edge| distribution.record(edge.color()));
        distribution
    }
}
