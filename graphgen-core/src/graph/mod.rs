//! Layered directed graph with colored edges.
//!
//! A [`Graph`] owns its vertices, edges, adjacency sets, and depth buckets.
//! Edge colors are derived from the graph state at insertion time, and grey
//! (tree) edges are the only mutation that moves a vertex out of the default
//! depth bucket. Once the generator hands a graph over it is only read through
//! [`GraphView`].

mod error;
mod types;
mod view;

use std::collections::{BTreeMap, BTreeSet};

pub use self::{
    error::{GraphError, GraphErrorCode},
    types::{ColorDistribution, DEFAULT_DEPTH, Edge, EdgeColor, EdgeId, GraphDepth, Vertex, VertexId},
    view::GraphView,
};

/// Depth difference of a yellow edge.
pub(crate) const YELLOW_DEPTH_STEP: GraphDepth = 1;
/// Depth difference of a red edge.
pub(crate) const RED_DEPTH_STEP: GraphDepth = 2;

/// Layered directed graph built by [`crate::GraphGenerator`].
///
/// # Examples
/// ```
/// use graphgen_core::{EdgeColor, Graph, GraphView};
///
/// let mut graph = Graph::new();
/// let root = graph.add_vertex();
/// let child = graph.add_vertex();
/// let edge = graph.add_edge(root, child).expect("first edge into child is grey");
/// assert_eq!(graph.edge(edge).map(|e| e.color()), Some(EdgeColor::Grey));
/// assert_eq!(graph.vertex_depth(child), Ok(2));
/// assert_eq!(graph.depth(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    adjacency: Vec<BTreeSet<EdgeId>>,
    vertex_depths: Vec<GraphDepth>,
    depth_vertex_ids: BTreeMap<GraphDepth, BTreeSet<VertexId>>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vertex at [`DEFAULT_DEPTH`] and returns its id.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(Vertex::new(id));
        self.adjacency.push(BTreeSet::new());
        self.vertex_depths.push(DEFAULT_DEPTH);
        self.depth_vertex_ids
            .entry(DEFAULT_DEPTH)
            .or_default()
            .insert(id);
        id
    }

    /// Inserts an edge from `from` to `to`, coloring it with
    /// [`Graph::classify_edge`].
    ///
    /// A grey edge fixes the depth of `to` to the depth of `from` plus one.
    /// Nothing is mutated when the call fails.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for ids that were never created
    /// and [`GraphError::UnclassifiableEdge`] when no color applies.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId, GraphError> {
        let color = self.classify_edge(from, to)?;
        if color == EdgeColor::Grey {
            let depth = self.vertex_depth(from)? + 1;
            self.assign_depth(to, depth)?;
        }

        let id = self.edges.len();
        self.edges.push(Edge::new(id, from, to, color));
        self.adjacency_mut(from)?.insert(id);
        if from != to {
            self.adjacency_mut(to)?.insert(id);
        }
        Ok(id)
    }

    /// Computes the color an edge from `from` to `to` would receive given the
    /// current graph state.
    ///
    /// The "no incident edges" check runs before the depth checks because a
    /// fresh vertex has no meaningful depth until its tree edge arrives.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for ids that were never created
    /// and [`GraphError::UnclassifiableEdge`] when no color applies.
    pub fn classify_edge(&self, from: VertexId, to: VertexId) -> Result<EdgeColor, GraphError> {
        let from_depth = self.vertex_depth(from)?;
        let to_depth = self.vertex_depth(to)?;
        if from == to {
            return Ok(EdgeColor::Green);
        }
        if self.connected_edge_ids(to)?.is_empty() {
            return Ok(EdgeColor::Grey);
        }
        let step = to_depth.checked_sub(from_depth);
        if step == Some(YELLOW_DEPTH_STEP) && !self.are_connected(from, to)? {
            return Ok(EdgeColor::Yellow);
        }
        if step == Some(RED_DEPTH_STEP) {
            return Ok(EdgeColor::Red);
        }
        Err(GraphError::UnclassifiableEdge {
            from,
            to,
            from_depth,
            to_depth,
        })
    }

    /// Reports whether an edge already links `a` and `b`.
    ///
    /// For `a == b` this is `true` only when `a` carries a green self-loop.
    /// Otherwise it is `true` when an edge joins the two in either direction.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for ids that were never created.
    pub fn are_connected(&self, a: VertexId, b: VertexId) -> Result<bool, GraphError> {
        let a_edges = self.connected_edge_ids(a)?;
        if a == b {
            return Ok(a_edges
                .iter()
                .filter_map(|id| self.edges.get(*id))
                .any(|edge| edge.color() == EdgeColor::Green));
        }

        let b_edges = self.connected_edge_ids(b)?;
        let (smaller, larger) = if a_edges.len() <= b_edges.len() {
            (a_edges, b_edges)
        } else {
            (b_edges, a_edges)
        };
        Ok(smaller.iter().any(|id| larger.contains(id)))
    }

    fn assign_depth(&mut self, vertex: VertexId, depth: GraphDepth) -> Result<(), GraphError> {
        let vertices = self.vertices.len();
        let slot = self
            .vertex_depths
            .get_mut(vertex)
            .ok_or(GraphError::UnknownVertex { vertex, vertices })?;
        if *slot != DEFAULT_DEPTH {
            return Err(GraphError::DepthAlreadyAssigned {
                vertex,
                depth: *slot,
            });
        }
        *slot = depth;

        if let Some(bucket) = self.depth_vertex_ids.get_mut(&DEFAULT_DEPTH) {
            bucket.remove(&vertex);
        }
        self.depth_vertex_ids.entry(depth).or_default().insert(vertex);
        Ok(())
    }

    fn adjacency_mut(&mut self, vertex: VertexId) -> Result<&mut BTreeSet<EdgeId>, GraphError> {
        let vertices = self.vertices.len();
        self.adjacency
            .get_mut(vertex)
            .ok_or(GraphError::UnknownVertex { vertex, vertices })
    }

    fn unknown_vertex(&self, vertex: VertexId) -> GraphError {
        GraphError::UnknownVertex {
            vertex,
            vertices: self.vertices.len(),
        }
    }
}

impl GraphView for Graph {
    fn depth(&self) -> GraphDepth {
        self.depth_vertex_ids
            .values()
            .filter(|bucket| !bucket.is_empty())
            .count()
    }

    fn vertices_count(&self) -> usize {
        self.vertices.len()
    }

    fn edges_count(&self) -> usize {
        self.edges.len()
    }

    fn vertex_depth(&self, id: VertexId) -> Result<GraphDepth, GraphError> {
        self.vertex_depths
            .get(id)
            .copied()
            .ok_or_else(|| self.unknown_vertex(id))
    }

    fn connected_edge_ids(&self, id: VertexId) -> Result<&BTreeSet<EdgeId>, GraphError> {
        self.adjacency
            .get(id)
            .ok_or_else(|| self.unknown_vertex(id))
    }

    fn depth_vertex_ids(&self, depth: GraphDepth) -> Result<&BTreeSet<VertexId>, GraphError> {
        self.depth_vertex_ids
            .get(&depth)
            .ok_or_else(|| GraphError::UnknownDepth {
                depth,
                depth_count: self.depth(),
            })
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}
