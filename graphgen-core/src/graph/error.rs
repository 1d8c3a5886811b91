//! Errors raised by [`crate::Graph`] lookups and mutations.

use thiserror::Error;

use crate::error::define_error_codes;

use super::{GraphDepth, VertexId};

/// Invariant violations detected by the graph.
///
/// None of these are caused by external input: a generator that respects the
/// phase ordering never triggers them, so callers treat them as fatal.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// A vertex id was never allocated by this graph.
    #[error("vertex {vertex} does not exist (graph has {vertices} vertices)")]
    UnknownVertex {
        /// The requested vertex id.
        vertex: VertexId,
        /// Number of vertices allocated so far.
        vertices: usize,
    },
    /// No vertex has ever been placed at the requested depth.
    #[error("depth {depth} has no bucket (graph has {depth_count} depth buckets)")]
    UnknownDepth {
        /// The requested depth.
        depth: GraphDepth,
        /// Number of depth buckets currently populated.
        depth_count: usize,
    },
    /// The coloring rule could not classify the requested edge.
    #[error(
        "cannot determine color for edge {from} -> {to} (depths {from_depth} -> {to_depth})"
    )]
    UnclassifiableEdge {
        /// Source vertex.
        from: VertexId,
        /// Destination vertex.
        to: VertexId,
        /// Depth of the source vertex at insertion time.
        from_depth: GraphDepth,
        /// Depth of the destination vertex at insertion time.
        to_depth: GraphDepth,
    },
    /// A tree edge tried to move a vertex that already left the default depth.
    #[error("vertex {vertex} already has depth {depth}")]
    DepthAlreadyAssigned {
        /// The vertex whose depth was already fixed.
        vertex: VertexId,
        /// Its current depth.
        depth: GraphDepth,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// A vertex id was never allocated by this graph.
        UnknownVertex => UnknownVertex { .. } => "GRAPH_UNKNOWN_VERTEX",
        /// No vertex has ever been placed at the requested depth.
        UnknownDepth => UnknownDepth { .. } => "GRAPH_UNKNOWN_DEPTH",
        /// The coloring rule could not classify the requested edge.
        UnclassifiableEdge => UnclassifiableEdge { .. } => "GRAPH_UNCLASSIFIABLE_EDGE",
        /// A tree edge tried to move a vertex that already left the default depth.
        DepthAlreadyAssigned => DepthAlreadyAssigned { .. } => "GRAPH_DEPTH_ALREADY_ASSIGNED",
    }
}
