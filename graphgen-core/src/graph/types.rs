//! Identifier aliases and the immutable vertex/edge records stored by
//! [`crate::Graph`].

use std::fmt;

/// Dense, zero-based vertex identifier.
pub type VertexId = usize;

/// Dense, zero-based edge identifier.
pub type EdgeId = usize;

/// Tree depth of a vertex. The root sits at [`DEFAULT_DEPTH`].
pub type GraphDepth = usize;

/// Depth assigned to every vertex on creation.
pub const DEFAULT_DEPTH: GraphDepth = 1;

/// A vertex is identity only.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Vertex {
    id: VertexId,
}

impl Vertex {
    pub(crate) const fn new(id: VertexId) -> Self {
        Self { id }
    }

    /// Returns the vertex identifier.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> VertexId { self.id }
}

/// Semantic classification of an edge, fixed when the edge is inserted.
///
/// # Examples
/// ```
/// use graphgen_core::EdgeColor;
///
/// assert_eq!(EdgeColor::Yellow.as_str(), "yellow");
/// assert_eq!(EdgeColor::ALL.len(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum EdgeColor {
    /// Tree edge fixing the child's depth to the parent's depth plus one.
    Grey,
    /// Self-loop.
    Green,
    /// Edge to a previously unconnected vertex one level deeper.
    Yellow,
    /// Edge skipping exactly one level.
    Red,
}

impl EdgeColor {
    /// Every color in rendering order.
    pub const ALL: [Self; 4] = [Self::Grey, Self::Green, Self::Yellow, Self::Red];

    /// Returns the lowercase name used by the text and JSON renderings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "grey",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for EdgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable directed edge.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Edge {
    id: EdgeId,
    from: VertexId,
    to: VertexId,
    color: EdgeColor,
}

impl Edge {
    pub(crate) const fn new(id: EdgeId, from: VertexId, to: VertexId, color: EdgeColor) -> Self {
        Self {
            id,
            from,
            to,
            color,
        }
    }

    /// Returns the edge identifier.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> EdgeId { self.id }

    /// Returns the source vertex.
    #[must_use]
    #[rustfmt::skip]
    pub const fn from_vertex_id(&self) -> VertexId { self.from }

    /// Returns the destination vertex.
    #[must_use]
    #[rustfmt::skip]
    pub const fn to_vertex_id(&self) -> VertexId { self.to }

    /// Returns the color assigned on insertion.
    #[must_use]
    #[rustfmt::skip]
    pub const fn color(&self) -> EdgeColor { self.color }

    /// Returns `true` when both endpoints are the same vertex.
    #[must_use]
    pub const fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Number of edges of each [`EdgeColor`] in a graph.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ColorDistribution {
    counts: [usize; 4],
}

impl ColorDistribution {
    pub(crate) fn record(&mut self, color: EdgeColor) {
        if let Some(slot) = self.counts.get_mut(slot_of(color)) {
            *slot += 1;
        }
    }

    /// Returns how many edges carry `color`.
    #[must_use]
    pub fn count(&self, color: EdgeColor) -> usize {
        self.counts.get(slot_of(color)).copied().unwrap_or(0)
    }

    /// Iterates `(color, count)` pairs in [`EdgeColor::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeColor, usize)> + '_ {
        EdgeColor::ALL
            .into_iter()
            .map(|color| (color, self.count(color)))
    }

    /// Returns the total number of edges counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

const fn slot_of(color: EdgeColor) -> usize {
    match color {
        EdgeColor::Grey => 0,
        EdgeColor::Green => 1,
        EdgeColor::Yellow => 2,
        EdgeColor::Red => 3,
    }
}
