//! Parameter handling for [`crate::GraphGenerator`].

use crate::graph::GraphDepth;

use super::rng::mix_stream_seed;

/// Configuration for building one graph.
///
/// `depth` is the maximum tree depth (zero yields an empty graph) and
/// `new_vertices_count` is the branching factor attempted under every tree
/// vertex.
///
/// # Examples
/// ```
/// use graphgen_core::GeneratorParams;
///
/// let params = GeneratorParams::new(4, 3).with_rng_seed(7);
/// assert_eq!(params.depth(), 4);
/// assert_eq!(params.new_vertices_count(), 3);
/// assert_eq!(params.rng_seed(), Some(7));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratorParams {
    depth: GraphDepth,
    new_vertices_count: usize,
    rng_seed: Option<u64>,
}

impl GeneratorParams {
    /// Creates parameters that draw randomness from the operating system.
    #[must_use]
    pub const fn new(depth: GraphDepth, new_vertices_count: usize) -> Self {
        Self {
            depth,
            new_vertices_count,
            rng_seed: None,
        }
    }

    /// Seeds every random stream used during generation.
    ///
    /// Vertex and edge ids still depend on thread scheduling, so a seed fixes
    /// the random draws but not the final layout.
    #[must_use]
    pub const fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Returns the maximum tree depth.
    #[must_use]
    #[rustfmt::skip]
    pub const fn depth(&self) -> GraphDepth { self.depth }

    /// Returns the branching factor.
    #[must_use]
    #[rustfmt::skip]
    pub const fn new_vertices_count(&self) -> usize { self.new_vertices_count }

    /// Returns the configured seed, if any.
    #[must_use]
    #[rustfmt::skip]
    pub const fn rng_seed(&self) -> Option<u64> { self.rng_seed }

    /// Derives the parameters for job `index` of a multi-graph run so that
    /// seeded runs do not build every graph from the same random streams.
    #[must_use]
    pub fn for_job(&self, index: usize) -> Self {
        Self {
            rng_seed: self.rng_seed.map(|seed| mix_stream_seed(seed, index)),
            ..self.clone()
        }
    }
}
