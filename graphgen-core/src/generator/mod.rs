//! Builds one random colored graph.
//!
//! Generation runs in two stages. The grey phase grows a random tree on a
//! Rayon pool; once it has been joined, the colored phase adds green, yellow,
//! and red edges from three concurrent passes.

mod colored;
mod error;
mod grey;
mod params;
mod rng;

use tracing::{debug, info, instrument};

use crate::graph::{Graph, GraphView};

pub use self::{
    error::{GeneratorError, GeneratorErrorCode},
    params::GeneratorParams,
};

use self::{colored::run_colored_phase, grey::run_grey_phase, rng::RngFactory};

/// Generates graphs for a fixed [`GeneratorParams`].
///
/// # Examples
/// ```
/// use graphgen_core::{GeneratorParams, GraphGenerator, GraphView};
///
/// let generator = GraphGenerator::new(GeneratorParams::new(3, 2).with_rng_seed(5));
/// let graph = generator.generate().expect("generation must succeed");
/// assert!(graph.vertices_count() >= 1);
/// assert!(graph.depth() <= 3);
/// ```
#[derive(Clone, Debug)]
pub struct GraphGenerator {
    params: GeneratorParams,
}

impl GraphGenerator {
    /// Creates a generator for `params`.
    #[must_use]
    pub const fn new(params: GeneratorParams) -> Self {
        Self { params }
    }

    /// Returns the parameters used by [`GraphGenerator::generate`].
    #[must_use]
    #[rustfmt::skip]
    pub const fn params(&self) -> &GeneratorParams { &self.params }

    /// Builds a new graph and transfers ownership to the caller.
    ///
    /// A depth of zero yields an empty graph.
    ///
    /// # Errors
    /// Returns [`GeneratorError`] when a worker thread cannot be started or
    /// panics, or when the graph rejects an edge. The run is abandoned rather
    /// than returning a partial graph.
    #[instrument(
        name = "generator.generate",
        skip(self),
        fields(
            depth = self.params.depth(),
            new_vertices_count = self.params.new_vertices_count(),
        ),
    )]
    pub fn generate(&self) -> Result<Graph, GeneratorError> {
        if self.params.depth() == 0 {
            debug!("depth is zero, returning an empty graph");
            return Ok(Graph::new());
        }

        let rngs = RngFactory::new(self.params.rng_seed());
        let tree = run_grey_phase(&self.params, &rngs)?;
        let graph = run_colored_phase(tree, &rngs)?;

        info!(
            vertices = graph.vertices_count(),
            edges = graph.edges_count(),
            depth = graph.depth(),
            "graph generation completed"
        );
        Ok(graph)
    }
}
