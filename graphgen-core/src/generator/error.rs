//! Errors produced while generating a graph.

use std::io;

use thiserror::Error;

use crate::{error::define_error_codes, graph::GraphError};

/// Errors that abort a generation run.
///
/// Every variant indicates a defect or an exhausted host rather than bad
/// input, so the run is abandoned instead of returning a partial graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    /// A graph invariant was violated while inserting edges.
    #[error("graph invariant violated during generation: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: GraphError,
    },
    /// A synchronisation primitive became poisoned after a panic.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the poisoned resource.
        resource: &'static str,
    },
    /// The grey-phase thread pool could not be built.
    #[error("failed to build the grey phase thread pool: {message}")]
    ThreadPool {
        /// Error reported by Rayon.
        message: String,
    },
    /// A colored pass thread could not be started.
    #[error("failed to spawn the {pass} pass: {source}")]
    SpawnFailed {
        /// Name of the pass.
        pass: &'static str,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
    /// A colored pass panicked before finishing.
    #[error("the {pass} pass panicked")]
    PassPanicked {
        /// Name of the pass.
        pass: &'static str,
    },
}

define_error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// A graph invariant was violated while inserting edges.
        Graph => Graph { .. } => "GENERATOR_GRAPH_INVARIANT",
        /// A synchronisation primitive became poisoned after a panic.
        LockPoisoned => LockPoisoned { .. } => "GENERATOR_LOCK_POISONED",
        /// The grey-phase thread pool could not be built.
        ThreadPool => ThreadPool { .. } => "GENERATOR_THREAD_POOL",
        /// A colored pass thread could not be started.
        SpawnFailed => SpawnFailed { .. } => "GENERATOR_SPAWN_FAILED",
        /// A colored pass panicked before finishing.
        PassPanicked => PassPanicked { .. } => "GENERATOR_PASS_PANICKED",
    }
}

impl GeneratorError {
    /// Retrieve the inner [`crate::GraphErrorCode`] when the failure came from
    /// the graph itself.
    #[must_use]
    pub const fn graph_code(&self) -> Option<crate::GraphErrorCode> {
        match self {
            Self::Graph { source } => Some(source.code()),
            _ => None,
        }
    }
}
