//! Errors reported by [`crate::GenerationController`].

use std::io;

use thiserror::Error;

use crate::{
    error::define_error_codes,
    generator::{GeneratorError, GeneratorErrorCode},
    graph::GraphErrorCode,
};

use super::worker::WorkerState;

/// Failures of a multi-graph generation run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    /// A worker was asked to perform a transition its state forbids.
    #[error("worker {worker} cannot {action} while {state}")]
    InvalidWorkerTransition {
        /// Index of the worker.
        worker: usize,
        /// State the worker was in.
        state: WorkerState,
        /// Rejected action.
        action: &'static str,
    },
    /// A worker thread panicked outside of a job.
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker.
        worker: usize,
    },
    /// A worker thread could not be started.
    #[error("failed to spawn worker {worker}: {source}")]
    SpawnFailed {
        /// Index of the worker.
        worker: usize,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
    /// A shared lock became poisoned after a callback panicked.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the poisoned resource.
        resource: &'static str,
    },
    /// Building graph `index` failed.
    #[error("generation of graph {index} failed: {source}")]
    Generation {
        /// Job index.
        index: usize,
        /// Underlying generator failure.
        #[source]
        source: GeneratorError,
    },
    /// Job `index` panicked, either in the generator or in a callback.
    #[error("generation job {index} panicked")]
    JobPanicked {
        /// Job index.
        index: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ControllerError`] variants.
    enum ControllerErrorCode for ControllerError {
        /// A worker was asked to perform a transition its state forbids.
        InvalidWorkerTransition => InvalidWorkerTransition { .. } =>
            "CONTROLLER_INVALID_WORKER_TRANSITION",
        /// A worker thread panicked outside of a job.
        WorkerPanicked => WorkerPanicked { .. } => "CONTROLLER_WORKER_PANICKED",
        /// A worker thread could not be started.
        SpawnFailed => SpawnFailed { .. } => "CONTROLLER_SPAWN_FAILED",
        /// A shared lock became poisoned.
        LockPoisoned => LockPoisoned { .. } => "CONTROLLER_LOCK_POISONED",
        /// Building a graph failed.
        Generation => Generation { .. } => "CONTROLLER_GENERATION_FAILED",
        /// A job panicked.
        JobPanicked => JobPanicked { .. } => "CONTROLLER_JOB_PANICKED",
    }
}

impl ControllerError {
    /// Retrieve the inner [`GeneratorErrorCode`] when a generation job failed.
    #[must_use]
    pub const fn generator_code(&self) -> Option<GeneratorErrorCode> {
        match self {
            Self::Generation { source, .. } => Some(source.code()),
            _ => None,
        }
    }

    /// Retrieve the [`GraphErrorCode`] behind a failed generation job, if the
    /// graph itself rejected an operation.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Generation { source, .. } => source.graph_code(),
            _ => None,
        }
    }
}
