//! Graphgen core library.
//!
//! Builds random layered directed graphs whose edges carry one of four
//! colors, and schedules many independent generations on a worker pool.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod controller;
mod error;
mod generator;
mod graph;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    controller::{ControllerError, ControllerErrorCode, GenerationController, WorkerState},
    generator::{GeneratorError, GeneratorErrorCode, GeneratorParams, GraphGenerator},
    graph::{
        ColorDistribution, DEFAULT_DEPTH, Edge, EdgeColor, EdgeId, Graph, GraphDepth, GraphError,
        GraphErrorCode, GraphView, Vertex, VertexId,
    },
};
