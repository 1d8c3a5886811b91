//! Support library for the graphgen CLI binary.
//!
//! Exposes the command pipeline, the generation journal, logging setup, and
//! graph rendering so integration tests can drive them without spawning a
//! subprocess.

pub mod cli;
pub mod journal;
pub mod logging;
pub mod render;
