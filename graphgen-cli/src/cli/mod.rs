//! Command-line interface orchestration for graphgen.
//!
//! The `generate` command builds several random graphs concurrently, records
//! progress in the generation journal, and writes one JSON file per graph.

mod commands;

pub use commands::{
    Cli, CliError, CliErrorCode, Command, DEFAULT_OUTPUT_DIR, GenerateCommand, GeneratedGraph,
    GenerationReport, render_report, run_cli, run_generate,
};
