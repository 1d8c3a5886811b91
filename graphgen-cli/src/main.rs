//! `graphgen` binary.
//!
//! Generation failures are logged with every stable code on the error chain
//! (CLI, controller, generator, graph) so scripts can react without parsing
//! messages. The report goes to stdout; diagnostics go to stderr.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use graphgen_cli::{
    cli::{Cli, CliError, GenerationReport, render_report, run_cli},
    logging,
};
use tracing::{error, field};

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        #[expect(
            clippy::print_stderr,
            reason = "no subscriber is installed when logging setup fails"
        )]
        eprintln!("graphgen: {err}");
        return ExitCode::FAILURE;
    }

    let report = match run_cli(Cli::parse()) {
        Ok(report) => report,
        Err(err) => {
            log_generation_failure(&err);
            return ExitCode::FAILURE;
        }
    };

    match print_report(&report) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "failed to print the generation report");
            ExitCode::FAILURE
        }
    }
}

fn log_generation_failure(err: &CliError) {
    error!(
        error = %err,
        code = %err.code(),
        controller_code = err.controller_code().map(field::display),
        generator_code = err.generator_code().map(field::display),
        graph_code = err.graph_code().map(field::display),
        "graph generation failed"
    );
}

fn print_report(report: &GenerationReport) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    render_report(report, &mut stdout).context("failed to write the report")?;
    stdout.flush().context("failed to flush stdout")
}
