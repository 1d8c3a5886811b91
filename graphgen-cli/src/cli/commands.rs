//! Command implementations and argument parsing for the graphgen CLI.

use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use clap::{Args, Parser, Subcommand};
use graphgen_core::{
    ControllerError, ControllerErrorCode, GenerationController, GeneratorErrorCode,
    GeneratorParams, Graph, GraphErrorCode, GraphView,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use crate::{
    journal::{GenerationJournal, JournalError},
    render::{RenderError, render_json, render_summary},
};

/// Directory receiving the generated files unless `--output-dir` is given.
pub const DEFAULT_OUTPUT_DIR: &str = "temp";
const DEFAULT_LOG_FILE_NAME: &str = "log.txt";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "graphgen", about = "Generate random layered graphs with colored edges.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate graphs and write them as JSON.
    Generate(GenerateCommand),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Maximum depth of every graph; zero yields empty graphs.
    #[arg(long)]
    pub depth: usize,

    /// Branching factor attempted under every tree vertex.
    #[arg(long = "new-vertices-count")]
    pub new_vertices_count: usize,

    /// Number of graphs to generate.
    #[arg(long = "graphs-count")]
    pub graphs_count: usize,

    /// Number of worker threads, clamped to the available parallelism.
    #[arg(long = "threads-count", default_value_t = 1)]
    pub threads_count: usize,

    /// Directory receiving `graph_<index>.json` files.
    #[arg(long = "output-dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Journal file; defaults to `log.txt` inside the output directory.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Seed for reproducible random draws.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenerateCommand {
    /// Returns the journal path, falling back to `<output-dir>/log.txt`.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DEFAULT_LOG_FILE_NAME))
    }

    fn params(&self) -> GeneratorParams {
        let params = GeneratorParams::new(self.depth, self.new_vertices_count);
        match self.seed {
            Some(seed) => params.with_rng_seed(seed),
            None => params,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while preparing or writing output.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Rendering graph `index` failed.
    #[error("failed to render graph {index}: {source}")]
    Render {
        /// Job index of the graph.
        index: usize,
        /// Underlying rendering failure.
        #[source]
        source: RenderError,
    },
    /// The generation journal failed.
    #[error(transparent)]
    Journal(#[from] JournalError),
    /// Graph generation failed.
    #[error(transparent)]
    Core(#[from] ControllerError),
}

/// Stable codes describing [`CliError`] failures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum CliErrorCode {
    /// The output directory or a graph file could not be written.
    OutputIo,
    /// A graph lookup failed while rendering.
    RenderGraph,
    /// JSON serialisation failed.
    RenderJson,
    /// The journal file could not be opened.
    JournalOpen,
    /// Appending to the journal failed.
    JournalWrite,
    /// A journal timestamp could not be formatted.
    JournalTimestamp,
    /// The generation controller reported a failure.
    Generation,
}

impl CliErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutputIo => "CLI_OUTPUT_IO",
            Self::RenderGraph => "CLI_RENDER_GRAPH",
            Self::RenderJson => "CLI_RENDER_JSON",
            Self::JournalOpen => "CLI_JOURNAL_OPEN",
            Self::JournalWrite => "CLI_JOURNAL_WRITE",
            Self::JournalTimestamp => "CLI_JOURNAL_TIMESTAMP",
            Self::Generation => "CLI_GENERATION_FAILED",
        }
    }
}

impl fmt::Display for CliErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CliError {
    /// Retrieve the stable [`CliErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> CliErrorCode {
        match self {
            Self::Io { .. } => CliErrorCode::OutputIo,
            Self::Render {
                source: RenderError::Graph(_),
                ..
            } => CliErrorCode::RenderGraph,
            Self::Render {
                source: RenderError::Json(_),
                ..
            } => CliErrorCode::RenderJson,
            Self::Journal(JournalError::Open { .. }) => CliErrorCode::JournalOpen,
            Self::Journal(JournalError::Write { .. }) => CliErrorCode::JournalWrite,
            Self::Journal(JournalError::Timestamp) => CliErrorCode::JournalTimestamp,
            Self::Core(_) => CliErrorCode::Generation,
        }
    }

    /// The controller's code when generation itself failed.
    #[must_use]
    pub const fn controller_code(&self) -> Option<ControllerErrorCode> {
        match self {
            Self::Core(source) => Some(source.code()),
            _ => None,
        }
    }

    /// The generator's code when a generation job failed.
    #[must_use]
    pub const fn generator_code(&self) -> Option<GeneratorErrorCode> {
        match self {
            Self::Core(source) => source.generator_code(),
            _ => None,
        }
    }

    /// The graph's code when a graph operation was rejected during
    /// generation or rendering.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Core(source) => source.graph_code(),
            Self::Render {
                source: RenderError::Graph(source),
                ..
            } => Some(source.code()),
            _ => None,
        }
    }
}

/// One graph written by the `generate` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGraph {
    /// Job index.
    pub index: usize,
    /// Number of populated depth buckets.
    pub depth: usize,
    /// Number of vertices.
    pub vertices: usize,
    /// Number of edges.
    pub edges: usize,
    /// Location of the JSON rendering.
    pub path: PathBuf,
}

/// Outcome of a `generate` run, ordered by job index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Directory holding the JSON files.
    pub output_dir: PathBuf,
    /// Graphs in ascending index order.
    pub graphs: Vec<GeneratedGraph>,
}

/// Executes the CLI command represented by `cli`.
///
/// Opens the journal named by the command and runs it.
///
/// # Errors
/// Returns [`CliError`] when the journal cannot be opened or generation fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use graphgen_cli::cli::{Cli, Command, GenerateCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let cli = Cli {
///     command: Command::Generate(GenerateCommand {
///         depth: 3,
///         new_vertices_count: 2,
///         graphs_count: 2,
///         threads_count: 2,
///         output_dir: dir.path().to_path_buf(),
///         log_file: None,
///         seed: Some(7),
///     }),
/// };
/// let report = run_cli(cli)?;
/// assert_eq!(report.graphs.len(), 2);
/// assert!(dir.path().join("graph_1.json").exists());
/// assert!(dir.path().join("log.txt").exists());
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<GenerationReport, CliError> {
    match cli.command {
        Command::Generate(command) => {
            Span::current().record("command", field::display("generate"));
            let journal = GenerationJournal::open(&command.log_file())?;
            run_generate(&command, &journal)
        }
    }
}

/// Generates the requested graphs, journals their progress, and writes one
/// `graph_<index>.json` file per graph into the output directory.
///
/// Output failures inside the finish callback do not stop the other jobs; the
/// first one is returned once every job has run.
///
/// # Errors
/// Returns [`CliError`] when the output directory cannot be created, a graph
/// cannot be rendered or written, the journal fails, or generation fails.
#[instrument(
    name = "cli.generate",
    err,
    skip(command, journal),
    fields(
        depth = command.depth,
        new_vertices_count = command.new_vertices_count,
        graphs_count = command.graphs_count,
        threads_count = field::Empty,
    ),
)]
pub fn run_generate<W>(
    command: &GenerateCommand,
    journal: &GenerationJournal<W>,
) -> Result<GenerationReport, CliError>
where
    W: Write + Send,
{
    prepare_output_dir(&command.output_dir)?;

    let controller =
        GenerationController::new(command.threads_count, command.graphs_count, command.params());
    Span::current().record("threads_count", controller.threads_count());

    let failure = Mutex::new(None);
    let mut graphs = Vec::with_capacity(command.graphs_count);
    let generated = controller.generate(
        |index| {
            if let Err(error) = journal.record(&format!("Graph {index}, Generation Started")) {
                keep_first(&failure, error.into());
            }
        },
        |index, graph| match finish_graph(index, &graph, &command.output_dir, journal) {
            Ok(written) => graphs.push(written),
            Err(error) => keep_first(&failure, error),
        },
    );

    if let Some(error) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
        return Err(error);
    }
    generated?;

    graphs.sort_by_key(|graph| graph.index);
    info!(graphs = graphs.len(), "graphs written");
    Ok(GenerationReport {
        output_dir: command.output_dir.clone(),
        graphs,
    })
}

fn prepare_output_dir(path: &Path) -> Result<(), CliError> {
    fs::create_dir_all(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn finish_graph<W: Write>(
    index: usize,
    graph: &Graph,
    output_dir: &Path,
    journal: &GenerationJournal<W>,
) -> Result<GeneratedGraph, CliError> {
    journal.record(&format!(
        "Graph {index}, Generation Finished {}",
        render_summary(graph)
    ))?;

    let json = render_json(graph).map_err(|source| CliError::Render { index, source })?;
    let path = output_dir.join(format!("graph_{index}.json"));
    fs::write(&path, json).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(GeneratedGraph {
        index,
        depth: graph.depth(),
        vertices: graph.vertices_count(),
        edges: graph.edges_count(),
        path,
    })
}

fn keep_first(slot: &Mutex<Option<CliError>>, error: CliError) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        *slot = Some(error);
    }
}

/// Renders `report` to `writer`, one line per graph.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use std::path::PathBuf;
/// # use graphgen_cli::cli::{GeneratedGraph, GenerationReport, render_report};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let report = GenerationReport {
///     output_dir: PathBuf::from("temp"),
///     graphs: vec![GeneratedGraph {
///         index: 0,
///         depth: 2,
///         vertices: 3,
///         edges: 4,
///         path: PathBuf::from("temp/graph_0.json"),
///     }],
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_report(&report, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert_eq!(text, "graphs: 1\n0\tdepth 2\tvertices 3\tedges 4\ttemp/graph_0.json\n");
/// # Ok(())
/// # }
/// ```
pub fn render_report(report: &GenerationReport, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "graphs: {}", report.graphs.len())?;
    for graph in &report.graphs {
        writeln!(
            writer,
            "{}\tdepth {}\tvertices {}\tedges {}\t{}",
            graph.index,
            graph.depth,
            graph.vertices,
            graph.edges,
            graph.path.display()
        )?;
    }
    Ok(())
}
