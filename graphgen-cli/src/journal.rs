//! Line-oriented journal of generation progress.
//!
//! A [`GenerationJournal`] is created once by the entry point and shared by
//! reference with whatever needs to record progress. Each record is one
//! timestamped line appended to the sink under a mutex.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;
use tracing::info;
use tracing_subscriber::fmt::{
    format::Writer,
    time::{FormatTime, SystemTime},
};

/// Errors raised while opening or appending to the journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The journal file could not be opened.
    #[error("failed to open journal `{path}`: {source}")]
    Open {
        /// Path of the journal file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Appending a record failed.
    #[error("failed to append to journal: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The timestamp could not be formatted.
    #[error("failed to format journal timestamp")]
    Timestamp,
}

/// Appends `"<RFC 3339 timestamp> <message>"` lines to a shared sink.
///
/// # Examples
/// ```
/// use graphgen_cli::journal::GenerationJournal;
///
/// let journal = GenerationJournal::new(Vec::new());
/// journal.record("Graph 0, Generation Started").expect("in-memory sink");
/// let written = String::from_utf8(journal.into_inner()).expect("utf-8");
/// assert!(written.ends_with(" Graph 0, Generation Started\n"));
/// ```
#[derive(Debug)]
pub struct GenerationJournal<W> {
    sink: Mutex<W>,
}

impl GenerationJournal<File> {
    /// Opens `path` for appending, creating it and its parent directory when
    /// missing.
    ///
    /// # Errors
    /// Returns [`JournalError::Open`] when the directory or file cannot be
    /// created.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        let open_error = |source| JournalError::Open {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_error)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> GenerationJournal<W> {
    /// Wraps `sink`.
    #[must_use]
    pub const fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Appends one timestamped line and flushes the sink.
    ///
    /// # Errors
    /// Returns [`JournalError`] when the timestamp cannot be formatted or the
    /// sink rejects the write.
    pub fn record(&self, message: &str) -> Result<(), JournalError> {
        let mut line = String::new();
        SystemTime
            .format_time(&mut Writer::new(&mut line))
            .map_err(|_| JournalError::Timestamp)?;
        line.push(' ');
        line.push_str(message);
        line.push('\n');

        {
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            sink.write_all(line.as_bytes())
                .and_then(|()| sink.flush())
                .map_err(|source| JournalError::Write { source })?;
        }
        info!(entry = message, "journal record");
        Ok(())
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
