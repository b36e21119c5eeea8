//! # Error Handling
//!
//! This module defines the centralized error type for `repo-provision`. It
//! uses `thiserror` to build an `Error` enum covering every failure the
//! provisioning pipeline can hit, each variant carrying enough context
//! (paths, command lines, exit statuses) to act on the message directly.
//!
//! Only one variant is recoverable: [`Error::MalformedEntry`] is reported by
//! the orchestrator and the offending manifest line is skipped. Every other
//! variant aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for repo-provision operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest file could not be opened or read.
    #[error("Cannot read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line did not split into exactly three whitespace-separated
    /// tokens.
    #[error("Malformed manifest entry on line {line_number}: {line:?}")]
    MalformedEntry { line_number: usize, line: String },

    /// An external command could not be started at all.
    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command ran and exited unsuccessfully.
    #[error("Command failed ({status}): {command}")]
    CommandFailed {
        command: String,
        /// Human-readable exit status, e.g. `exit status: 128`
        status: String,
        /// Numeric exit code, absent when the child was killed by a signal
        code: Option<i32>,
    },

    /// A provisioning state record could not be read or written.
    #[error("State record error for {}: {message}", path.display())]
    StateRecord { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
