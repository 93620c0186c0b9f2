//! CLI support for cond-probe
//!
//! Provides programmatic access to the `check` and `split` commands for
//! embedding in other tools.

mod check;

pub use check::{CheckOptions, CheckOutcome, describe_split, execute_check, load_document};

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine rejected a clause path
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// The document is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading stdin failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Reading the document file failed
    #[error("Cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No document was given
    #[error("No input provided. Use --input, --file, or pipe JSON to stdin.")]
    NoInput,

    /// Both --input and --file were given
    #[error("Use either --input or --file, not both.")]
    ConflictingInput,
}
