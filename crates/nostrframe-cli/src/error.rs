//! CLI error types.

use std::{io, path::PathBuf};

use nostrframe_app::RegistryError;
use thiserror::Error;

/// Errors that end a CLI run.
#[derive(Error, Debug)]
pub enum CliError {
    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serializing the report failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown or malformed element tag.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Fixture file could not be read.
    #[error("cannot read fixtures {}: {source}", path.display())]
    ReadFixtures {
        /// Fixture file path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Fixture file is not valid fixture JSON.
    #[error("invalid fixtures {}: {source}", path.display())]
    ParseFixtures {
        /// Fixture file path
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// `--attr` argument without `=`.
    #[error("invalid attribute '{0}': expected key=value")]
    InvalidAttribute(String),
}
