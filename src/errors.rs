use crate::config::ConfigError;
use dicom_object::{ReadError, WriteError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Any error that ends a redaction run.
///
/// Every variant is fatal: nothing is retried and nothing is rolled back.
/// Each maps to a distinct process exit code so failures can be told apart
/// by category (see [`RunError::exit_code`]).
#[derive(Error, Debug)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("incoherent series: {0}")]
    Series(String),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to overwrite existing output {}", path.display())]
    OutputExists { path: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

impl RunError {
    /// Process exit code for this error. Code 2 is left to the argument
    /// parser for usage errors; 0 means success.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 3,
            RunError::InvalidInput { .. } => 4,
            RunError::Read { .. } | RunError::Series(_) => 5,
            RunError::OutputDir { .. } => 6,
            RunError::OutputExists { .. } | RunError::Write { .. } => 7,
        }
    }
}
