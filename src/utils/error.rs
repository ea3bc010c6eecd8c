//! Error types for the field solver.
//!
//! Failures of individual solve jobs are not errors: they are reported through
//! [`JobOutcome`](crate::core::JobOutcome) and show up as missing outputs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the field solver.
#[derive(Error, Debug)]
pub enum SolverError {
    /// A request field is missing, mistyped or out of range.
    /// Always raised before any solver process is spawned.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Renaming, deleting or scanning a produced artifact failed
    #[error("Filesystem error on {}: {message}", path.display())]
    Filesystem {
        path: PathBuf,
        message: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Worker pool failure (closed semaphore, panicked worker task)
    #[error("Pool error: {0}")]
    Pool(String),
}

/// Convenience result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn filesystem(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised by request validation.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<tokio::sync::AcquireError> for SolverError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        Self::Pool(format!("Failed to acquire worker slot: {}", err))
    }
}

impl From<tokio::task::JoinError> for SolverError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Pool(format!("Worker task failed: {}", err))
    }
}
