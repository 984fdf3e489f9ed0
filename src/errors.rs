//! Error types for versemap-core.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for pipeline operations.
#[derive(Debug, Error)]
pub enum VersemapError {
    /// Configuration-related errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stage needs an upstream artifact that has not been produced.
    #[error("{stage}: required artifact missing at {}", path.display())]
    MissingArtifact {
        /// Stage that requested the artifact.
        stage: &'static str,
        /// Expected location of the artifact.
        path: PathBuf,
    },

    /// Array shapes that do not line up (row counts, dimensions).
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// A passage with no member verses reached the pooler.
    #[error("passage has no member verses")]
    EmptyPassage,

    /// Caller passed an argument outside the operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serde serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Malformed CSV stream (not a single bad row, those are skipped).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// `.npy` read failure.
    #[error("npy read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// `.npy` write failure.
    #[error("npy write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),
}

/// Result type for versemap operations.
pub type Result<T> = std::result::Result<T, VersemapError>;
