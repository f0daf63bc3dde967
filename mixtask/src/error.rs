//! Error types for mixtask

use mixcore::MixError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binning or mixing setup error
    #[error("mixing setup error: {0}")]
    Core(#[from] MixError),

    /// Inconsistent task configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TaskError>;
