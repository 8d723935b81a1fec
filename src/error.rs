//! Error types for the history store.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or writing persisted round history.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store refused the write
    #[error("write rejected for key '{0}'")]
    Rejected(String),
}
