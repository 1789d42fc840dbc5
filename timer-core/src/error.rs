//! Error types for timer-core

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a storage medium.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("update interval must be a positive number of milliseconds, got {0}")]
    InvalidInterval(u64),

    #[error("timer state is inconsistent: status does not match its sections, or sections overlap")]
    InconsistentState,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("could not encode or decode timer state: {0}")]
    Serialization(#[from] serde_json::Error),
}
