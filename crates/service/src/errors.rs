use std::path::PathBuf;

use thiserror::Error;

/// Failures of the backing store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt store {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt { path: path.into(), reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// True when the persisted data itself cannot be trusted.
    pub fn is_corrupt_store(&self) -> bool {
        matches!(self, Self::Store(StoreError::Corrupt { .. }))
    }
}
