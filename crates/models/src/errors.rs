use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid scan count {value:?} for {identifier}")]
    InvalidScanCount { identifier: String, value: String },
}
