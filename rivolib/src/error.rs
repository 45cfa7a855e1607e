//! Single error type of the public API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RivoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("missing required reference: {0}")]
    MissingReference(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, RivoError>;
