//! Crate-wide error type shared by every pipeline stage.

use thiserror::Error;

/// Errors surfaced by the ingest and answer pipelines.
///
/// Every stage propagates through this type with `?`; the HTTP layer is the
/// only place errors are rendered for users.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o failure: {0}")]
    Io(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("embedding provider failure: {0}")]
    Embedding(String),

    #[error("chat model failure: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}

impl From<tokio_rusqlite::Error> for RagError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        RagError::Storage(err.to_string())
    }
}
