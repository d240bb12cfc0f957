//! Error type for `faqchat-index`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("embedding service returned {status}: {body}")]
  EmbeddingStatus {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("embedding error: {0}")]
  Embedding(String),

  #[error("invalid stored vector: {0}")]
  InvalidVector(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
