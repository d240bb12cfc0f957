//! Error type for `faqchat-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("generation service returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("generation service returned no content")]
  EmptyCompletion,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
