//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by the chat handler.
///
/// Only persistence problems reach the caller; index and generation failures
/// are absorbed by the pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let ApiError::Store(e) = &self;
    tracing::error!(error = %e, "store failure");
    let body = Json(json!({ "error": e.to_string() }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
  }
}
