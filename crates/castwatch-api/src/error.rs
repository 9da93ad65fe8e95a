//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("provider error: {0}")]
  Provider(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl ApiError {
  pub(crate) fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Provider(e) => {
        tracing::warn!(error = %e, "metadata provider request failed");
        (StatusCode::BAD_GATEWAY, "metadata provider unavailable".to_string())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
