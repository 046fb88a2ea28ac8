//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{FromRequest, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tiers_core::Error> for ApiError {
  fn from(e: tiers_core::Error) -> Self {
    match e {
      missing @ tiers_core::Error::NotFound { .. } => ApiError::NotFound(missing.to_string()),
      tiers_core::Error::Backend(inner) => ApiError::Store(inner),
      bad if bad.is_validation() => ApiError::BadRequest(bad.to_string()),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

/// [`axum::Json`] with its rejections reported as [`ApiError`], so a
/// malformed body still gets an `{"error": ...}` response.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Convert any store error into an [`ApiError`], keeping the distinction
/// between bad input, missing rows and backend failures.
pub fn store_err<E: Into<tiers_core::Error>>(e: E) -> ApiError { ApiError::from(e.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tiers_core::kind::EntityKind;

  #[test]
  fn core_errors_map_to_status_classes() {
    let nf = ApiError::from(tiers_core::Error::NotFound { kind: EntityKind::Goal, id: 4 });
    assert!(matches!(nf, ApiError::NotFound(ref m) if m == "goal 4 not found"));

    let bad = ApiError::from(tiers_core::Error::NameRequired);
    assert!(matches!(bad, ApiError::BadRequest(_)));

    let kind = ApiError::from(tiers_core::Error::UnknownKind("task".into()));
    assert_eq!(kind.into_response().status(), StatusCode::BAD_REQUEST);

    let io = std::io::Error::other("disk full");
    let backend = ApiError::from(tiers_core::Error::Backend(Box::new(io)));
    assert_eq!(backend.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
