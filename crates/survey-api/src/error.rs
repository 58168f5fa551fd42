//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"error": message, "code": code}`, plus
//! `"question_id"` when a validation error names a question.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use survey_core::{StorageErrorKind, StorageFault, ValidationError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Validation(ValidationError),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error from a read path.
  pub fn store<E: StorageFault>(e: E) -> Self { survey_core::Error::storage(e).into() }

  fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn code(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "not_found",
      Self::BadRequest(_) => "bad_request",
      Self::Validation(v) => v.code(),
      Self::Conflict(_) => "conflict",
      Self::Unavailable(_) => "unavailable",
      Self::Store(_) => "internal",
    }
  }
}

impl From<survey_core::Error> for ApiError {
  fn from(e: survey_core::Error) -> Self {
    use survey_core::Error;
    match e {
      Error::Validation(v) => Self::Validation(v),
      Error::NotFound(what) => Self::NotFound(format!("{what} not found")),
      e @ Error::IdempotencyConflict(_) => Self::Conflict(e.to_string()),
      Error::Storage { kind: StorageErrorKind::ConstraintViolation, source } => {
        Self::Conflict(source.to_string())
      }
      Error::Storage { kind: StorageErrorKind::Unavailable, source } => {
        Self::Unavailable(source.to_string())
      }
      Error::Storage { kind: StorageErrorKind::Internal, source } => Self::Store(source),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let message = match &self {
      Self::NotFound(m) | Self::BadRequest(m) | Self::Conflict(m) | Self::Unavailable(m) => {
        m.clone()
      }
      Self::Validation(v) => v.to_string(),
      Self::Store(e) => e.to_string(),
    };
    let mut body = json!({ "error": message, "code": self.code() });
    if let Self::Validation(v) = &self
      && let Some(question_id) = v.question_id()
    {
      body["question_id"] = json!(question_id);
    }
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn storage_kinds_map_to_statuses() {
    let io = || Box::new(std::io::Error::other("boom")) as Box<dyn std::error::Error + Send + Sync>;
    let cases = [
      (StorageErrorKind::ConstraintViolation, StatusCode::CONFLICT),
      (StorageErrorKind::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
      (StorageErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (kind, status) in cases {
      let e = ApiError::from(survey_core::Error::Storage { kind, source: io() });
      assert_eq!(e.status(), status);
    }
  }

  #[test]
  fn validation_errors_carry_code() {
    let e = ApiError::from(survey_core::Error::Validation(ValidationError::MissingRequired(3)));
    assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    assert_eq!(e.code(), "missing_required");
  }

  #[test]
  fn not_found_names_the_entity() {
    let e = ApiError::from(survey_core::Error::NotFound("survey 9".into()));
    assert_eq!(e.status(), StatusCode::NOT_FOUND);
    assert!(matches!(e, ApiError::NotFound(ref m) if m == "survey 9 not found"));
  }
}
