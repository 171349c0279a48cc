//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use taskboard_core::{AsCoreError, Error as CoreError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No usable caller identity on the request.
  #[error("unauthenticated: {0}")]
  Unauthenticated(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The store refused the operation; nothing changed.
  #[error("{message}")]
  Rejected {
    status:  StatusCode,
    code:    &'static str,
    message: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: domain rejections keep their meaning, anything
  /// else becomes a 500.
  pub fn store<E: AsCoreError>(err: E) -> Self {
    match err.core_error().and_then(rejection) {
      Some((status, code)) => Self::Rejected { status, code, message: err.to_string() },
      None => Self::Store(Box::new(err)),
    }
  }
}

/// HTTP status and stable error code for a rejected operation.
fn rejection(err: &CoreError) -> Option<(StatusCode, &'static str)> {
  Some(match err {
    CoreError::Unauthorized => (StatusCode::FORBIDDEN, "unauthorized"),
    CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
    CoreError::ParticipantNotFound(_) => (StatusCode::NOT_FOUND, "participant_not_found"),
    CoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
    CoreError::InvalidStateTransition { .. } => {
      (StatusCode::CONFLICT, "invalid_state_transition")
    }
    CoreError::AlreadyRegistered(_) => (StatusCode::CONFLICT, "already_registered"),
    CoreError::Serialization(_) => return None,
  })
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code, message) = match &self {
      ApiError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, "unauthenticated", m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m.clone()),
      ApiError::Rejected { status, code, message } => (*status, *code, message.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message, "code": code }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"taskboard\""),
      );
    }
    res
  }
}
