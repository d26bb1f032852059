//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ringer_core::{DomainError, Error as CoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The game itself said no; the report or edit was rejected and nothing
  /// changed.
  #[error("{0}")]
  Rejected(CoreError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Split a backend failure into "the game rejected this" (a 4xx with the
  /// domain message) and "the backend broke" (a 500).
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    match err.into_domain() {
      Ok(CoreError::UnknownPlayer(id)) => {
        Self::NotFound(format!("unknown player: {id}"))
      }
      Ok(domain) => Self::Rejected(domain),
      Err(other) => Self::Store(Box::new(other)),
    }
  }
}

fn rejection_status(err: &CoreError) -> StatusCode {
  match err {
    // Once a winner exists the resource is permanently closed.
    CoreError::GameOver => StatusCode::GONE,
    CoreError::VictimNotAlive(_)
    | CoreError::NotYourTarget { .. }
    | CoreError::ReporterDead(_)
    | CoreError::ProofMismatch => StatusCode::CONFLICT,
    CoreError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
    _ => StatusCode::UNPROCESSABLE_ENTITY,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Rejected(e) => (rejection_status(e), e.to_string()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
