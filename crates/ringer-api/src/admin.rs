//! Handler for the gamemaster report.
//!
//! The rows include secrets and last wills, so the route must only be
//! mounted behind an authentication layer; see `ringer-server`.

use axum::{Json, extract::State};
use ringer_core::{store::GameStore, view::AdminRow};

use crate::{AppState, error::ApiError};

/// `GET /report` — one row per player, sorted by name.
pub async fn report<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<AdminRow>>, ApiError>
where
  S: GameStore,
{
  let rows = state
    .store
    .admin_report()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}
