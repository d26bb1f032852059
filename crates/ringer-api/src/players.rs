//! Handlers for `/players` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players/:id` | Dashboard view; 404 if unknown |
//! | `PUT`  | `/players/:id/last-will` | Body: `{"last_will":"..."}`; null clears |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ringer_core::{player::PlayerId, store::GameStore, view::PlayerView};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// `GET /players/:id`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PlayerId>,
) -> Result<Json<PlayerView>, ApiError>
where
  S: GameStore,
{
  let view = state
    .store
    .player_view(id.clone())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("unknown player: {id}")))?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct LastWillBody {
  pub last_will: Option<String>,
}

/// `PUT /players/:id/last-will` — 204 on success.
pub async fn set_last_will<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PlayerId>,
  Json(body): Json<LastWillBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GameStore,
{
  state
    .store
    .set_last_will(id, body.last_will)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
