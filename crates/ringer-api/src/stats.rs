//! Handlers for the public scoreboard endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leaderboard` | Optional `?limit=` |
//! | `GET`  | `/deaths` | Optional `?limit=`; newest first |
//! | `GET`  | `/stats` | Combined scoreboard page data |

use axum::{
  Json,
  extract::{Query, State},
};
use ringer_core::{
  store::GameStore,
  view::{DeathRow, LeaderboardRow},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

/// `GET /leaderboard[?limit=N]`
pub async fn leaderboard<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError>
where
  S: GameStore,
{
  let rows = state
    .store
    .leaderboard(params.limit.unwrap_or(state.stats_row_limit))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

/// `GET /deaths[?limit=N]`
pub async fn recent_deaths<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<DeathRow>>, ApiError>
where
  S: GameStore,
{
  let rows = state
    .store
    .recent_deaths(params.limit.unwrap_or(state.stats_row_limit))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

/// Everything the public scoreboard page needs in one request.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsSummary {
  pub num_alive:     u32,
  pub num_dead:      u32,
  pub top_scores:    Vec<LeaderboardRow>,
  pub recent_deaths: Vec<DeathRow>,
}

/// `GET /stats`
pub async fn summary<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<StatsSummary>, ApiError>
where
  S: GameStore,
{
  let limit = state.stats_row_limit;
  let counts = state
    .store
    .liveness_counts()
    .await
    .map_err(ApiError::from_store)?;
  let top_scores = state
    .store
    .leaderboard(limit)
    .await
    .map_err(ApiError::from_store)?;
  let recent_deaths = state
    .store
    .recent_deaths(limit)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(StatsSummary {
    num_alive: counts.alive,
    num_dead: counts.dead,
    top_scores,
    recent_deaths,
  }))
}
