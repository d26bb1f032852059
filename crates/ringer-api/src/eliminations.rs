//! Handler for `POST /eliminations` — the write path of the whole game.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use ringer_core::{
  engine::EliminationReport,
  kill::Location,
  player::PlayerId,
  store::GameStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// JSON body accepted by `POST /eliminations`.
///
/// Coordinates are both-or-neither; a half-specified location is rejected
/// rather than guessed at.
#[derive(Debug, Deserialize)]
pub struct ReportBody {
  pub killer_id: PlayerId,
  pub victim_id: PlayerId,
  /// The victim's secret, as proof. Required in word mode.
  pub proof:     Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

impl ReportBody {
  fn into_report(self) -> Result<EliminationReport, ApiError> {
    let location = match (self.latitude, self.longitude) {
      (Some(latitude), Some(longitude)) => {
        Some(Location { latitude, longitude })
      }
      (None, None) => None,
      _ => {
        return Err(ApiError::BadRequest(
          "latitude and longitude must be supplied together".to_string(),
        ));
      }
    };

    Ok(EliminationReport {
      killer_id: self.killer_id,
      victim_id: self.victim_id,
      proof: self.proof,
      location,
    })
  }
}

/// `POST /eliminations` — returns 201 + the outcome, 409/410/404 on a
/// rejected report.
pub async fn report<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ReportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GameStore,
{
  let report = body.into_report()?;
  let killer_id = report.killer_id.clone();

  let outcome = state
    .store
    .report_elimination(report)
    .await
    .map_err(ApiError::from_store)?;

  // The transition is committed; notification failures are the hook's
  // problem and must not surface here.
  state.hook.on_elimination(&killer_id, &outcome);

  Ok((StatusCode::CREATED, Json(outcome)))
}
