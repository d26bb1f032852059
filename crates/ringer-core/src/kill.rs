//! Elimination records.
//!
//! Kills are strictly append-only: one record per elimination event, never
//! mutated or deleted. Per-killer insertion order is non-decreasing in time,
//! which is what "most recent activity" queries rely on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// A reported elimination site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude:  f64,
  pub longitude: f64,
}

/// One elimination event.
///
/// `killer_id == victim_id` never holds; even the final, game-winning kill
/// records the last victim, not the victor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kill {
  pub killer_id: PlayerId,
  pub victim_id: PlayerId,
  pub time:      DateTime<Utc>,
  /// `None` when the reporter declined to share coordinates.
  pub location:  Option<Location>,
}
