//! Read models — computed views over game state, never stored.
//!
//! Queries only; building one of these must not mutate anything. Consumers
//! (HTTP handlers, notifications, admin tooling) render them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  kill::Location,
  player::PlayerId,
};

/// What a player sees on their own dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
  pub id:            PlayerId,
  pub alive:         bool,
  /// Display name of the player currently being hunted.
  pub target_name:   String,
  /// The target's secret; display layers decide whether to show it.
  pub target_secret: String,
  /// This player's eliminations, most recent first.
  pub recent_kills:  Vec<KillView>,
}

/// One row of a player's kill history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillView {
  pub victim_name: String,
  pub time:        DateTime<Utc>,
}

/// One leaderboard row. Players with no recorded eliminations do not appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
  pub name:       String,
  pub alive:      bool,
  pub kill_count: u32,
}

/// One row of the recent-deaths feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathRow {
  pub name: String,
  pub time: DateTime<Utc>,
}

/// Alive/dead totals across the whole roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LivenessCounts {
  pub alive: u32,
  pub dead:  u32,
}

/// One row of the gamemaster report; everything known about a player,
/// secrets included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRow {
  pub id:            PlayerId,
  pub name:          String,
  pub target_name:   Option<String>,
  pub secret:        String,
  pub alive:         bool,
  pub kill_count:    u32,
  /// Most recent victim, if this player has eliminated anyone.
  pub last_victim:   Option<String>,
  pub last_activity: Option<DateTime<Utc>>,
  pub last_location: Option<Location>,
  pub last_will:     Option<String>,
}
