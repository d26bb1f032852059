//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings (a fixed +00:00 offset, so SQL
//! `MAX(time)` agrees with chronological order). A missing elimination
//! location is stored as the sentinel coordinate pair rather than NULL,
//! matching the data files this system inherits.

use chrono::{DateTime, Utc};
use ringer_core::{
  kill::Location,
  player::{GameMode, PlayerId},
  view::{AdminRow, DeathRow, KillView, PlayerView},
};

use crate::{Error, Result};

/// Coordinate stored when the reporter declined to share a location.
pub const MISSING_COORD: f64 = -10000.0;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── GameMode ────────────────────────────────────────────────────────────────

pub fn encode_mode(mode: GameMode) -> &'static str {
  match mode {
    GameMode::Regular => "regular",
    GameMode::Word => "word",
  }
}

pub fn decode_mode(s: &str) -> Result<GameMode> {
  match s {
    "regular" => Ok(GameMode::Regular),
    "word" => Ok(GameMode::Word),
    other => Err(Error::UnknownMode(other.to_string())),
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn encode_location(location: Option<Location>) -> (f64, f64) {
  match location {
    Some(l) => (l.latitude, l.longitude),
    None => (MISSING_COORD, MISSING_COORD),
  }
}

pub fn decode_location(latitude: f64, longitude: f64) -> Option<Location> {
  if latitude == MISSING_COORD && longitude == MISSING_COORD {
    None
  } else {
    Some(Location { latitude, longitude })
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read for one row of a kill feed (victim or kill-history).
pub struct RawKillView {
  pub name: String,
  pub time: String,
}

impl RawKillView {
  pub fn into_death_row(self) -> Result<DeathRow> {
    Ok(DeathRow { name: self.name, time: decode_dt(&self.time)? })
  }

  pub fn into_kill_view(self) -> Result<KillView> {
    Ok(KillView { victim_name: self.name, time: decode_dt(&self.time)? })
  }
}

/// Raw strings read for a player's dashboard view.
pub struct RawPlayerView {
  pub id:            String,
  pub alive:         bool,
  pub target_name:   String,
  pub target_secret: String,
  pub kills:         Vec<RawKillView>,
}

impl RawPlayerView {
  pub fn into_view(self) -> Result<PlayerView> {
    Ok(PlayerView {
      id:            PlayerId::from(self.id),
      alive:         self.alive,
      target_name:   self.target_name,
      target_secret: self.target_secret,
      recent_kills:  self
        .kills
        .into_iter()
        .map(RawKillView::into_kill_view)
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw strings read for one gamemaster-report row.
pub struct RawAdminRow {
  pub id:          String,
  pub name:        String,
  pub target_name: Option<String>,
  pub secret:      String,
  pub alive:       bool,
  pub kill_count:  u32,
  pub last_victim: Option<String>,
  pub last_time:   Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub last_will:   Option<String>,
}

impl RawAdminRow {
  pub fn into_row(self) -> Result<AdminRow> {
    let last_activity = self.last_time.as_deref().map(decode_dt).transpose()?;
    let last_location = match (self.latitude, self.longitude) {
      (Some(lat), Some(lon)) => decode_location(lat, lon),
      _ => None,
    };

    Ok(AdminRow {
      id: PlayerId::from(self.id),
      name: self.name,
      target_name: self.target_name,
      secret: self.secret,
      alive: self.alive,
      kill_count: self.kill_count,
      last_victim: self.last_victim,
      last_activity,
      last_location,
      last_will: self.last_will,
    })
  }
}
