//! Player records — the nodes of the hunting ring.
//!
//! A player's `target_id` edge is the only mutable part of the ring. Among
//! living players those edges always form a single cycle; a dead player's
//! edge is frozen at its value at the moment of death.

use serde::{Deserialize, Serialize};

// ─── PlayerId ────────────────────────────────────────────────────────────────

/// Externally-assigned stable identifier, e.g. a campus username.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl std::fmt::Display for PlayerId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for PlayerId {
  fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for PlayerId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── GameMode ────────────────────────────────────────────────────────────────

/// How eliminations are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
  /// Honor system: a report needs no proof.
  Regular,
  /// Word assassin: the killer must present the victim's secret word.
  Word,
}

impl GameMode {
  pub fn requires_proof(self) -> bool { matches!(self, Self::Word) }
}

// ─── Player ──────────────────────────────────────────────────────────────────

/// One entrant in the game.
///
/// Created once at roster build time and never deleted; an elimination only
/// flips `alive` and retargets the killer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
  pub id:        PlayerId,
  /// Display name.
  pub name:      String,
  /// Opaque token held as proof of this player's elimination.
  pub secret:    String,
  /// Who this player is hunting. A living player, or the player themselves
  /// in the sole-survivor terminal state.
  pub target_id: PlayerId,
  pub alive:     bool,
  /// Owner-authored free text; no invariant attaches to it.
  pub last_will: Option<String>,
}
