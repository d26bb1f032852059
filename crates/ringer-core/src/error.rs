//! Error types for `ringer-core`.

use thiserror::Error;

use crate::player::PlayerId;

#[derive(Debug, Error)]
pub enum Error {
  // ── Roster input ──────────────────────────────────────────────────────

  #[error("roster is empty")]
  EmptyRoster,

  #[error("player id must not be empty")]
  EmptyId,

  #[error("duplicate player id: {0}")]
  DuplicateId(PlayerId),

  #[error("not enough secrets: {secrets} supplied for {players} players")]
  NotEnoughSecrets { players: usize, secrets: usize },

  // ── Game lifecycle ────────────────────────────────────────────────────

  #[error("the game has not been initialised")]
  NotInitialized,

  #[error("the game is already initialised")]
  AlreadyInitialized,

  // ── Elimination report rejections ─────────────────────────────────────

  #[error("unknown player: {0}")]
  UnknownPlayer(PlayerId),

  #[error("player {0} is dead and cannot report an elimination")]
  ReporterDead(PlayerId),

  #[error("victim {0} is not alive")]
  VictimNotAlive(PlayerId),

  #[error("player {victim} is not {killer}'s current target")]
  NotYourTarget { killer: PlayerId, victim: PlayerId },

  #[error("the reported proof does not match the victim's secret")]
  ProofMismatch,

  #[error("the game is over; no further eliminations are accepted")]
  GameOver,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Backend errors that may carry a domain rejection.
///
/// Implemented by storage-backend error types so generic callers (the HTTP
/// layer) can distinguish "the report was rejected" from "the backend broke"
/// without depending on any concrete backend.
pub trait DomainError: Sized {
  /// Extract the wrapped domain error, or give the original back.
  fn into_domain(self) -> std::result::Result<Error, Self>;
}

impl DomainError for Error {
  fn into_domain(self) -> std::result::Result<Error, Self> { Ok(self) }
}
