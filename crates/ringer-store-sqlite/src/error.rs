//! Error type for `ringer-store-sqlite`.

use ringer_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rejection (bad report, uninitialised game, ...); the database
  /// itself is fine.
  #[error("game error: {0}")]
  Core(#[from] ringer_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown game mode in store: {0:?}")]
  UnknownMode(String),
}

impl DomainError for Error {
  fn into_domain(self) -> std::result::Result<ringer_core::Error, Self> {
    match self {
      Self::Core(e) => Ok(e),
      other => Err(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
