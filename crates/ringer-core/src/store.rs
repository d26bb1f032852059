//! The `GameStore` trait and the in-memory reference backend.
//!
//! The trait is implemented by storage backends (e.g. `ringer-store-sqlite`).
//! Higher layers (`ringer-api`, `ringer-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use tokio::sync::RwLock;

use crate::{
  DomainError, Error,
  engine::{EliminationOutcome, EliminationReport, GameState},
  player::{GameMode, Player, PlayerId},
  view::{AdminRow, DeathRow, LeaderboardRow, LivenessCounts, PlayerView},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a game storage backend.
///
/// `init_game` runs exactly once per game; every other write is an
/// elimination transition or a last-will edit. Backends must apply the whole
/// elimination transition atomically — concurrent reports must observe
/// either the fully pre- or fully post-transition state, never a partial
/// one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GameStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  /// Persist a freshly built roster and the game mode. Fails if a game
  /// already exists in this store.
  fn init_game(
    &self,
    mode: GameMode,
    roster: Vec<Player>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The mode the game was initialised with.
  fn game_mode(
    &self,
  ) -> impl Future<Output = Result<GameMode, Self::Error>> + Send + '_;

  /// Apply one elimination report; see
  /// [`plan_elimination`](crate::engine::plan_elimination) for the
  /// precondition cascade.
  fn report_elimination(
    &self,
    report: EliminationReport,
  ) -> impl Future<Output = Result<EliminationOutcome, Self::Error>> + Send + '_;

  /// A player's dashboard view. `None` for an unknown id.
  fn player_view(
    &self,
    id: PlayerId,
  ) -> impl Future<Output = Result<Option<PlayerView>, Self::Error>> + Send + '_;

  /// Replace a player's last will; `None` clears it.
  fn set_last_will(
    &self,
    id: PlayerId,
    last_will: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Top killers, descending by kill count.
  fn leaderboard(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LeaderboardRow>, Self::Error>> + Send + '_;

  /// Most recent deaths, newest first.
  fn recent_deaths(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DeathRow>, Self::Error>> + Send + '_;

  /// Alive/dead totals.
  fn liveness_counts(
    &self,
  ) -> impl Future<Output = Result<LivenessCounts, Self::Error>> + Send + '_;

  /// The gamemaster report, sorted by player name.
  fn admin_report(
    &self,
  ) -> impl Future<Output = Result<Vec<AdminRow>, Self::Error>> + Send + '_;
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

/// A [`GameStore`] over an in-process [`GameState`].
///
/// Reads take the shared lock and may run concurrently; a transition takes
/// the exclusive lock for the whole check-and-mutate sequence, so reports
/// can never interleave. Useful for tests and single-process deployments;
/// nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: RwLock<Option<GameState>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl GameStore for MemoryStore {
  type Error = Error;

  async fn init_game(
    &self,
    mode: GameMode,
    roster: Vec<Player>,
  ) -> Result<(), Error> {
    let mut state = self.state.write().await;
    if state.is_some() {
      return Err(Error::AlreadyInitialized);
    }
    *state = Some(GameState::new(mode, roster));
    Ok(())
  }

  async fn game_mode(&self) -> Result<GameMode, Error> {
    let state = self.state.read().await;
    state.as_ref().map(GameState::mode).ok_or(Error::NotInitialized)
  }

  async fn report_elimination(
    &self,
    report: EliminationReport,
  ) -> Result<EliminationOutcome, Error> {
    let mut state = self.state.write().await;
    let game = state.as_mut().ok_or(Error::NotInitialized)?;
    game.report_elimination(&report, chrono::Utc::now())
  }

  async fn player_view(
    &self,
    id: PlayerId,
  ) -> Result<Option<PlayerView>, Error> {
    let state = self.state.read().await;
    let game = state.as_ref().ok_or(Error::NotInitialized)?;
    Ok(game.player_view(&id))
  }

  async fn set_last_will(
    &self,
    id: PlayerId,
    last_will: Option<String>,
  ) -> Result<(), Error> {
    let mut state = self.state.write().await;
    let game = state.as_mut().ok_or(Error::NotInitialized)?;
    game.set_last_will(&id, last_will)
  }

  async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, Error> {
    let state = self.state.read().await;
    let game = state.as_ref().ok_or(Error::NotInitialized)?;
    Ok(game.leaderboard(limit))
  }

  async fn recent_deaths(&self, limit: usize) -> Result<Vec<DeathRow>, Error> {
    let state = self.state.read().await;
    let game = state.as_ref().ok_or(Error::NotInitialized)?;
    Ok(game.recent_deaths(limit))
  }

  async fn liveness_counts(&self) -> Result<LivenessCounts, Error> {
    let state = self.state.read().await;
    let game = state.as_ref().ok_or(Error::NotInitialized)?;
    Ok(game.liveness_counts())
  }

  async fn admin_report(&self) -> Result<Vec<AdminRow>, Error> {
    let state = self.state.read().await;
    let game = state.as_ref().ok_or(Error::NotInitialized)?;
    Ok(game.admin_report())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::player::Player;

  fn pair() -> Vec<Player> {
    ["a", "b"]
      .iter()
      .enumerate()
      .map(|(i, id)| Player {
        id:        PlayerId::from(*id),
        name:      id.to_uppercase(),
        secret:    format!("{id}-word"),
        target_id: PlayerId::from(["b", "a"][i]),
        alive:     true,
        last_will: None,
      })
      .collect()
  }

  #[tokio::test]
  async fn init_twice_fails() {
    let store = MemoryStore::new();
    store.init_game(GameMode::Regular, pair()).await.unwrap();
    let err = store.init_game(GameMode::Regular, pair()).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyInitialized));
  }

  #[tokio::test]
  async fn reads_before_init_fail() {
    let store = MemoryStore::new();
    assert!(matches!(
      store.liveness_counts().await.unwrap_err(),
      Error::NotInitialized
    ));
  }

  #[tokio::test]
  async fn report_flows_through_the_lock() {
    let store = MemoryStore::new();
    store.init_game(GameMode::Regular, pair()).await.unwrap();

    let outcome = store
      .report_elimination(EliminationReport {
        killer_id: "a".into(),
        victim_id: "b".into(),
        proof:     None,
        location:  None,
      })
      .await
      .unwrap();
    assert!(matches!(outcome, EliminationOutcome::Victory));

    let counts = store.liveness_counts().await.unwrap();
    assert_eq!((counts.alive, counts.dead), (1, 1));
  }
}
