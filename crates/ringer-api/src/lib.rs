//! JSON REST API for the ringer game.
//!
//! Exposes axum [`Router`]s backed by any [`ringer_core::store::GameStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility; in
//! particular [`admin_router`] must be mounted behind an authentication
//! layer because its rows include player secrets.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .nest("/api", ringer_api::api_router(state.clone()))
//!   .nest("/admin", ringer_api::admin_router(state).layer(auth))
//! ```

pub mod admin;
pub mod eliminations;
pub mod error;
pub mod players;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use ringer_core::{
  engine::EliminationOutcome, player::PlayerId, store::GameStore,
};

pub use error::ApiError;

/// Row count for scoreboard endpoints when no `?limit=` is given.
pub const DEFAULT_STATS_ROW_LIMIT: usize = 10;

// ─── Elimination hook ────────────────────────────────────────────────────────

/// Called after an elimination transition has committed.
///
/// Implementations must not block and must swallow their own failures: the
/// transition is already durable by the time the hook runs, and nothing a
/// notifier does can roll it back.
pub trait EliminationHook: Send + Sync {
  fn on_elimination(&self, killer_id: &PlayerId, outcome: &EliminationOutcome);
}

/// Default hook: does nothing.
pub struct NoopHook;

impl EliminationHook for NoopHook {
  fn on_elimination(&self, _: &PlayerId, _: &EliminationOutcome) {}
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:           Arc<S>,
  pub hook:            Arc<dyn EliminationHook>,
  pub stats_row_limit: usize,
}

impl<S> AppState<S> {
  /// State with no hook and the default scoreboard row limit.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      hook: Arc::new(NoopHook),
      stats_row_limit: DEFAULT_STATS_ROW_LIMIT,
    }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Build the player-facing API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: GameStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/eliminations", post(eliminations::report::<S>))
    .route("/players/{id}", get(players::view::<S>))
    .route("/players/{id}/last-will", put(players::set_last_will::<S>))
    .route("/leaderboard", get(stats::leaderboard::<S>))
    .route("/deaths", get(stats::recent_deaths::<S>))
    .route("/stats", get(stats::summary::<S>))
    .with_state(state)
}

/// Build the gamemaster router. Mount behind auth.
pub fn admin_router<S>(state: AppState<S>) -> Router<()>
where
  S: GameStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/report", get(admin::report::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ringer_core::player::{GameMode, Player, PlayerId};
  use ringer_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  /// A ring in the given order: each id hunts the next, the last the first.
  fn ring(ids: &[&str]) -> Vec<Player> {
    ids
      .iter()
      .enumerate()
      .map(|(i, id)| Player {
        id:        PlayerId::from(*id),
        name:      id.to_uppercase(),
        secret:    format!("{id}-word"),
        target_id: PlayerId::from(ids[(i + 1) % ids.len()]),
        alive:     true,
        last_will: None,
      })
      .collect()
  }

  async fn game_state(ids: &[&str]) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.init_game(GameMode::Regular, ring(ids)).await.unwrap();
    AppState::new(Arc::new(store))
  }

  async fn send(
    router: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router.oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn claim(killer: &str, victim: &str) -> serde_json::Value {
    serde_json::json!({ "killer_id": killer, "victim_id": victim })
  }

  // ── Eliminations ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn report_returns_201_with_next_target() {
    let state = game_state(&["a", "b", "c"]).await;
    let (status, json) = send(
      api_router(state),
      "POST",
      "/eliminations",
      Some(claim("a", "b")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["result"], "eliminated");
    assert_eq!(json["next_target_name"], "C");
    assert_eq!(json["next_target_secret"], "c-word");
  }

  #[tokio::test]
  async fn final_report_returns_victory() {
    let state = game_state(&["a", "b"]).await;
    let (status, json) = send(
      api_router(state),
      "POST",
      "/eliminations",
      Some(claim("a", "b")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["result"], "victory");
  }

  #[tokio::test]
  async fn wrong_target_returns_409() {
    let state = game_state(&["a", "b", "c"]).await;
    let (status, json) = send(
      api_router(state),
      "POST",
      "/eliminations",
      Some(claim("a", "c")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("target"));
  }

  #[tokio::test]
  async fn unknown_killer_returns_404() {
    let state = game_state(&["a", "b"]).await;
    let (status, _) = send(
      api_router(state),
      "POST",
      "/eliminations",
      Some(claim("ghost", "b")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn reports_after_victory_return_410() {
    let state = game_state(&["a", "b"]).await;
    let router = api_router(state);

    let (status, _) = send(
      router.clone(),
      "POST",
      "/eliminations",
      Some(claim("a", "b")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
      send(router, "POST", "/eliminations", Some(claim("a", "b"))).await;
    assert_eq!(status, StatusCode::GONE);
  }

  #[tokio::test]
  async fn half_specified_location_returns_400() {
    let state = game_state(&["a", "b"]).await;
    let mut body = claim("a", "b");
    body["latitude"] = serde_json::json!(37.4275);

    let (status, _) =
      send(api_router(state), "POST", "/eliminations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn hook_fires_after_a_committed_report() {
    struct CountingHook(AtomicUsize);
    impl EliminationHook for CountingHook {
      fn on_elimination(&self, _: &PlayerId, _: &EliminationOutcome) {
        self.0.fetch_add(1, Ordering::SeqCst);
      }
    }

    let hook = Arc::new(CountingHook(AtomicUsize::new(0)));
    let mut state = game_state(&["a", "b", "c"]).await;
    state.hook = hook.clone();
    let router = api_router(state);

    // Rejected report: the hook must not fire.
    send(router.clone(), "POST", "/eliminations", Some(claim("a", "c"))).await;
    assert_eq!(hook.0.load(Ordering::SeqCst), 0);

    send(router, "POST", "/eliminations", Some(claim("a", "b"))).await;
    assert_eq!(hook.0.load(Ordering::SeqCst), 1);
  }

  // ── Players ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn player_view_shows_target_and_404s_unknowns() {
    let state = game_state(&["a", "b", "c"]).await;
    let router = api_router(state);

    let (status, json) = send(router.clone(), "GET", "/players/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["target_name"], "B");
    assert_eq!(json["alive"], true);

    let (status, _) = send(router, "GET", "/players/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn last_will_round_trips_into_the_admin_report() {
    let state = game_state(&["a", "b"]).await;
    let api = api_router(state.clone());
    let admin = admin_router(state);

    let (status, _) = send(
      api,
      "PUT",
      "/players/a/last-will",
      Some(serde_json::json!({ "last_will": "tell my story" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(admin, "GET", "/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], "a");
    assert_eq!(json[0]["last_will"], "tell my story");
  }

  // ── Scoreboards ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_summary_counts_and_ranks() {
    let state = game_state(&["a", "b", "c", "d"]).await;
    let router = api_router(state);

    send(router.clone(), "POST", "/eliminations", Some(claim("a", "b"))).await;
    send(router.clone(), "POST", "/eliminations", Some(claim("a", "c"))).await;

    let (status, json) = send(router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_alive"], 2);
    assert_eq!(json["num_dead"], 2);
    assert_eq!(json["top_scores"][0]["name"], "A");
    assert_eq!(json["top_scores"][0]["kill_count"], 2);
    assert_eq!(json["recent_deaths"][0]["name"], "C");
  }

  #[tokio::test]
  async fn leaderboard_respects_the_limit_param() {
    let state = game_state(&["a", "b", "c", "d"]).await;
    let router = api_router(state);

    send(router.clone(), "POST", "/eliminations", Some(claim("a", "b"))).await;
    send(router.clone(), "POST", "/eliminations", Some(claim("c", "d"))).await;

    let (_, json) = send(router.clone(), "GET", "/leaderboard", None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = send(router, "GET", "/leaderboard?limit=1", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn admin_report_lists_every_player() {
    let state = game_state(&["a", "b", "c"]).await;
    let (status, json) = send(admin_router(state), "GET", "/report", None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    // Secrets are present here and only here.
    assert_eq!(rows[0]["secret"], "a-word");
  }
}
