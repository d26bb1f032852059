//! HTTP server assembly for the ringer game.
//!
//! Mounts the player-facing API at `/api` and the Basic-auth-gated
//! gamemaster routes at `/admin`, with request tracing over the whole tree.

pub mod auth;
pub mod import;
pub mod notify;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use ringer_api::AppState;
use ringer_core::store::GameStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use notify::Delivery;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (and the
/// `RINGER_*` environment).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub db_path:             PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,

  /// Scoreboard rows shown when a request names no limit.
  #[serde(default = "defaults::stats_row_limit")]
  pub stats_row_limit: usize,

  #[serde(default)]
  pub notify_delivery: Delivery,
  #[serde(default = "defaults::sendmail_path")]
  pub sendmail_path:   PathBuf,
  /// Mail domain appended to player ids, `id@domain`.
  #[serde(default = "defaults::email_domain")]
  pub email_domain:    String,
  #[serde(default = "defaults::email_sender")]
  pub email_sender:    String,
  #[serde(default)]
  pub email_reply_to:  Option<String>,
}

mod defaults {
  use std::path::PathBuf;

  pub fn stats_row_limit() -> usize { ringer_api::DEFAULT_STATS_ROW_LIMIT }

  pub fn sendmail_path() -> PathBuf { PathBuf::from("/usr/sbin/sendmail") }

  pub fn email_domain() -> String { "localhost".to_string() }

  pub fn email_sender() -> String {
    "Gamemaster <gamemaster@localhost>".to_string()
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn app<S>(state: AppState<S>, auth_config: Arc<AuthConfig>) -> Router
where
  S: GameStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", ringer_api::api_router(state.clone()))
    .nest(
      "/admin",
      ringer_api::admin_router(state).layer(middleware::from_fn_with_state(
        auth_config,
        auth::require_admin,
      )),
    )
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
