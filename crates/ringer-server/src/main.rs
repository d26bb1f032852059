//! ringer server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite game store, and serves the JSON API. `import-roster` initialises a
//! new game from entrant and secret files.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash` in
//! config.toml:
//!
//! ```text
//! ringer --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use ringer_api::AppState;
use ringer_core::{player::GameMode, store::GameStore as _};
use ringer_server::{ServerConfig, auth::AuthConfig, import, notify::Notifier};
use ringer_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ringer elimination-game server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Build a roster from entrant and secret files and initialise the game.
  ImportRoster {
    /// File with one "id,name" entrant per line.
    #[arg(long)]
    entrants: PathBuf,

    /// File with one secret word or phrase per line.
    #[arg(long)]
    secrets: PathBuf,

    /// Game mode: "regular" or "word".
    #[arg(long, default_value = "regular")]
    mode: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RINGER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store.
  let db_path = expand_tilde(&server_cfg.db_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, store).await,
    Command::ImportRoster { entrants, secrets, mode } => {
      let mode = parse_mode(&mode)?;
      let count =
        import::import_roster(&store, mode, &entrants, &secrets).await?;
      tracing::info!("imported {count} players; the hunt can begin");
      Ok(())
    }
  }
}

async fn serve(config: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  // A game must exist before the API can serve anything useful.
  let mode = store
    .game_mode()
    .await
    .context("no game found; run `ringer import-roster` first")?;

  let notifier = Notifier::from_config(&config, mode);
  let state = AppState {
    store:           Arc::new(store),
    hook:            Arc::new(notifier),
    stats_row_limit: config.stats_row_limit,
  };
  let auth = Arc::new(AuthConfig {
    username:      config.admin_username.clone(),
    password_hash: config.admin_password_hash.clone(),
  });

  let app = ringer_server::app(state, auth);
  let address = format!("{}:{}", config.host, config.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn parse_mode(s: &str) -> anyhow::Result<GameMode> {
  match s {
    "regular" => Ok(GameMode::Regular),
    "word" => Ok(GameMode::Word),
    other => anyhow::bail!("unknown game mode {other:?}"),
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
