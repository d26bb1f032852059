//! Game setup: build a roster from entrant and secret-word files.
//!
//! The entrants file carries one `id,name` pair per line; the secrets file
//! one word or phrase per line. Blank lines and surrounding whitespace are
//! ignored in both. Shuffling happens here, at import time — the files can
//! be in any order, alphabetical included, without biasing the ring.

use std::path::Path;

use anyhow::Context as _;
use ringer_core::{
  player::GameMode,
  roster::{Entrant, build_roster},
  store::GameStore,
};

pub fn parse_entrants(text: &str) -> anyhow::Result<Vec<Entrant>> {
  lines(text)
    .map(|line| {
      let (id, name) = line.split_once(',').with_context(|| {
        format!("malformed entrant line {line:?}: expected \"id,name\"")
      })?;
      Ok(Entrant::new(id.trim(), name.trim()))
    })
    .collect()
}

pub fn parse_secrets(text: &str) -> Vec<String> {
  lines(text).map(str::to_string).collect()
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
  text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Read both files, build the ring, and write the initial game state.
/// Returns the number of players imported.
pub async fn import_roster<S>(
  store: &S,
  mode: GameMode,
  entrants_path: &Path,
  secrets_path: &Path,
) -> anyhow::Result<usize>
where
  S: GameStore,
{
  let entrants_text = std::fs::read_to_string(entrants_path)
    .with_context(|| format!("failed to read {entrants_path:?}"))?;
  let secrets_text = std::fs::read_to_string(secrets_path)
    .with_context(|| format!("failed to read {secrets_path:?}"))?;

  let entrants = parse_entrants(&entrants_text)?;
  let secrets = parse_secrets(&secrets_text);

  let roster = build_roster(entrants, secrets, &mut rand::thread_rng())
    .context("roster input rejected")?;
  let count = roster.len();

  store
    .init_game(mode, roster)
    .await
    .context("failed to initialise the game")?;
  Ok(count)
}
