//! Roster construction: the random circular target chain.
//!
//! Built once at game setup. The entrant list is shuffled uniformly and each
//! player is assigned the next player in the shuffled order as their target,
//! the last wrapping around to the first, so the full roster forms a single
//! cycle. Secrets are dealt from a separately shuffled pool; the two draws
//! are intentionally independent of each other.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom as _;

use crate::{
  Error, Result,
  player::{Player, PlayerId},
};

/// A registrant, before any game state attaches to them.
#[derive(Debug, Clone)]
pub struct Entrant {
  pub id:   PlayerId,
  pub name: String,
}

impl Entrant {
  pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }
}

/// Build the initial roster: a uniformly random circular permutation of the
/// entrants, everyone alive, one secret per player.
///
/// Fails without drawing any randomness if the entrant list is empty, any id
/// is empty or duplicated, or fewer secrets than entrants are supplied.
///
/// Pure apart from consuming `rng`; persisting the result is the caller's
/// concern.
pub fn build_roster(
  entrants: Vec<Entrant>,
  secrets: Vec<String>,
  rng: &mut impl Rng,
) -> Result<Vec<Player>> {
  if entrants.is_empty() {
    return Err(Error::EmptyRoster);
  }
  if secrets.len() < entrants.len() {
    return Err(Error::NotEnoughSecrets {
      players: entrants.len(),
      secrets: secrets.len(),
    });
  }

  let mut seen = HashSet::new();
  for entrant in &entrants {
    if entrant.id.is_empty() {
      return Err(Error::EmptyId);
    }
    if !seen.insert(entrant.id.clone()) {
      return Err(Error::DuplicateId(entrant.id.clone()));
    }
  }

  let mut order = entrants;
  order.shuffle(rng);

  let mut pool = secrets;
  pool.shuffle(rng);

  let n = order.len();
  let players = order
    .iter()
    .enumerate()
    .map(|(i, entrant)| Player {
      id:        entrant.id.clone(),
      name:      entrant.name.clone(),
      secret:    pool[i].clone(),
      target_id: order[(i + 1) % n].id.clone(),
      alive:     true,
      last_will: None,
    })
    .collect();

  Ok(players)
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::SeedableRng as _;
  use rand_chacha::ChaCha8Rng;

  use super::*;

  fn entrants(n: usize) -> Vec<Entrant> {
    (0..n)
      .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
      .collect()
  }

  fn secrets(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("word-{i}")).collect()
  }

  #[test]
  fn targets_form_a_bijection_without_fixed_points() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let roster = build_roster(entrants(10), secrets(10), &mut rng).unwrap();

    let ids: HashSet<_> = roster.iter().map(|p| p.id.clone()).collect();
    let targets: HashSet<_> = roster.iter().map(|p| p.target_id.clone()).collect();
    assert_eq!(ids, targets);
    assert!(roster.iter().all(|p| p.id != p.target_id));
  }

  #[test]
  fn chain_is_a_single_cycle_over_all_players() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let roster = build_roster(entrants(25), secrets(25), &mut rng).unwrap();

    let by_id: std::collections::HashMap<_, _> =
      roster.iter().map(|p| (p.id.clone(), p)).collect();

    let start = &roster[0].id;
    let mut current = *by_id.get(start).unwrap();
    let mut visited = HashSet::new();
    while visited.insert(current.id.clone()) {
      current = by_id.get(&current.target_id).unwrap();
    }
    // The walk must close at the start, having visited every player.
    assert_eq!(current.id, *start);
    assert_eq!(visited.len(), roster.len());
  }

  #[test]
  fn single_entrant_targets_themselves() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let roster = build_roster(entrants(1), secrets(1), &mut rng).unwrap();
    assert_eq!(roster[0].id, roster[0].target_id);
    assert!(roster[0].alive);
  }

  #[test]
  fn every_player_gets_a_distinct_secret() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let roster = build_roster(entrants(12), secrets(12), &mut rng).unwrap();
    let assigned: HashSet<_> = roster.iter().map(|p| p.secret.clone()).collect();
    assert_eq!(assigned.len(), 12);
  }

  #[test]
  fn surplus_secrets_are_allowed() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let roster = build_roster(entrants(4), secrets(10), &mut rng).unwrap();
    assert_eq!(roster.len(), 4);
  }

  #[test]
  fn empty_roster_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = build_roster(Vec::new(), secrets(3), &mut rng).unwrap_err();
    assert!(matches!(err, Error::EmptyRoster));
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut list = entrants(3);
    list.push(Entrant::new("p1", "Impostor"));
    let err = build_roster(list, secrets(4), &mut rng).unwrap_err();
    assert!(matches!(err, Error::DuplicateId(id) if id.as_str() == "p1"));
  }

  #[test]
  fn empty_id_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let list = vec![Entrant::new("", "Nameless")];
    let err = build_roster(list, secrets(1), &mut rng).unwrap_err();
    assert!(matches!(err, Error::EmptyId));
  }

  #[test]
  fn too_few_secrets_are_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = build_roster(entrants(5), secrets(4), &mut rng).unwrap_err();
    assert!(matches!(
      err,
      Error::NotEnoughSecrets { players: 5, secrets: 4 }
    ));
  }
}
