//! Property tests for the hunting ring: roster construction and full
//! elimination walks, with the structural invariants checked after every
//! single transition.

use std::collections::{HashMap, HashSet};

use chrono::{TimeZone as _, Utc};
use proptest::prelude::*;
use rand::SeedableRng as _;
use rand_chacha::ChaCha8Rng;
use ringer_core::{
  engine::{EliminationOutcome, EliminationReport, GameState},
  player::{GameMode, Player, PlayerId},
  roster::{Entrant, build_roster},
};

fn roster(n: usize, seed: u64) -> Vec<Player> {
  let entrants = (0..n)
    .map(|i| Entrant::new(format!("p{i}"), format!("Player {i}")))
    .collect();
  let secrets = (0..n).map(|i| format!("word-{i}")).collect();
  let mut rng = ChaCha8Rng::seed_from_u64(seed);
  build_roster(entrants, secrets, &mut rng).expect("valid roster input")
}

/// Living players' targets must form one cycle covering every living player,
/// and no living player may hunt a dead one.
fn assert_ring_invariants(game: &GameState, roster: &[Player]) {
  let living: Vec<&PlayerId> = roster
    .iter()
    .map(|p| &p.id)
    .filter(|id| game.player(id).unwrap().alive)
    .collect();

  // Permutation: living targets are distinct and all point at living players.
  let mut targets = HashSet::new();
  for id in &living {
    let target_id = &game.player(id).unwrap().target_id;
    assert!(
      game.player(target_id).unwrap().alive,
      "{id} hunts the dead player {target_id}"
    );
    assert!(targets.insert(target_id.clone()), "{target_id} hunted twice");
  }

  // Single cycle: a walk from any living player visits all of them.
  if let Some(start) = living.first() {
    let ring = game.hunting_ring(start).unwrap();
    assert_eq!(ring.len(), living.len());
  }

  // Self-targeting is exactly the sole-survivor state.
  let self_loops = living
    .iter()
    .filter(|&&id| game.player(id).unwrap().target_id == *id)
    .count();
  if living.len() == 1 {
    assert_eq!(self_loops, 1);
  } else {
    assert_eq!(self_loops, 0);
  }
}

proptest! {
  /// Roster construction always yields a fixed-point-free circular
  /// permutation (N > 1) assigning every player a distinct target.
  #[test]
  fn built_roster_is_a_circular_permutation(
    n in 2usize..40,
    seed in any::<u64>(),
  ) {
    let roster = roster(n, seed);

    let ids: HashSet<_> = roster.iter().map(|p| p.id.clone()).collect();
    let targets: HashSet<_> =
      roster.iter().map(|p| p.target_id.clone()).collect();
    prop_assert_eq!(&ids, &targets);
    prop_assert!(roster.iter().all(|p| p.id != p.target_id));

    let game = GameState::new(GameMode::Regular, roster.clone());
    assert_ring_invariants(&game, &roster);
  }

  /// Any sequence of valid eliminations keeps the ring intact at every step
  /// and converges to exactly one Victory on the (N-1)th report.
  #[test]
  fn elimination_walks_preserve_the_ring_and_converge(
    n in 1usize..30,
    seed in any::<u64>(),
    picks in prop::collection::vec(any::<prop::sample::Index>(), 40),
  ) {
    let roster = roster(n, seed);
    let mut game = GameState::new(GameMode::Regular, roster.clone());
    let mut dead: HashSet<PlayerId> = HashSet::new();

    for (step, pick) in picks.iter().take(n.saturating_sub(1)).enumerate() {
      // Pick any living player as the reporter; their target is the only
      // victim the engine will accept.
      let living: Vec<&Player> = roster
        .iter()
        .filter(|p| !dead.contains(&p.id))
        .collect();
      let killer = living[pick.index(living.len())];
      let victim_id = game.player(&killer.id).unwrap().target_id.clone();

      let now = Utc.timestamp_opt(1_460_000_000 + step as i64, 0).unwrap();
      let outcome = game
        .report_elimination(
          &EliminationReport {
            killer_id: killer.id.clone(),
            victim_id: victim_id.clone(),
            proof:     None,
            location:  None,
          },
          now,
        )
        .unwrap();

      dead.insert(victim_id);
      assert_ring_invariants(&game, &roster);

      // Alive only ever decreases, by exactly one per accepted report.
      let counts = game.liveness_counts();
      prop_assert_eq!(counts.alive as usize, n - step - 1);
      prop_assert_eq!(counts.dead as usize, step + 1);

      let final_step = step + 1 == n - 1;
      match outcome {
        EliminationOutcome::Victory => prop_assert!(final_step),
        EliminationOutcome::Eliminated { .. } => prop_assert!(!final_step),
      }
    }

    // Terminal state: one survivor, everyone else flagged dead, and the
    // engine refuses any further report.
    prop_assert_eq!(game.liveness_counts().alive, 1);
    let winner = game.winner().unwrap().id.clone();
    let err = game
      .report_elimination(
        &EliminationReport {
          killer_id: winner.clone(),
          victim_id: winner,
          proof:     None,
          location:  None,
        },
        Utc.timestamp_opt(1_460_100_000, 0).unwrap(),
      )
      .unwrap_err();
    prop_assert!(matches!(err, ringer_core::Error::GameOver));
  }
}

#[test]
fn secrets_come_from_the_supplied_pool() {
  let roster = roster(8, 11);
  let pool: HashSet<String> = (0..8).map(|i| format!("word-{i}")).collect();
  let by_player: HashMap<_, _> =
    roster.iter().map(|p| (p.id.clone(), p.secret.clone())).collect();
  assert_eq!(by_player.len(), 8);
  assert!(roster.iter().all(|p| pool.contains(&p.secret)));
}
