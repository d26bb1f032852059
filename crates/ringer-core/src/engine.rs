//! The elimination engine — the state machine over the hunting ring.
//!
//! Invariant maintained by every transition: the `target_id` edges of the
//! living players form exactly one cycle visiting every living player. An
//! accepted elimination is an O(1) edge-contraction on that cycle (drop the
//! victim's node, splice their outgoing edge onto the killer), so the
//! invariant is preserved without any global recomputation. A rejected
//! report leaves the state untouched.
//!
//! [`plan_elimination`] holds the full precondition cascade and is shared by
//! [`GameState`] and the storage backends, so the rules live in one place no
//! matter where the player records do.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  kill::{Kill, Location},
  player::{GameMode, Player, PlayerId},
  view::{
    AdminRow, DeathRow, KillView, LeaderboardRow, LivenessCounts, PlayerView,
  },
};

// ─── Reports and outcomes ────────────────────────────────────────────────────

/// An elimination claim, as it arrives from the reporting player.
#[derive(Debug, Clone)]
pub struct EliminationReport {
  pub killer_id: PlayerId,
  pub victim_id: PlayerId,
  /// The victim's secret, presented as proof. Required in word mode,
  /// ignored otherwise.
  pub proof:     Option<String>,
  pub location:  Option<Location>,
}

/// What an accepted elimination produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EliminationOutcome {
  /// The ring contracted; the killer hunts the victim's former target now.
  Eliminated {
    next_target_name:   String,
    next_target_secret: String,
  },
  /// The killer inherited themselves: sole survivor, game over.
  Victory,
}

/// The effects of an accepted report, computed before anything mutates.
#[derive(Debug, Clone)]
pub struct Transition {
  /// The victim's former target — the killer's new one.
  pub next_target_id: PlayerId,
  /// True when the killer inherits themselves (ring of size 1).
  pub victory:        bool,
}

// ─── Precondition cascade ────────────────────────────────────────────────────

/// Validate an elimination report against the two player records involved
/// and produce the transition to apply. Mutates nothing.
///
/// Checks run in a fixed order so overlapping failures resolve
/// deterministically: game over, unknown ids, dead reporter, dead victim,
/// wrong target, bad proof.
///
/// The dead-reporter check exists because a dead killer's frozen `target_id`
/// can still point at a living player; without it, such a report would pass
/// the target check and sever the victim's edge from the ring.
pub fn plan_elimination(
  mode: GameMode,
  num_alive: usize,
  killer: Option<&Player>,
  victim: Option<&Player>,
  report: &EliminationReport,
) -> Result<Transition> {
  if num_alive <= 1 {
    return Err(Error::GameOver);
  }
  let killer =
    killer.ok_or_else(|| Error::UnknownPlayer(report.killer_id.clone()))?;
  let victim =
    victim.ok_or_else(|| Error::UnknownPlayer(report.victim_id.clone()))?;
  if !killer.alive {
    return Err(Error::ReporterDead(killer.id.clone()));
  }
  if !victim.alive {
    return Err(Error::VictimNotAlive(victim.id.clone()));
  }
  if killer.target_id != victim.id {
    return Err(Error::NotYourTarget {
      killer: killer.id.clone(),
      victim: victim.id.clone(),
    });
  }
  if mode.requires_proof() {
    match report.proof.as_deref() {
      Some(proof) if proof == victim.secret => {}
      _ => return Err(Error::ProofMismatch),
    }
  }

  let next_target_id = victim.target_id.clone();
  let victory = next_target_id == killer.id;
  Ok(Transition { next_target_id, victory })
}

// ─── GameState ───────────────────────────────────────────────────────────────

/// The full in-memory game: every player record plus the append-only kill
/// log.
///
/// Transitions take `&mut self`, so exclusive access during the critical
/// section is a compile-time property for a single owner; shared-state
/// callers wrap the state in an async `RwLock` (see [`crate::store`]).
#[derive(Debug, Clone)]
pub struct GameState {
  mode:      GameMode,
  players:   HashMap<PlayerId, Player>,
  kills:     Vec<Kill>,
  num_alive: usize,
}

impl GameState {
  /// Start a game from a freshly built roster.
  ///
  /// The roster is trusted to be [`crate::roster::build_roster`] output:
  /// unique ids, a single target cycle, everyone alive.
  pub fn new(mode: GameMode, roster: Vec<Player>) -> Self {
    let num_alive = roster.iter().filter(|p| p.alive).count();
    let players = roster.into_iter().map(|p| (p.id.clone(), p)).collect();
    Self { mode, players, kills: Vec::new(), num_alive }
  }

  pub fn mode(&self) -> GameMode { self.mode }

  pub fn kills(&self) -> &[Kill] { &self.kills }

  pub fn player(&self, id: &PlayerId) -> Option<&Player> {
    self.players.get(id)
  }

  /// The sole survivor, once only one player remains.
  pub fn winner(&self) -> Option<&Player> {
    if self.num_alive != 1 {
      return None;
    }
    self.players.values().find(|p| p.alive)
  }

  // ── Transitions ───────────────────────────────────────────────────────

  /// Apply one elimination report.
  ///
  /// All five effects (victim dead, killer retargeted, kill appended, count
  /// decremented, outcome computed) happen together or not at all; any
  /// rejection returns before the first mutation.
  pub fn report_elimination(
    &mut self,
    report: &EliminationReport,
    now: DateTime<Utc>,
  ) -> Result<EliminationOutcome> {
    let plan = plan_elimination(
      self.mode,
      self.num_alive,
      self.players.get(&report.killer_id),
      self.players.get(&report.victim_id),
      report,
    )?;

    // Resolve the outcome's display fields before mutating so a missing
    // record cannot leave a half-applied transition behind.
    let outcome = if plan.victory {
      EliminationOutcome::Victory
    } else {
      let next = self
        .players
        .get(&plan.next_target_id)
        .ok_or_else(|| Error::UnknownPlayer(plan.next_target_id.clone()))?;
      EliminationOutcome::Eliminated {
        next_target_name:   next.name.clone(),
        next_target_secret: next.secret.clone(),
      }
    };

    let victim = self
      .players
      .get_mut(&report.victim_id)
      .ok_or_else(|| Error::UnknownPlayer(report.victim_id.clone()))?;
    victim.alive = false;

    let killer = self
      .players
      .get_mut(&report.killer_id)
      .ok_or_else(|| Error::UnknownPlayer(report.killer_id.clone()))?;
    killer.target_id = plan.next_target_id;

    self.num_alive -= 1;
    self.kills.push(Kill {
      killer_id: report.killer_id.clone(),
      victim_id: report.victim_id.clone(),
      time:      now,
      location:  report.location,
    });

    Ok(outcome)
  }

  /// Replace a player's last will. `None` clears it.
  pub fn set_last_will(
    &mut self,
    id: &PlayerId,
    last_will: Option<String>,
  ) -> Result<()> {
    let player = self
      .players
      .get_mut(id)
      .ok_or_else(|| Error::UnknownPlayer(id.clone()))?;
    player.last_will = last_will;
    Ok(())
  }

  // ── Queries ───────────────────────────────────────────────────────────

  pub fn liveness_counts(&self) -> LivenessCounts {
    LivenessCounts {
      alive: self.num_alive as u32,
      dead:  (self.players.len() - self.num_alive) as u32,
    }
  }

  /// A player's dashboard view, or `None` for an unknown id.
  pub fn player_view(&self, id: &PlayerId) -> Option<PlayerView> {
    let player = self.players.get(id)?;
    let target = self.players.get(&player.target_id)?;

    let recent_kills = self
      .kills
      .iter()
      .rev()
      .filter(|k| k.killer_id == *id)
      .map(|k| KillView {
        victim_name: self
          .players
          .get(&k.victim_id)
          .map(|v| v.name.clone())
          .unwrap_or_default(),
        time:        k.time,
      })
      .collect();

    Some(PlayerView {
      id:            player.id.clone(),
      alive:         player.alive,
      target_name:   target.name.clone(),
      target_secret: target.secret.clone(),
      recent_kills,
    })
  }

  /// Top killers, descending by count (ties by name). Players with no kills
  /// are omitted, as on the original scoreboard.
  pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardRow> {
    let mut counts: HashMap<&PlayerId, u32> = HashMap::new();
    for kill in &self.kills {
      *counts.entry(&kill.killer_id).or_default() += 1;
    }

    let mut rows: Vec<LeaderboardRow> = counts
      .into_iter()
      .filter_map(|(id, kill_count)| {
        let player = self.players.get(id)?;
        Some(LeaderboardRow {
          name: player.name.clone(),
          alive: player.alive,
          kill_count,
        })
      })
      .collect();

    rows.sort_by(|a, b| {
      b.kill_count.cmp(&a.kill_count).then_with(|| a.name.cmp(&b.name))
    });
    rows.truncate(limit);
    rows
  }

  /// The most recent deaths, newest first.
  pub fn recent_deaths(&self, limit: usize) -> Vec<DeathRow> {
    self
      .kills
      .iter()
      .rev()
      .take(limit)
      .map(|k| DeathRow {
        name: self
          .players
          .get(&k.victim_id)
          .map(|v| v.name.clone())
          .unwrap_or_default(),
        time: k.time,
      })
      .collect()
  }

  /// The gamemaster report: one row per player, sorted by name.
  pub fn admin_report(&self) -> Vec<AdminRow> {
    let mut rows: Vec<AdminRow> = self
      .players
      .values()
      .map(|player| {
        let last_kill =
          self.kills.iter().rev().find(|k| k.killer_id == player.id);
        AdminRow {
          id:            player.id.clone(),
          name:          player.name.clone(),
          target_name:   self
            .players
            .get(&player.target_id)
            .map(|t| t.name.clone()),
          secret:        player.secret.clone(),
          alive:         player.alive,
          kill_count:    self
            .kills
            .iter()
            .filter(|k| k.killer_id == player.id)
            .count() as u32,
          last_victim:   last_kill.and_then(|k| {
            self.players.get(&k.victim_id).map(|v| v.name.clone())
          }),
          last_activity: last_kill.map(|k| k.time),
          last_location: last_kill.and_then(|k| k.location),
          last_will:     player.last_will.clone(),
        }
      })
      .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
  }

  /// Walk the ring from `start` by following `target_id` edges until the
  /// walk closes. Returns the visited ids in hunt order, or an empty list
  /// when `start` is dead. Never memoize this — the ring mutates on every
  /// elimination.
  pub fn hunting_ring(&self, start: &PlayerId) -> Result<Vec<PlayerId>> {
    let mut current = self
      .players
      .get(start)
      .ok_or_else(|| Error::UnknownPlayer(start.clone()))?;
    if !current.alive {
      return Ok(Vec::new());
    }

    let mut ring = vec![current.id.clone()];
    loop {
      let next = self
        .players
        .get(&current.target_id)
        .ok_or_else(|| Error::UnknownPlayer(current.target_id.clone()))?;
      // The length guard keeps a corrupted edge set from looping forever.
      if next.id == *start || ring.len() > self.players.len() {
        break;
      }
      ring.push(next.id.clone());
      current = next;
    }
    Ok(ring)
  }
}
