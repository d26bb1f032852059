//! [`SqliteStore`] — the SQLite implementation of [`GameStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use ringer_core::{
  Error as CoreError,
  engine::{EliminationOutcome, EliminationReport, plan_elimination},
  player::{GameMode, Player, PlayerId},
  store::GameStore,
  view::{AdminRow, DeathRow, LeaderboardRow, LivenessCounts, PlayerView},
};

use crate::{
  Error, Result,
  encode::{
    RawAdminRow, RawKillView, RawPlayerView, decode_mode, encode_dt,
    encode_location, encode_mode,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A game store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// funnels through that one connection, which is what serialises elimination
/// transitions against each other and against reads.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Fetch one full player record; `None` if the id is unknown.
fn get_player(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<Player>> {
  conn
    .query_row(
      "SELECT player_id, name, secret, target_id, alive, last_will
       FROM players WHERE player_id = ?1",
      rusqlite::params![id],
      |row| {
        Ok(Player {
          id:        PlayerId::from(row.get::<_, String>(0)?),
          name:      row.get(1)?,
          secret:    row.get(2)?,
          target_id: PlayerId::from(row.get::<_, String>(3)?),
          alive:     row.get(4)?,
          last_will: row.get(5)?,
        })
      },
    )
    .optional()
}

fn count_alive(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM players WHERE alive = 1", [], |r| {
    r.get(0)
  })
}

/// The stored game mode, or `None` before initialisation.
fn get_mode_raw(conn: &rusqlite::Connection) -> rusqlite::Result<Option<String>> {
  conn
    .query_row("SELECT mode FROM game WHERE id = 1", [], |r| r.get(0))
    .optional()
}

fn mode_from_sql(s: &str) -> rusqlite::Result<GameMode> {
  decode_mode(s).map_err(|_| {
    rusqlite::Error::FromSqlConversionFailure(
      0,
      rusqlite::types::Type::Text,
      format!("unknown game mode: {s:?}").into(),
    )
  })
}

// ─── GameStore impl ──────────────────────────────────────────────────────────

impl GameStore for SqliteStore {
  type Error = Error;

  async fn init_game(
    &self,
    mode: GameMode,
    roster: Vec<Player>,
  ) -> Result<()> {
    let mode_str = encode_mode(mode).to_owned();
    let created_at = encode_dt(Utc::now());

    let done: ringer_core::Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // The roster's target references are circular, so no insertion
        // order can satisfy the foreign key row-by-row; enforce at commit.
        tx.execute_batch("PRAGMA defer_foreign_keys = ON")?;

        let existing: i64 =
          tx.query_row("SELECT COUNT(*) FROM game", [], |r| r.get(0))?;
        if existing > 0 {
          return Ok(Err(CoreError::AlreadyInitialized));
        }

        tx.execute(
          "INSERT INTO game (id, mode, created_at) VALUES (1, ?1, ?2)",
          rusqlite::params![mode_str, created_at],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO players
               (player_id, name, secret, target_id, alive, last_will)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for player in &roster {
            stmt.execute(rusqlite::params![
              player.id.as_str(),
              player.name,
              player.secret,
              player.target_id.as_str(),
              player.alive,
              player.last_will,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    done.map_err(Error::Core)
  }

  async fn game_mode(&self) -> Result<GameMode> {
    let raw: Option<String> =
      self.conn.call(|conn| Ok(get_mode_raw(conn)?)).await?;
    match raw {
      Some(s) => decode_mode(&s),
      None => Err(Error::Core(CoreError::NotInitialized)),
    }
  }

  async fn report_elimination(
    &self,
    report: EliminationReport,
  ) -> Result<EliminationOutcome> {
    let now_str = encode_dt(Utc::now());

    let planned: ringer_core::Result<EliminationOutcome> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let mode = match get_mode_raw(&tx)? {
          Some(s) => mode_from_sql(&s)?,
          None => return Ok(Err(CoreError::NotInitialized)),
        };
        let num_alive = count_alive(&tx)? as usize;
        let killer = get_player(&tx, report.killer_id.as_str())?;
        let victim = get_player(&tx, report.victim_id.as_str())?;

        let plan = match plan_elimination(
          mode,
          num_alive,
          killer.as_ref(),
          victim.as_ref(),
          &report,
        ) {
          Ok(plan) => plan,
          Err(rejection) => return Ok(Err(rejection)),
        };

        // Resolve the outcome's display fields before writing anything.
        let outcome = if plan.victory {
          EliminationOutcome::Victory
        } else {
          tx.query_row(
            "SELECT name, secret FROM players WHERE player_id = ?1",
            rusqlite::params![plan.next_target_id.as_str()],
            |row| {
              Ok(EliminationOutcome::Eliminated {
                next_target_name:   row.get(0)?,
                next_target_secret: row.get(1)?,
              })
            },
          )?
        };

        let (latitude, longitude) = encode_location(report.location);
        tx.execute(
          "UPDATE players SET alive = 0 WHERE player_id = ?1",
          rusqlite::params![report.victim_id.as_str()],
        )?;
        tx.execute(
          "UPDATE players SET target_id = ?1 WHERE player_id = ?2",
          rusqlite::params![
            plan.next_target_id.as_str(),
            report.killer_id.as_str()
          ],
        )?;
        tx.execute(
          "INSERT INTO kills (killer_id, victim_id, time, latitude, longitude)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            report.killer_id.as_str(),
            report.victim_id.as_str(),
            now_str,
            latitude,
            longitude
          ],
        )?;

        tx.commit()?;
        Ok(Ok(outcome))
      })
      .await?;

    planned.map_err(Error::Core)
  }

  async fn player_view(&self, id: PlayerId) -> Result<Option<PlayerView>> {
    let raw: Option<RawPlayerView> = self
      .conn
      .call(move |conn| {
        let head = conn
          .query_row(
            "SELECT p.player_id, p.alive, t.name, t.secret
             FROM players p JOIN players t ON p.target_id = t.player_id
             WHERE p.player_id = ?1",
            rusqlite::params![id.as_str()],
            |row| {
              Ok(RawPlayerView {
                id:            row.get(0)?,
                alive:         row.get(1)?,
                target_name:   row.get(2)?,
                target_secret: row.get(3)?,
                kills:         Vec::new(),
              })
            },
          )
          .optional()?;

        let Some(mut view) = head else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT v.name, k.time
           FROM kills k JOIN players v ON k.victim_id = v.player_id
           WHERE k.killer_id = ?1
           ORDER BY k.time DESC",
        )?;
        view.kills = stmt
          .query_map(rusqlite::params![id.as_str()], |row| {
            Ok(RawKillView { name: row.get(0)?, time: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(view))
      })
      .await?;

    raw.map(RawPlayerView::into_view).transpose()
  }

  async fn set_last_will(
    &self,
    id: PlayerId,
    last_will: Option<String>,
  ) -> Result<()> {
    let id_param = id.clone();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE players SET last_will = ?1 WHERE player_id = ?2",
          rusqlite::params![last_will, id_param.as_str()],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(CoreError::UnknownPlayer(id)));
    }
    Ok(())
  }

  async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.name, p.alive, COUNT(*) AS kill_count
           FROM kills k JOIN players p ON k.killer_id = p.player_id
           GROUP BY k.killer_id
           ORDER BY kill_count DESC, p.name ASC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit as i64], |row| {
            Ok(LeaderboardRow {
              name:       row.get(0)?,
              alive:      row.get(1)?,
              kill_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn recent_deaths(&self, limit: usize) -> Result<Vec<DeathRow>> {
    let raws: Vec<RawKillView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT v.name, k.time
           FROM kills k JOIN players v ON k.victim_id = v.player_id
           ORDER BY k.time DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit as i64], |row| {
            Ok(RawKillView { name: row.get(0)?, time: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawKillView::into_death_row).collect()
  }

  async fn liveness_counts(&self) -> Result<LivenessCounts> {
    let counts = self
      .conn
      .call(|conn| {
        let alive: u32 = count_alive(conn)? as u32;
        let dead: u32 = conn.query_row(
          "SELECT COUNT(*) FROM players WHERE alive = 0",
          [],
          |r| r.get(0),
        )?;
        Ok(LivenessCounts { alive, dead })
      })
      .await?;
    Ok(counts)
  }

  async fn admin_report(&self) -> Result<Vec<AdminRow>> {
    let raws: Vec<RawAdminRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.player_id, p.name, t.name AS target_name, p.secret,
                  p.alive, COALESCE(s.kill_count, 0) AS kill_count,
                  r.victim_name, r.time, r.latitude, r.longitude,
                  p.last_will
           FROM players p
           LEFT JOIN players t ON p.target_id = t.player_id
           LEFT JOIN (
             SELECT killer_id, COUNT(*) AS kill_count
             FROM kills
             GROUP BY killer_id
           ) s ON p.player_id = s.killer_id
           LEFT JOIN (
             SELECT k1.killer_id, v.name AS victim_name, k1.time,
                    k1.latitude, k1.longitude
             FROM kills k1
             JOIN players v ON k1.victim_id = v.player_id
             WHERE k1.time = (
               SELECT MAX(time) FROM kills k2
               WHERE k2.killer_id = k1.killer_id)
           ) r ON p.player_id = r.killer_id
           GROUP BY p.player_id
           ORDER BY p.name ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAdminRow {
              id:          row.get(0)?,
              name:        row.get(1)?,
              target_name: row.get(2)?,
              secret:      row.get(3)?,
              alive:       row.get(4)?,
              kill_count:  row.get(5)?,
              last_victim: row.get(6)?,
              last_time:   row.get(7)?,
              latitude:    row.get(8)?,
              longitude:   row.get(9)?,
              last_will:   row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAdminRow::into_row).collect()
  }
}
