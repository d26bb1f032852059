//! SQL schema for the ringer SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Exactly one row, written when the roster is imported.
CREATE TABLE IF NOT EXISTS game (
    id         INTEGER PRIMARY KEY CHECK (id = 1),
    mode       TEXT NOT NULL,   -- 'regular' | 'word'
    created_at TEXT NOT NULL    -- ISO 8601 UTC
);

-- Player rows are never deleted; death only flips `alive` and a dead
-- player's target_id is frozen from then on.
CREATE TABLE IF NOT EXISTS players (
    player_id  TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    secret     TEXT NOT NULL,
    target_id  TEXT NOT NULL REFERENCES players(player_id),
    alive      INTEGER NOT NULL DEFAULT 1,
    last_will  TEXT
);

-- Kills are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS kills (
    killer_id  TEXT NOT NULL REFERENCES players(player_id),
    victim_id  TEXT NOT NULL REFERENCES players(player_id),
    time       TEXT NOT NULL,   -- ISO 8601 UTC
    latitude   REAL NOT NULL,   -- -10000 when no location was reported
    longitude  REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS kills_killer_idx ON kills(killer_id);
CREATE INDEX IF NOT EXISTS kills_victim_idx ON kills(victim_id);
CREATE INDEX IF NOT EXISTS kills_time_idx   ON kills(time);

PRAGMA user_version = 1;
";
