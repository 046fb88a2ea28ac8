//! SQL schema for the Tiers SQLite store.
//!
//! Executed once at connection startup. Existing rows are kept across
//! restarts; wiping them is an explicit `reset()`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- AUTOINCREMENT keeps ids from being reused after a delete or a reset.
CREATE TABLE IF NOT EXISTS value_entity (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS goal_entity (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS metric_entity (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Association rows carry no payload. Deleting either endpoint removes the
-- row but never the entity on the other side.
CREATE TABLE IF NOT EXISTS goal_value_link (
    goal_id  INTEGER NOT NULL REFERENCES goal_entity(id)  ON DELETE CASCADE,
    value_id INTEGER NOT NULL REFERENCES value_entity(id) ON DELETE CASCADE,
    PRIMARY KEY (goal_id, value_id)
);

CREATE TABLE IF NOT EXISTS metric_goal_link (
    metric_id INTEGER NOT NULL REFERENCES metric_entity(id) ON DELETE CASCADE,
    goal_id   INTEGER NOT NULL REFERENCES goal_entity(id)   ON DELETE CASCADE,
    PRIMARY KEY (metric_id, goal_id)
);

CREATE INDEX IF NOT EXISTS goal_value_link_value_idx ON goal_value_link(value_id);
CREATE INDEX IF NOT EXISTS metric_goal_link_goal_idx ON metric_goal_link(goal_id);

PRAGMA user_version = 1;
";
