//! SQL schema for the Taskboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Rows are never deleted. `seq` is the registration order.
CREATE TABLE IF NOT EXISTS participants (
    seq           INTEGER PRIMARY KEY,
    identity      TEXT    NOT NULL UNIQUE,
    name          TEXT    NOT NULL,
    contact       TEXT    NOT NULL,
    registered_at TEXT    NOT NULL,   -- ISO 8601 UTC
    active        INTEGER NOT NULL,
    score         INTEGER NOT NULL DEFAULT 0,
    completed     INTEGER NOT NULL DEFAULT 0
);

-- record_id is dense from 0 and assigned by the store, never reused.
CREATE TABLE IF NOT EXISTS records (
    record_id    INTEGER PRIMARY KEY,
    title        TEXT    NOT NULL,
    description  TEXT    NOT NULL,
    category     INTEGER NOT NULL CHECK (category BETWEEN 1 AND 12),
    assignee     TEXT    NOT NULL REFERENCES participants(identity),
    status       TEXT    NOT NULL,   -- RecordStatus, snake_case
    created_at   TEXT    NOT NULL,
    completed_at TEXT,
    verified_at  TEXT,
    submission   TEXT    NOT NULL DEFAULT '',
    feedback     TEXT    NOT NULL DEFAULT '',
    points       INTEGER NOT NULL CHECK (points >= 0)
);

-- Append-only notification log.
CREATE TABLE IF NOT EXISTS events (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT    NOT NULL,   -- discriminant of EventKind
    participant TEXT    NOT NULL,
    record_id   INTEGER,
    data_json   TEXT    NOT NULL,   -- JSON payload (inner data only)
    recorded_at TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS records_assignee_idx   ON records(assignee, record_id);
CREATE INDEX IF NOT EXISTS events_participant_idx ON events(participant);

PRAGMA user_version = 1;
";
