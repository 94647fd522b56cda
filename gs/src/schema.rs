//! Database schema definitions.

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Full DDL for the goal store database.
pub const CREATE_SCHEMA: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Goal domains; id is the sole join key, no surrogate key
CREATE TABLE IF NOT EXISTS domains (
    id         TEXT PRIMARY KEY,
    label      TEXT NOT NULL,
    color      TEXT NOT NULL DEFAULT '',
    bg         TEXT NOT NULL DEFAULT '',
    icon       TEXT NOT NULL DEFAULT '',
    win        TEXT NOT NULL DEFAULT '',
    status     TEXT NOT NULL DEFAULT '',
    urgency    TEXT NOT NULL DEFAULT 'MEDIUM',
    days       INTEGER NOT NULL DEFAULT 0,
    progress   INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Append-only chat log; rows are never updated or deleted
CREATE TABLE IF NOT EXISTS chat_history (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    role       TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Time-spent entries per day
CREATE TABLE IF NOT EXISTS daily_logs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    date          TEXT NOT NULL,
    domain_id     TEXT REFERENCES domains(id),
    minutes_spent INTEGER NOT NULL DEFAULT 0,
    notes         TEXT,
    created_at    TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_chat_created ON chat_history(created_at);
CREATE INDEX IF NOT EXISTS idx_logs_date ON daily_logs(date);
"#;
