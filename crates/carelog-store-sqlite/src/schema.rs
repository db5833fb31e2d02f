//! SQL schema for the carelog SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS children (
    child_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    birth_date  TEXT,             -- YYYY-MM-DD or NULL
    created_at  TEXT NOT NULL
);

-- Check-ins are append-only.
CREATE TABLE IF NOT EXISTS check_ins (
    check_in_id  TEXT PRIMARY KEY,
    child_id     INTEGER NOT NULL REFERENCES children(child_id),
    kind         TEXT NOT NULL,   -- discriminant of the Entry variant
    payload_json TEXT NOT NULL,   -- JSON payload (inner data only)
    logged_at    TEXT NOT NULL,   -- RFC 3339 with the caregiver's offset
    local_date   TEXT NOT NULL,   -- YYYY-MM-DD of logged_at in its own offset
    recorded_at  TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

-- One row per child, alert type and analysis date. Rows are never deleted;
-- a dismissed alert only gets deleted_at, and one a later run on the same
-- date no longer raised gets superseded_at.
CREATE TABLE IF NOT EXISTS health_alerts (
    alert_id          TEXT PRIMARY KEY,
    child_id          INTEGER NOT NULL REFERENCES children(child_id),
    alert_type        TEXT NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    severity          TEXT NOT NULL,   -- 'info' | 'warning' | 'error'
    suggestions_json  TEXT NOT NULL DEFAULT '[]',
    analysis_date     TEXT NOT NULL,
    data_period_start TEXT NOT NULL,
    data_period_end   TEXT NOT NULL,
    is_read           INTEGER NOT NULL DEFAULT 0,
    read_at           TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    deleted_at        TEXT,
    superseded_at     TEXT,
    UNIQUE (child_id, alert_type, analysis_date)
);

CREATE INDEX IF NOT EXISTS check_ins_day_idx     ON check_ins(child_id, kind, local_date);
CREATE INDEX IF NOT EXISTS health_alerts_child_idx ON health_alerts(child_id, created_at);

PRAGMA user_version = 1;
";
