//! SQL schema for the sitelog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    code                TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    manager             TEXT NOT NULL DEFAULT '',
    client_manager      TEXT NOT NULL DEFAULT '',
    client              TEXT NOT NULL DEFAULT '',
    contractor          TEXT NOT NULL DEFAULT '',
    report_id_fragment  TEXT NOT NULL DEFAULT '',
    target_completion   TEXT             -- ISO 8601 date or NULL
);

-- section_id is the stable foreign-key target; the slug never changes once
-- other rows reference the section.
CREATE TABLE IF NOT EXISTS sections (
    section_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    project_code      TEXT NOT NULL REFERENCES projects(code),
    slug              TEXT NOT NULL,
    name              TEXT NOT NULL,
    area              TEXT NOT NULL DEFAULT '',
    unit              TEXT NOT NULL DEFAULT '',
    total_qty_planned REAL NOT NULL DEFAULT 0,
    order_index       INTEGER NOT NULL DEFAULT 0,
    UNIQUE (project_code, slug),
    UNIQUE (project_code, name)
);

CREATE TABLE IF NOT EXISTS activities (
    activity_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    project_code      TEXT NOT NULL REFERENCES projects(code),
    section_id        INTEGER NOT NULL REFERENCES sections(section_id),
    description       TEXT NOT NULL,
    area              TEXT NOT NULL DEFAULT '',
    unit              TEXT NOT NULL DEFAULT '',
    total_qty_planned REAL NOT NULL DEFAULT 0,
    order_index       INTEGER NOT NULL DEFAULT 0,
    UNIQUE (project_code, section_id, description)
);

-- One row per (project, date, section, activity). Same-day saves replace
-- the row; history is otherwise append-only. section_id 0 means no catalog
-- section matched at save time.
CREATE TABLE IF NOT EXISTS daily_entries (
    project_code        TEXT NOT NULL,
    report_date         TEXT NOT NULL,   -- ISO 8601 date
    section_id          INTEGER NOT NULL DEFAULT 0,
    description         TEXT NOT NULL,
    planned_today       REAL NOT NULL DEFAULT 0,
    achieved_today      REAL NOT NULL DEFAULT 0,
    planned_cumulative  REAL NOT NULL DEFAULT 0,
    achieved_cumulative REAL NOT NULL DEFAULT 0,
    PRIMARY KEY (project_code, report_date, section_id, description)
);

-- Two independent uniqueness constraints: one report per (project, date),
-- and globally unique report numbers.
CREATE TABLE IF NOT EXISTS submitted_reports (
    report_number TEXT NOT NULL UNIQUE,
    project_code  TEXT NOT NULL,
    report_date   TEXT NOT NULL,   -- ISO 8601 date
    project_name  TEXT NOT NULL DEFAULT '',
    prepared_by   TEXT NOT NULL DEFAULT '',
    checked_by    TEXT NOT NULL DEFAULT '',
    approved_by   TEXT NOT NULL DEFAULT '',
    submitted_at  TEXT NOT NULL,   -- ISO 8601 UTC
    report_data   TEXT NOT NULL,   -- JSON snapshot of the full payload
    PRIMARY KEY (project_code, report_date)
);

CREATE TABLE IF NOT EXISTS report_preparers (
    name         TEXT PRIMARY KEY,
    designation  TEXT NOT NULL DEFAULT '',
    project_code TEXT
);

CREATE TABLE IF NOT EXISTS site_managers (
    name         TEXT PRIMARY KEY,
    designation  TEXT NOT NULL DEFAULT '',
    project_code TEXT
);

CREATE TABLE IF NOT EXISTS contractors (
    name            TEXT NOT NULL,
    project_code    TEXT,
    contact_person  TEXT NOT NULL DEFAULT '',
    contact_details TEXT NOT NULL DEFAULT '',
    UNIQUE (project_code, name)
);

CREATE TABLE IF NOT EXISTS notifications (
    id         INTEGER PRIMARY KEY,   -- creation-time millis, kept monotonic
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL,         -- ISO 8601 UTC
    payload    TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS entries_key_idx
    ON daily_entries(project_code, section_id, description, report_date);
CREATE INDEX IF NOT EXISTS reports_date_idx ON submitted_reports(report_date);

PRAGMA user_version = 1;
";
