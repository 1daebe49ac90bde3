//! SQL schema for the Fieldbook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `odk_id` carries no UNIQUE constraint on purpose: the XML ingestion path
/// appends a fresh row per request even for a repeated key. De-duplication is
/// the upsert operation's job, not the schema's.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS submissions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    odk_id      TEXT NOT NULL,
    data        TEXT NOT NULL,   -- attribute payload, always JSON text
    geolocation BLOB,            -- EWKB point, SRID 4326, or NULL
    received_at TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS submissions_odk_id_idx ON submissions(odk_id);

PRAGMA user_version = 1;
";
