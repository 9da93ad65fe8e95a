//! SQL schema for the castwatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subscriptions (
    subscriber_id TEXT NOT NULL,
    subject_query TEXT NOT NULL,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    UNIQUE (subscriber_id, subject_query)
);

-- Append-only. Idempotence of recording rests on the UNIQUE constraint;
-- media_kind is informational and not part of it.
CREATE TABLE IF NOT EXISTS seen_releases (
    subject_query TEXT NOT NULL,
    work_id       TEXT NOT NULL,
    media_kind    TEXT NOT NULL,   -- 'movie' | 'show'
    title         TEXT NOT NULL,
    release_date  TEXT NOT NULL,   -- YYYY-MM-DD
    recorded_at   TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    UNIQUE (subject_query, work_id)
);

CREATE INDEX IF NOT EXISTS subscriptions_subject_idx ON subscriptions(subject_query);

PRAGMA user_version = 1;
";
