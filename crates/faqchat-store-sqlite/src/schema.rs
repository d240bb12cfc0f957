//! SQL schema for the faqchat SQLite store.
//!
//! Executed once at connection startup. Schema migration is out of scope;
//! `PRAGMA user_version` records the layout for when it is needed.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Exchanges are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS chat_exchanges (
    exchange_id TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    intent      TEXT NOT NULL DEFAULT '',  -- reserved; always empty today
    created_at  TEXT NOT NULL              -- RFC 3339 UTC, fixed precision
);

CREATE TABLE IF NOT EXISTS faq_questions (
    faq_id   INTEGER PRIMARY KEY,
    question TEXT NOT NULL,
    answer   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profile_preferences (
    user_id  TEXT NOT NULL,
    question TEXT NOT NULL,   -- preference key, e.g. 'profession'
    answer   TEXT NOT NULL,
    UNIQUE (user_id, question)
);

CREATE INDEX IF NOT EXISTS chat_exchanges_user_idx
    ON chat_exchanges(user_id, created_at);

PRAGMA user_version = 1;
";
