//! SQL schema for the vector index file.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per indexed FAQ entry, keyed by the FAQ table's id.
CREATE TABLE IF NOT EXISTS faq_vectors (
    faq_id    INTEGER PRIMARY KEY,
    question  TEXT NOT NULL,
    answer    TEXT NOT NULL,
    dimension INTEGER NOT NULL,
    embedding BLOB NOT NULL     -- little-endian f32 x dimension
);

CREATE TABLE IF NOT EXISTS index_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";

/// `index_meta` key holding the fingerprint of the last build.
pub const FINGERPRINT_KEY: &str = "faq_fingerprint";
