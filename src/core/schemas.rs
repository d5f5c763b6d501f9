//! Database schema definitions for the karma store.
//!
//! The bot keeps a single SQLite database with one table keyed by the
//! normalized (lowercased) name. Net karma is always derived, never stored.

pub const KARMA_DB_NAME: &str = "karmadb.sqlite";

pub const KARMA_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS karma (
        name TEXT PRIMARY KEY,
        plusplus INTEGER NOT NULL DEFAULT 0,
        minusminus INTEGER NOT NULL DEFAULT 0
    )
";

pub const AUDIT_LOG_NAME: &str = "broker.events.jsonl";
