//! Database Migrations
//!
//! Schema definitions for the SQLite item store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema: items with scores, per-domain ids",
    up: MIGRATION_V1_UP,
}];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    knowledge TEXT NOT NULL,
    id INTEGER NOT NULL,

    -- JSON payloads
    contents TEXT NOT NULL,
    similar_ids TEXT NOT NULL DEFAULT '[]',

    -- Memory strength
    short_score REAL NOT NULL DEFAULT 0.0,
    long_score REAL NOT NULL DEFAULT 0.0,
    last_asked INTEGER NOT NULL DEFAULT 0,

    enabled INTEGER NOT NULL DEFAULT 1,

    PRIMARY KEY (knowledge, id)
);

CREATE INDEX IF NOT EXISTS idx_items_enabled ON items(knowledge, enabled);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
