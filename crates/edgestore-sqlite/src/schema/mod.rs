//! Schema management and migrations

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{SqliteError, SqliteResult};

/// Schema version - increment when making schema changes
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version > SCHEMA_VERSION {
        return Err(SqliteError::Schema(format!(
            "database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    if current_version < 1 {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

/// Highest applied migration, 0 for a fresh database
pub fn current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: edges table
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1: edges table");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied successfully");
    Ok(())
}

const SCHEMA_V1: &str = r#"
-- One row per (source, destination, relationship type) triple.
-- Endpoint types are denormalised from the URNs so type filters stay index-only.

CREATE TABLE IF NOT EXISTS edges (
    source_urn TEXT NOT NULL,
    source_type TEXT NOT NULL,
    destination_urn TEXT NOT NULL,
    destination_type TEXT NOT NULL,
    relationship_type TEXT NOT NULL,
    properties TEXT NOT NULL DEFAULT '{}',  -- JSON object
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (source_urn, destination_urn, relationship_type)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_edges_source
    ON edges(relationship_type, source_urn);
CREATE INDEX IF NOT EXISTS idx_edges_destination
    ON edges(relationship_type, destination_urn);
CREATE INDEX IF NOT EXISTS idx_edges_source_type
    ON edges(source_type, relationship_type);
CREATE INDEX IF NOT EXISTS idx_edges_destination_type
    ON edges(destination_type, relationship_type);
"#;
