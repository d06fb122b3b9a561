//! Numbered schema migrations, embedded at compile time and tracked in the
//! `schema_version` table. Each migration runs exactly once.

use crate::error::{LeadgenError, Result};
use rusqlite::Connection;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/001_baseline.sql"),
}];

fn ensure_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| LeadgenError::Migration(format!("cannot create schema_version: {e}")))
}

pub(crate) fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| LeadgenError::Migration(format!("cannot read schema version: {e}")))
}

/// Apply every pending migration. Returns how many ran.
pub(crate) fn run_migrations(conn: &Connection) -> Result<usize> {
    ensure_schema_version_table(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
    if current > max_known {
        return Err(LeadgenError::Migration(format!(
            "database schema version {current} is newer than this build supports ({max_known})"
        )));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    for migration in &pending {
        conn.execute_batch(migration.sql).map_err(|e| {
            LeadgenError::Migration(format!("migration v{} failed: {e}", migration.version))
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| {
            LeadgenError::Migration(format!("cannot record migration v{}: {e}", migration.version))
        })?;
        tracing::debug!(version = migration.version, "applied schema migration");
    }

    Ok(pending.len())
}
