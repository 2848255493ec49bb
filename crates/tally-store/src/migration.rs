//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system. Each migration transforms the
//! schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::ids::now_millis;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tracing::debug!(version, "applied schema migration");

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Vote records: one row per active vote
        CREATE TABLE votes (
            vote_id TEXT PRIMARY KEY,         -- store-assigned opaque id
            voter_id TEXT NOT NULL,
            target_kind TEXT NOT NULL,        -- 'question' | 'answer'
            target_id TEXT NOT NULL,
            polarity TEXT NOT NULL,           -- 'up' | 'down'
            cast_at INTEGER NOT NULL,         -- Unix ms

            UNIQUE(voter_id, target_kind, target_id)
        );

        -- Votable content: target -> owning author
        CREATE TABLE targets (
            target_kind TEXT NOT NULL,
            target_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,

            PRIMARY KEY (target_kind, target_id)
        );

        -- User attributes; the reputation counter is the 'reputation' row
        CREATE TABLE user_attrs (
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,              -- JSON-encoded
            updated_at INTEGER NOT NULL,

            PRIMARY KEY (user_id, name)
        );

        -- Indexes for common queries
        CREATE INDEX idx_votes_target ON votes(target_kind, target_id);
        CREATE INDEX idx_votes_voter ON votes(voter_id);
        CREATE INDEX idx_targets_author ON targets(author_id);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"votes".to_string()));
        assert!(tables.contains(&"targets".to_string()));
        assert!(tables.contains(&"user_attrs".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }
}
