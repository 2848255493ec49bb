//! SQLite implementation of the storage seams.
//!
//! The primary persistent backend. Uses rusqlite with bundled SQLite,
//! wrapped in async via `tokio::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use async_trait::async_trait;
use tally_core::{Polarity, TargetKind, TargetRef, UserId, Vote, VoteId, VoteKey};

use crate::error::{Result, StoreError};
use crate::ids::{fresh_id, now_millis};
use crate::migration;
use crate::traits::{ReputationLedger, TargetResolver, VoteStore, REPUTATION_ATTR};

/// SQLite-based backend implementing all three storage seams.
///
/// Thread-safe via an internal Mutex. All operations run on the blocking
/// pool to avoid stalling the async runtime.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Transport(format!("mutex poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Transport(format!("spawn_blocking failed: {e}")))?
    }

    /// Register a question owned by `author`; returns its id.
    pub async fn insert_question(&self, author: &UserId) -> Result<TargetRef> {
        self.insert_target(TargetKind::Question, author).await
    }

    /// Register an answer owned by `author`; returns its id.
    pub async fn insert_answer(&self, author: &UserId) -> Result<TargetRef> {
        self.insert_target(TargetKind::Answer, author).await
    }

    /// Remove a target, modeling content deleted out from under a vote.
    /// Existing vote records on the target are left in place.
    pub async fn remove_target(&self, target: &TargetRef) -> Result<()> {
        let target = target.clone();
        self.blocking(move |conn| {
            conn.execute(
                "DELETE FROM targets WHERE target_kind = ?1 AND target_id = ?2",
                params![target.kind.as_str(), target.id.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn insert_target(&self, kind: TargetKind, author: &UserId) -> Result<TargetRef> {
        let author = author.clone();
        let target = TargetRef::new(kind, fresh_id());
        let inserted = target.clone();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO targets (target_kind, target_id, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    inserted.kind.as_str(),
                    inserted.id.as_str(),
                    author.as_str(),
                    now_millis()
                ],
            )?;
            Ok(())
        })
        .await?;
        Ok(target)
    }
}

/// Decode a vote row; column order: vote_id, voter_id, target_kind,
/// target_id, polarity.
fn row_to_vote(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_vote(raw: (String, String, String, String, String)) -> Result<Vote> {
    let (vote_id, voter_id, target_kind, target_id, polarity) = raw;
    Ok(Vote {
        id: VoteId::from(vote_id),
        voter: UserId::from(voter_id),
        target: TargetRef::new(TargetKind::parse(&target_kind)?, target_id),
        polarity: Polarity::parse(&polarity)?,
    })
}

const SELECT_VOTE: &str = "SELECT vote_id, voter_id, target_kind, target_id, polarity FROM votes";

#[async_trait]
impl VoteStore for SqliteBackend {
    async fn find(&self, key: &VoteKey) -> Result<Option<Vote>> {
        let key = key.clone();
        self.blocking(move |conn| {
            let raw = conn
                .query_row(
                    &format!(
                        "{SELECT_VOTE} WHERE voter_id = ?1 AND target_kind = ?2 AND target_id = ?3"
                    ),
                    params![
                        key.voter.as_str(),
                        key.target.kind.as_str(),
                        key.target.id.as_str()
                    ],
                    row_to_vote,
                )
                .optional()?;
            raw.map(decode_vote).transpose()
        })
        .await
    }

    async fn create(
        &self,
        voter: &UserId,
        target: &TargetRef,
        polarity: Polarity,
    ) -> Result<Vote> {
        let vote = Vote {
            id: VoteId::from(fresh_id()),
            voter: voter.clone(),
            target: target.clone(),
            polarity,
        };
        let inserted = vote.clone();
        self.blocking(move |conn| {
            let result = conn.execute(
                "INSERT INTO votes (vote_id, voter_id, target_kind, target_id, polarity, cast_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    inserted.id.as_str(),
                    inserted.voter.as_str(),
                    inserted.target.kind.as_str(),
                    inserted.target.id.as_str(),
                    inserted.polarity.as_str(),
                    now_millis()
                ],
            );
            match result {
                Ok(_) => Ok(()),
                // The UNIQUE(voter_id, target_kind, target_id) index caught
                // a duplicate key.
                Err(e) if is_constraint_violation(&e) => Err(StoreError::Conflict {
                    key: inserted.key().to_string(),
                }),
                Err(e) => Err(e.into()),
            }
        })
        .await?;
        Ok(vote)
    }

    async fn delete(&self, id: &VoteId) -> Result<()> {
        let id = id.clone();
        self.blocking(move |conn| {
            // Zero rows affected means the record was already gone; that is
            // success, not an error.
            conn.execute("DELETE FROM votes WHERE vote_id = ?1", params![id.as_str()])?;
            Ok(())
        })
        .await
    }

    async fn list_for_target(&self, target: &TargetRef) -> Result<Vec<Vote>> {
        let target = target.clone();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_VOTE} WHERE target_kind = ?1 AND target_id = ?2"
            ))?;
            let raw = stmt
                .query_map(
                    params![target.kind.as_str(), target.id.as_str()],
                    row_to_vote,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            raw.into_iter().map(decode_vote).collect()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Vote>> {
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(SELECT_VOTE)?;
            let raw = stmt
                .query_map([], row_to_vote)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            raw.into_iter().map(decode_vote).collect()
        })
        .await
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

fn read_counter(conn: &Connection, user: &UserId) -> Result<i64> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM user_attrs WHERE user_id = ?1 AND name = ?2",
            params![user.as_str(), REPUTATION_ATTR],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(json) => serde_json::from_str::<serde_json::Value>(&json)
            .ok()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                StoreError::Corrupt(format!("non-numeric reputation attribute: {json}"))
            }),
    }
}

fn write_counter(conn: &Connection, user: &UserId, value: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO user_attrs (user_id, name, value, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, name) DO UPDATE SET value = ?3, updated_at = ?4",
        params![
            user.as_str(),
            REPUTATION_ATTR,
            value.to_string(),
            now_millis()
        ],
    )?;
    Ok(())
}

#[async_trait]
impl ReputationLedger for SqliteBackend {
    async fn counter(&self, user: &UserId) -> Result<i64> {
        let user = user.clone();
        self.blocking(move |conn| read_counter(conn, &user)).await
    }

    async fn apply_delta(&self, user: &UserId, delta: i64) -> Result<i64> {
        let user = user.clone();
        self.blocking(move |conn| {
            // Read-modify-write within one transaction: the adjustment is
            // against stored truth, never a client-cached value.
            let tx = conn.transaction()?;
            let next = read_counter(&tx, &user)? + delta;
            write_counter(&tx, &user, next)?;
            tx.commit()?;
            Ok(next)
        })
        .await
    }

    async fn set_counter(&self, user: &UserId, value: i64) -> Result<()> {
        let user = user.clone();
        self.blocking(move |conn| write_counter(conn, &user, value))
            .await
    }
}

#[async_trait]
impl TargetResolver for SqliteBackend {
    async fn author_of(&self, target: &TargetRef) -> Result<UserId> {
        let target = target.clone();
        self.blocking(move |conn| {
            let author: Option<String> = conn
                .query_row(
                    "SELECT author_id FROM targets WHERE target_kind = ?1 AND target_id = ?2",
                    params![target.kind.as_str(), target.id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            author
                .map(UserId::from)
                .ok_or_else(|| StoreError::NotFound(target.to_string()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::from(name)
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");

        let store = SqliteBackend::open(&path).unwrap();
        let target = store.insert_question(&user("author")).await.unwrap();
        store
            .create(&user("voter"), &target, Polarity::Up)
            .await
            .unwrap();
        drop(store);

        // Reopen: data survives, migrations are idempotent.
        let store = SqliteBackend::open(&path).unwrap();
        let key = VoteKey::new(user("voter"), target);
        let vote = store.find(&key).await.unwrap().unwrap();
        assert_eq!(vote.polarity, Polarity::Up);
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let store = SqliteBackend::open_memory().unwrap();
        let target = store.insert_answer(&user("author")).await.unwrap();

        store
            .create(&user("voter"), &target, Polarity::Up)
            .await
            .unwrap();
        let err = store
            .create(&user("voter"), &target, Polarity::Down)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SqliteBackend::open_memory().unwrap();
        let target = store.insert_answer(&user("author")).await.unwrap();
        let vote = store
            .create(&user("voter"), &target, Polarity::Down)
            .await
            .unwrap();

        store.delete(&vote.id).await.unwrap();
        store.delete(&vote.id).await.unwrap();

        let key = VoteKey::new(user("voter"), target);
        assert!(store.find(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_counter_roundtrip() {
        let store = SqliteBackend::open_memory().unwrap();
        let u = user("author");

        assert_eq!(store.counter(&u).await.unwrap(), 0);
        assert_eq!(store.apply_delta(&u, 2).await.unwrap(), 2);
        assert_eq!(store.apply_delta(&u, -3).await.unwrap(), -1);
        store.set_counter(&u, 7).await.unwrap();
        assert_eq!(store.counter(&u).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_author_resolution() {
        let store = SqliteBackend::open_memory().unwrap();
        let target = store.insert_question(&user("author")).await.unwrap();

        assert_eq!(store.author_of(&target).await.unwrap(), user("author"));

        store.remove_target(&target).await.unwrap();
        assert!(matches!(
            store.author_of(&target).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_for_target() {
        let store = SqliteBackend::open_memory().unwrap();
        let a = store.insert_answer(&user("author")).await.unwrap();
        let b = store.insert_answer(&user("author")).await.unwrap();

        store.create(&user("u1"), &a, Polarity::Up).await.unwrap();
        store.create(&user("u2"), &a, Polarity::Down).await.unwrap();
        store.create(&user("u1"), &b, Polarity::Up).await.unwrap();

        assert_eq!(store.list_for_target(&a).await.unwrap().len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }
}
