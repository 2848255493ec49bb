//! In-memory implementation of the storage seams.
//!
//! This is primarily for testing. It has the same semantics as the SQLite
//! backend but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use tally_core::{Polarity, TargetRef, UserId, Vote, VoteId, VoteKey};

use crate::error::{Result, StoreError};
use crate::ids::fresh_id;
use crate::traits::{ReputationLedger, TargetResolver, VoteStore, REPUTATION_ATTR};

/// In-memory backend implementing all three storage seams.
///
/// All data is lost when the backend is dropped. Thread-safe via RwLock.
pub struct MemoryBackend {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// Vote records indexed by id.
    votes: HashMap<VoteId, Vote>,

    /// Compound-key index: at most one vote id per (voter, target).
    by_key: HashMap<VoteKey, VoteId>,

    /// User attributes; the reputation counter lives under
    /// [`REPUTATION_ATTR`].
    attrs: HashMap<(UserId, String), Value>,

    /// Votable content: target -> author.
    targets: HashMap<TargetRef, UserId>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
        }
    }

    /// Register a question owned by `author`; returns its id.
    pub fn insert_question(&self, author: &UserId) -> TargetRef {
        self.insert_target(TargetRef::question(fresh_id()), author)
    }

    /// Register an answer owned by `author`; returns its id.
    pub fn insert_answer(&self, author: &UserId) -> TargetRef {
        self.insert_target(TargetRef::answer(fresh_id()), author)
    }

    /// Remove a target, modeling content deleted out from under a vote.
    /// Existing vote records on the target are left in place.
    pub fn remove_target(&self, target: &TargetRef) {
        let mut inner = self.inner.write().unwrap();
        inner.targets.remove(target);
    }

    fn insert_target(&self, target: TargetRef, author: &UserId) -> TargetRef {
        let mut inner = self.inner.write().unwrap();
        inner.targets.insert(target.clone(), author.clone());
        target
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoteStore for MemoryBackend {
    async fn find(&self, key: &VoteKey) -> Result<Option<Vote>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .by_key
            .get(key)
            .and_then(|id| inner.votes.get(id))
            .cloned())
    }

    async fn create(
        &self,
        voter: &UserId,
        target: &TargetRef,
        polarity: Polarity,
    ) -> Result<Vote> {
        let mut inner = self.inner.write().unwrap();

        let key = VoteKey::new(voter.clone(), target.clone());
        if inner.by_key.contains_key(&key) {
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }

        let vote = Vote {
            id: VoteId::from(fresh_id()),
            voter: voter.clone(),
            target: target.clone(),
            polarity,
        };
        inner.by_key.insert(key, vote.id.clone());
        inner.votes.insert(vote.id.clone(), vote.clone());
        Ok(vote)
    }

    async fn delete(&self, id: &VoteId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(vote) = inner.votes.remove(id) {
            inner.by_key.remove(&vote.key());
        }
        // Absent id: already deleted, success.
        Ok(())
    }

    async fn list_for_target(&self, target: &TargetRef) -> Result<Vec<Vote>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .votes
            .values()
            .filter(|v| &v.target == target)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Vote>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.votes.values().cloned().collect())
    }
}

#[async_trait]
impl ReputationLedger for MemoryBackend {
    async fn counter(&self, user: &UserId) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(read_counter(&inner, user))
    }

    async fn apply_delta(&self, user: &UserId, delta: i64) -> Result<i64> {
        let mut inner = self.inner.write().unwrap();
        let next = read_counter(&inner, user) + delta;
        inner
            .attrs
            .insert((user.clone(), REPUTATION_ATTR.to_string()), next.into());
        Ok(next)
    }

    async fn set_counter(&self, user: &UserId, value: i64) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .attrs
            .insert((user.clone(), REPUTATION_ATTR.to_string()), value.into());
        Ok(())
    }
}

fn read_counter(inner: &MemoryInner, user: &UserId) -> i64 {
    inner
        .attrs
        .get(&(user.clone(), REPUTATION_ATTR.to_string()))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

#[async_trait]
impl TargetResolver for MemoryBackend {
    async fn author_of(&self, target: &TargetRef) -> Result<UserId> {
        let inner = self.inner.read().unwrap();
        inner
            .targets
            .get(target)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(target.to_string()))
    }
}
