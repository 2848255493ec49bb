//! The three storage seams the engine depends on.
//!
//! These traits allow the engine to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests); a fault-injecting
//! wrapper lives in the testkit.

use std::sync::Arc;

use async_trait::async_trait;
use tally_core::{Polarity, TargetRef, UserId, Vote, VoteId, VoteKey};

use crate::error::Result;

/// The user attribute under which the reputation counter is stored.
pub const REPUTATION_ATTR: &str = "reputation";

/// CRUD access to individual vote records.
///
/// # Design Notes
///
/// - **One vote per key**: implementations enforce at most one record per
///   (voter, target) key. [`create`](VoteStore::create) returns
///   `StoreError::Conflict` on a duplicate; the caller re-reads and
///   re-plans rather than assuming its view was current.
/// - **Idempotent delete**: deleting an id that no longer exists is
///   success, not an error. Retries after a partial prior failure must not
///   fail the whole operation.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Look up the vote for a key. The three-field equality lookup
    /// (voter, target kind, target id); never fails except on transport.
    async fn find(&self, key: &VoteKey) -> Result<Option<Vote>>;

    /// Create a vote record. Fails with `Conflict` if a record for the
    /// same key already exists.
    async fn create(&self, voter: &UserId, target: &TargetRef, polarity: Polarity)
        -> Result<Vote>;

    /// Delete a vote record by id. Idempotent.
    async fn delete(&self, id: &VoteId) -> Result<()>;

    /// All votes currently cast on a target. Backs the per-target tally
    /// read query.
    async fn list_for_target(&self, target: &TargetRef) -> Result<Vec<Vote>>;

    /// Full scan of all vote records. Auditor use only; off the hot path.
    async fn list_all(&self) -> Result<Vec<Vote>>;
}

/// Read/adjust of the per-user reputation counter.
///
/// The counter is stored as the `"reputation"` attribute of the user's
/// profile. It is a best-effort counter: `apply_delta` reads the current
/// stored value and writes back the sum, so concurrent deltas to the same
/// counter may race by at most one unit. Drift self-heals via the auditor.
#[async_trait]
pub trait ReputationLedger: Send + Sync {
    /// Current counter value. A missing counter reads as 0.
    async fn counter(&self, user: &UserId) -> Result<i64>;

    /// Adjust the counter by `delta` against the current stored value.
    /// Returns the new value.
    async fn apply_delta(&self, user: &UserId, delta: i64) -> Result<i64>;

    /// Overwrite the counter. Reserved for the auditor's repair pass;
    /// everything else goes through `apply_delta`.
    async fn set_counter(&self, user: &UserId, value: i64) -> Result<()>;
}

/// Maps a target to its owning author.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// The author of a question or answer. Fails with `NotFound` if the
    /// target no longer exists.
    async fn author_of(&self, target: &TargetRef) -> Result<UserId>;
}

// One backend value is typically shared across all three seams; these
// blanket impls make `Arc<Backend>` usable wherever a seam is expected.

#[async_trait]
impl<T: VoteStore + ?Sized> VoteStore for Arc<T> {
    async fn find(&self, key: &VoteKey) -> Result<Option<Vote>> {
        (**self).find(key).await
    }

    async fn create(
        &self,
        voter: &UserId,
        target: &TargetRef,
        polarity: Polarity,
    ) -> Result<Vote> {
        (**self).create(voter, target, polarity).await
    }

    async fn delete(&self, id: &VoteId) -> Result<()> {
        (**self).delete(id).await
    }

    async fn list_for_target(&self, target: &TargetRef) -> Result<Vec<Vote>> {
        (**self).list_for_target(target).await
    }

    async fn list_all(&self) -> Result<Vec<Vote>> {
        (**self).list_all().await
    }
}

#[async_trait]
impl<T: ReputationLedger + ?Sized> ReputationLedger for Arc<T> {
    async fn counter(&self, user: &UserId) -> Result<i64> {
        (**self).counter(user).await
    }

    async fn apply_delta(&self, user: &UserId, delta: i64) -> Result<i64> {
        (**self).apply_delta(user, delta).await
    }

    async fn set_counter(&self, user: &UserId, value: i64) -> Result<()> {
        (**self).set_counter(user, value).await
    }
}

#[async_trait]
impl<T: TargetResolver + ?Sized> TargetResolver for Arc<T> {
    async fn author_of(&self, target: &TargetRef) -> Result<UserId> {
        (**self).author_of(target).await
    }
}
