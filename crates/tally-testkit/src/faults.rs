//! Fault-injecting wrappers around the storage seams.
//!
//! Each wrapper forwards to an inner implementation but fails one chosen
//! operation with `StoreError::Transport`, modeling a remote call that
//! failed or timed out mid-transition. Used to exercise the partial-failure
//! paths: a stale counter awaiting repair, and a switch degraded to
//! no-vote.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tally_core::{Polarity, TargetRef, UserId, Vote, VoteId, VoteKey};
use tally_store::{ReputationLedger, Result, StoreError, VoteStore};

/// Counts down and reports whether the current call is the chosen one.
struct Countdown(AtomicI64);

impl Countdown {
    fn new(nth: u32) -> Self {
        Self(AtomicI64::new(nth as i64))
    }

    /// True exactly once, on the Nth call.
    fn fires(&self) -> bool {
        self.0.fetch_sub(1, Ordering::SeqCst) == 1
    }
}

fn transport_failure(op: &str) -> StoreError {
    StoreError::Transport(format!("injected fault: {op}"))
}

/// A ledger that fails the Nth `apply_delta` with a transport error, then
/// behaves normally.
pub struct FlakyLedger<L> {
    inner: L,
    countdown: Countdown,
}

impl<L> FlakyLedger<L> {
    /// Fail the `nth` call to `apply_delta` (1-based).
    pub fn failing_delta(inner: L, nth: u32) -> Self {
        Self {
            inner,
            countdown: Countdown::new(nth),
        }
    }
}

#[async_trait]
impl<L: ReputationLedger> ReputationLedger for FlakyLedger<L> {
    async fn counter(&self, user: &UserId) -> Result<i64> {
        self.inner.counter(user).await
    }

    async fn apply_delta(&self, user: &UserId, delta: i64) -> Result<i64> {
        if self.countdown.fires() {
            return Err(transport_failure("apply_delta"));
        }
        self.inner.apply_delta(user, delta).await
    }

    async fn set_counter(&self, user: &UserId, value: i64) -> Result<()> {
        self.inner.set_counter(user, value).await
    }
}

/// A vote store that fails the Nth `create` with a transport error, then
/// behaves normally. Reads and deletes always pass through.
pub struct FlakyVotes<V> {
    inner: V,
    countdown: Countdown,
}

impl<V> FlakyVotes<V> {
    /// Fail the `nth` call to `create` (1-based).
    pub fn failing_create(inner: V, nth: u32) -> Self {
        Self {
            inner,
            countdown: Countdown::new(nth),
        }
    }
}

#[async_trait]
impl<V: VoteStore> VoteStore for FlakyVotes<V> {
    async fn find(&self, key: &VoteKey) -> Result<Option<Vote>> {
        self.inner.find(key).await
    }

    async fn create(
        &self,
        voter: &UserId,
        target: &TargetRef,
        polarity: Polarity,
    ) -> Result<Vote> {
        if self.countdown.fires() {
            return Err(transport_failure("create"));
        }
        self.inner.create(voter, target, polarity).await
    }

    async fn delete(&self, id: &VoteId) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn list_for_target(&self, target: &TargetRef) -> Result<Vec<Vote>> {
        self.inner.list_for_target(target).await
    }

    async fn list_all(&self) -> Result<Vec<Vote>> {
        self.inner.list_all().await
    }
}
