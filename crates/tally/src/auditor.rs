//! The consistency auditor: reconciles a counter against the vote records.
//!
//! Not on the hot path. Used by tests and for operational drift correction
//! after a partial failure left a counter behind the vote records.

use tally_core::UserId;
use tally_store::{ReputationLedger, StoreError, TargetResolver, VoteStore};
use tracing::{info, warn};

use crate::error::Result;

/// Recomputes and repairs per-user reputation counters from the vote
/// records, which are the source of truth.
pub struct Auditor<V, L, R> {
    votes: V,
    ledger: L,
    resolver: R,
}

impl<V, L, R> Auditor<V, L, R>
where
    V: VoteStore,
    L: ReputationLedger,
    R: TargetResolver,
{
    pub fn new(votes: V, ledger: L, resolver: R) -> Self {
        Self {
            votes,
            ledger,
            resolver,
        }
    }

    /// The true counter value for `user`: the sum of polarity effects over
    /// all votes whose target `user` authored.
    ///
    /// A vote whose target no longer resolves is an orphan; it contributes
    /// nothing and is reported as an anomaly rather than failing the scan.
    pub async fn recompute(&self, user: &UserId) -> Result<i64> {
        let votes = self.votes.list_all().await?;
        let mut sum = 0i64;

        for vote in votes {
            match self.resolver.author_of(&vote.target).await {
                Ok(author) if &author == user => sum += vote.polarity.effect(),
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    warn!(vote = %vote.id, target = %vote.target, "orphan vote on a deleted target");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(sum)
    }

    /// Recomputed value minus the stored counter. Zero means consistent.
    pub async fn drift(&self, user: &UserId) -> Result<i64> {
        let truth = self.recompute(user).await?;
        let stored = self.ledger.counter(user).await?;
        Ok(truth - stored)
    }

    /// Overwrite the stored counter with the recomputed value. Returns the
    /// value written.
    pub async fn repair(&self, user: &UserId) -> Result<i64> {
        let truth = self.recompute(user).await?;
        let stored = self.ledger.counter(user).await?;

        if truth != stored {
            info!(%user, stored, truth, "repairing drifted reputation counter");
        }
        self.ledger.set_counter(user, truth).await?;
        Ok(truth)
    }
}
