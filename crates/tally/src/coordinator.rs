//! The vote coordinator: orchestrates the vote state transition.
//!
//! A cast resolves the target's author, looks up current truth, plans the
//! transition, applies the vote-record mutation, and then applies the
//! reputation delta - in that order. The vote records are the source of
//! truth; the counter may lag transiently after a partial failure and is
//! reconciled by the [`Auditor`](crate::Auditor).

use tally_core::{plan, Polarity, TargetRef, UserId, Vote, VoteAction, VoteKey, VoteState};
use tally_store::{ReputationLedger, StoreError, TargetResolver, VoteStore};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How many times a cast is attempted when duplicate-key races are
    /// observed, before surfacing `Contention`.
    pub max_attempts: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// The result of a cast, returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOutcome {
    /// The logical state of the (voter, target) pair after the cast.
    pub state: VoteState,
    /// The reputation delta applied to the target's author.
    pub delta_applied: i64,
}

/// Aggregate vote counts for one target.
///
/// Computed as a read query over the vote records, never maintained as a
/// second counter - aggregate counts are read-heavy, write-light, and
/// tolerant of eventual consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetTally {
    pub up: u64,
    pub down: u64,
    /// `up - down`, as displayed next to the target.
    pub score: i64,
}

/// Orchestrates vote state transitions across the three storage seams.
///
/// Owns no data: the vote store owns record existence, the ledger owns the
/// counter value. The coordinator owns only the transition logic keeping
/// the two consistent.
pub struct Coordinator<V, L, R> {
    votes: V,
    ledger: L,
    resolver: R,
    config: CoordinatorConfig,
}

impl<V, L, R> Coordinator<V, L, R>
where
    V: VoteStore,
    L: ReputationLedger,
    R: TargetResolver,
{
    /// Create a coordinator with the default configuration.
    pub fn new(votes: V, ledger: L, resolver: R) -> Self {
        Self::with_config(votes, ledger, resolver, CoordinatorConfig::default())
    }

    pub fn with_config(votes: V, ledger: L, resolver: R, config: CoordinatorConfig) -> Self {
        Self {
            votes,
            ledger,
            resolver,
            config,
        }
    }

    /// Record `voter`'s cast of `requested` on `target` and keep the target
    /// author's reputation counter consistent with it.
    ///
    /// A same-polarity re-cast retracts the vote ("click again to
    /// retract"); an opposite-polarity cast switches it. See
    /// [`tally_core::plan`] for the full table.
    ///
    /// # Errors
    ///
    /// - [`EngineError::TargetGone`] - the target no longer exists; nothing
    ///   was changed.
    /// - [`EngineError::Contention`] - concurrent casts on the same key
    ///   exhausted the retry budget.
    /// - [`EngineError::Store`] - a store call failed; the vote records are
    ///   never left inconsistent with themselves, but the counter may lag
    ///   until the auditor runs.
    pub async fn cast_vote(
        &self,
        voter: &UserId,
        target: &TargetRef,
        requested: Polarity,
    ) -> Result<CastOutcome> {
        // Resolve the author first: a gone target aborts with no state
        // change.
        let author = match self.resolver.author_of(target).await {
            Ok(author) => author,
            Err(StoreError::NotFound(_)) => {
                warn!(%voter, %target, "vote on a target that no longer exists");
                return Err(EngineError::TargetGone {
                    target: target.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let key = VoteKey::new(voter.clone(), target.clone());
        let mut attempts = 0;

        let transition = loop {
            attempts += 1;

            // Re-read current truth immediately before acting; no state is
            // cached across attempts.
            let existing = self.votes.find(&key).await?;
            let current = VoteState::from(existing.as_ref().map(|v| v.polarity));
            let transition = plan(current, requested);

            match self
                .apply_action(voter, target, existing.as_ref(), transition.action)
                .await
            {
                Ok(()) => break transition,
                Err(StoreError::Conflict { key }) if attempts < self.config.max_attempts => {
                    // Another cast won the race to create. Re-read and
                    // re-plan from fresh state.
                    debug!(%key, attempts, "duplicate-key race, retrying from fresh state");
                }
                Err(StoreError::Conflict { key }) => {
                    warn!(%key, attempts, "retry budget exhausted");
                    return Err(EngineError::Contention { attempts });
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Vote record committed; now the derived counter. A failure here
        // leaves the counter transiently stale, which the auditor repairs.
        match self.ledger.apply_delta(&author, transition.delta).await {
            Ok(new_value) => {
                debug!(
                    %voter,
                    %target,
                    %author,
                    state = %transition.next,
                    delta = transition.delta,
                    counter = new_value,
                    "vote cast"
                );
            }
            Err(e) => {
                warn!(
                    %author,
                    delta = transition.delta,
                    error = %e,
                    "vote recorded but reputation delta failed; counter is stale until repair"
                );
                return Err(e.into());
            }
        }

        Ok(CastOutcome {
            state: transition.next,
            delta_applied: transition.delta,
        })
    }

    /// Current aggregate counts for a target.
    pub async fn tally(&self, target: &TargetRef) -> Result<TargetTally> {
        let votes = self.votes.list_for_target(target).await?;
        let up = votes
            .iter()
            .filter(|v| v.polarity == Polarity::Up)
            .count() as u64;
        let down = votes.len() as u64 - up;
        Ok(TargetTally {
            up,
            down,
            score: up as i64 - down as i64,
        })
    }

    /// The voter's current logical state on a target.
    pub async fn state_of(&self, voter: &UserId, target: &TargetRef) -> Result<VoteState> {
        let key = VoteKey::new(voter.clone(), target.clone());
        let existing = self.votes.find(&key).await?;
        Ok(VoteState::from(existing.map(|v| v.polarity)))
    }

    /// Apply the planned store mutation. Delete-then-create ordering is
    /// load-bearing: the delete must complete before the create starts, so
    /// the records are never inconsistent with themselves.
    async fn apply_action(
        &self,
        voter: &UserId,
        target: &TargetRef,
        existing: Option<&Vote>,
        action: VoteAction,
    ) -> tally_store::Result<()> {
        match action {
            VoteAction::Create(polarity) => {
                self.votes.create(voter, target, polarity).await?;
            }
            VoteAction::Retract => {
                if let Some(vote) = existing {
                    self.votes.delete(&vote.id).await?;
                }
            }
            VoteAction::Switch(polarity) => {
                if let Some(vote) = existing {
                    self.votes.delete(&vote.id).await?;
                }
                if let Err(e) = self.votes.create(voter, target, polarity).await {
                    // The delete already landed, so the logical state has
                    // degraded to no-vote - a safe state. Surface the error
                    // and let the caller (or auditor) run a corrective pass.
                    warn!(%voter, %target, error = %e, "switch interrupted after delete; state degraded to no-vote");
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
