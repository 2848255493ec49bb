//! # Tally
//!
//! The vote & reputation consistency engine for a question-and-answer
//! forum: records a user's vote on a question or answer and keeps the
//! content author's derived reputation counter consistent with the set of
//! currently-active votes, over stores that offer only single-record
//! atomic operations.
//!
//! ## Key Concepts
//!
//! - **Vote**: at most one per (voter, target) key. Absence means "no vote
//!   cast"; a same-polarity re-cast retracts.
//! - **Reputation counter**: one integer per user, derived from votes on
//!   their content. Mutated only through the coordinator's delta step.
//! - **Ordering**: the vote-record mutation always lands before the
//!   counter delta, so the records are the source of truth and never
//!   mismatched with themselves. The counter may lag transiently.
//! - **Drift**: a counter left behind by a partial failure; the
//!   [`Auditor`] recomputes and repairs it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tally::Coordinator;
//! use tally::core::{Polarity, UserId};
//! use tally::store::SqliteBackend;
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let backend = Arc::new(SqliteBackend::open("tally.db").unwrap());
//!
//!     let coordinator = Coordinator::new(
//!         backend.clone(),
//!         backend.clone(),
//!         backend.clone(),
//!     );
//!
//!     let voter = UserId::from("u_1");
//!     let answer = backend.insert_answer(&UserId::from("author")).await.unwrap();
//!
//!     let outcome = coordinator
//!         .cast_vote(&voter, &answer, Polarity::Up)
//!         .await
//!         .unwrap();
//!     assert_eq!(outcome.delta_applied, 1);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `tally::core` - Pure primitives (Vote, VoteState, the transition table)
//! - `tally::store` - Storage seams and the SQLite/memory backends

pub mod auditor;
pub mod coordinator;
pub mod error;

// Re-export component crates
pub use tally_core as core;
pub use tally_store as store;

// Re-export main types for convenience
pub use auditor::Auditor;
pub use coordinator::{CastOutcome, Coordinator, CoordinatorConfig, TargetTally};
pub use error::{EngineError, Result};

// Re-export commonly used core types
pub use tally_core::{Polarity, TargetId, TargetKind, TargetRef, UserId, Vote, VoteId, VoteState};
