//! # Tally Store
//!
//! Storage seams for the Tally engine. Provides trait-based interfaces for
//! the three collaborators the engine depends on, with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The engine never talks to a concrete store. It is constructed from three
//! narrow interfaces:
//!
//! - [`VoteStore`] - CRUD over individual vote records, keyed by
//!   (voter, target kind, target id)
//! - [`ReputationLedger`] - read/adjust of the per-user reputation counter
//! - [`TargetResolver`] - maps a target to its owning author
//!
//! [`SqliteBackend`] is the persistent implementation; [`MemoryBackend`]
//! serves tests. One backend value implements all three traits, and the
//! blanket `Arc<T>` impls let it be shared across the engine's seams.
//!
//! ## Semantics
//!
//! - **Compound key**: both backends enforce at most one vote per
//!   (voter, target) key; a duplicate create returns [`StoreError::Conflict`].
//!   Callers still treat duplicates defensively - the conflict-retry loop
//!   lives in the engine, not here.
//! - **Idempotent delete**: deleting an absent vote id succeeds, so a retry
//!   after a partial prior failure cannot fail the whole operation.
//! - **Best-effort counter**: [`ReputationLedger::apply_delta`] is a
//!   read-modify-write against current stored truth, not a linearizable
//!   register across counters.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

mod ids;

pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use traits::{ReputationLedger, TargetResolver, VoteStore, REPUTATION_ATTR};
