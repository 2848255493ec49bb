//! # Tally Core
//!
//! Pure primitives for the Tally vote engine: identifiers, vote records,
//! and the vote state machine.
//!
//! This crate contains no I/O, no storage, no async. It is pure computation
//! over the vote data model.
//!
//! ## Key Types
//!
//! - [`Vote`] - One user's current opinion on one piece of content
//! - [`VoteKey`] - The uniqueness key (voter, target kind, target id)
//! - [`VoteState`] - The per-(voter, target) logical state: NoVote, Up, Down
//! - [`Transition`] - A planned state transition with its reputation delta
//!
//! ## The transition table
//!
//! The whole engine hangs off [`plan`], which maps (current state, requested
//! polarity) to a store action and a reputation delta. See [`transition`].

pub mod error;
pub mod transition;
pub mod types;
pub mod vote;

pub use error::CoreError;
pub use transition::{plan, Transition, VoteAction};
pub use types::{Polarity, TargetId, TargetKind, TargetRef, UserId, VoteId};
pub use vote::{Vote, VoteKey, VoteState};
