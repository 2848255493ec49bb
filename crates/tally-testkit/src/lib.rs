//! # Tally Testkit
//!
//! Testing utilities for the Tally engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ready-made in-memory world with a coordinator and
//!   auditor wired to one shared backend
//! - **Fault injection**: store wrappers that fail the Nth operation with
//!   a transport error, for drift-and-repair and degraded-switch tests
//! - **Generators**: proptest strategies for cast sequences, plus a pure
//!   model that replays the transition table for comparison
//!
//! ## Fixtures
//!
//! ```rust,no_run
//! use tally_testkit::fixtures::TestWorld;
//! use tally::Polarity;
//!
//! # async fn example() {
//! let world = TestWorld::new();
//! let author = TestWorld::user("author");
//! let answer = world.answer_by(&author);
//!
//! let outcome = world
//!     .coordinator
//!     .cast_vote(&TestWorld::user("voter"), &answer, Polarity::Up)
//!     .await
//!     .unwrap();
//! # }
//! ```
//!
//! ## Fault injection
//!
//! ```rust,ignore
//! // Fail the first reputation delta, then observe and repair the drift.
//! let ledger = FlakyLedger::failing_delta(backend.clone(), 1);
//! let coordinator = Coordinator::new(backend.clone(), ledger, backend.clone());
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;

pub use faults::{FlakyLedger, FlakyVotes};
pub use fixtures::TestWorld;
pub use generators::{cast_script, polarity, replay, ModelState};
