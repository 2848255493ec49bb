//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: one shared in-memory backend
//! behind a coordinator and an auditor.

use std::sync::Arc;

use tally::{Auditor, Coordinator};
use tally_core::{TargetRef, UserId};
use tally_store::MemoryBackend;

/// The backend type shared across all three engine seams in tests.
pub type SharedBackend = Arc<MemoryBackend>;

/// A test fixture: an in-memory backend with a coordinator and auditor
/// wired to it.
pub struct TestWorld {
    pub backend: SharedBackend,
    pub coordinator: Coordinator<SharedBackend, SharedBackend, SharedBackend>,
    pub auditor: Auditor<SharedBackend, SharedBackend, SharedBackend>,
}

impl TestWorld {
    /// Create a fresh world with default coordinator configuration.
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let coordinator =
            Coordinator::new(backend.clone(), backend.clone(), backend.clone());
        let auditor = Auditor::new(backend.clone(), backend.clone(), backend.clone());
        Self {
            backend,
            coordinator,
            auditor,
        }
    }

    /// Shorthand for a user id.
    pub fn user(name: &str) -> UserId {
        UserId::from(name)
    }

    /// Register a question owned by `author`.
    pub fn question_by(&self, author: &UserId) -> TargetRef {
        self.backend.insert_question(author)
    }

    /// Register an answer owned by `author`.
    pub fn answer_by(&self, author: &UserId) -> TargetRef {
        self.backend.insert_answer(author)
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
