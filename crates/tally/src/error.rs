//! Error types for the engine.

use tally_core::TargetRef;
use tally_store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// `Conflict` never appears here: duplicate-key races are retried
/// internally, bounded, and surface as `Contention` when the budget is
/// exhausted. Everything else propagates; no error is swallowed without a
/// diagnostic record, since silent loss manifests as invisible reputation
/// drift.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The vote target no longer exists. No state was changed.
    #[error("target gone: {target}")]
    TargetGone { target: TargetRef },

    /// The conflict-retry budget was exhausted by concurrent casts on the
    /// same key.
    #[error("vote contention: gave up after {attempts} attempts")]
    Contention { attempts: u32 },

    /// Storage error, including transport failures. Non-idempotent steps
    /// are never silently retried after an unknown outcome.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
