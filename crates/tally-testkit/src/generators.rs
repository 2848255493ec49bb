//! Proptest strategies and a pure replay model.
//!
//! The model replays the transition table over a cast sequence, producing
//! the expected final state and net delta. Property tests compare the
//! engine's observable effects against it.

use proptest::prelude::*;

use tally_core::{plan, Polarity, VoteState};

/// Strategy producing a single polarity.
pub fn polarity() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::Up), Just(Polarity::Down)]
}

/// Strategy producing a sequence of casts by one voter on one target.
pub fn cast_script(max_len: usize) -> impl Strategy<Value = Vec<Polarity>> {
    proptest::collection::vec(polarity(), 0..=max_len)
}

/// The expected observable effect of a replayed cast sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelState {
    /// Final logical state of the (voter, target) pair.
    pub state: VoteState,
    /// Net reputation delta applied to the target's author.
    pub net_delta: i64,
}

/// Replay a cast sequence through the transition table.
pub fn replay(script: &[Polarity]) -> ModelState {
    let mut state = VoteState::NoVote;
    let mut net_delta = 0i64;
    for &requested in script {
        let t = plan(state, requested);
        state = t.next;
        net_delta += t.delta;
    }
    ModelState { state, net_delta }
}
