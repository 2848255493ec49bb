//! The vote state machine.
//!
//! Maps (current state, requested polarity) to the store action and the
//! reputation delta the coordinator must apply. Pure computation; the
//! coordinator owns re-reading current truth and applying the plan.
//!
//! The full table:
//!
//! | current | requested | action       | delta |
//! |---------|-----------|--------------|-------|
//! | NoVote  | Up        | Create(Up)   | +1    |
//! | NoVote  | Down      | Create(Down) | -1    |
//! | Up      | Up        | Retract      | -1    |
//! | Down    | Down      | Retract      | +1    |
//! | Up      | Down      | Switch(Down) | -2    |
//! | Down    | Up        | Switch(Up)   | +2    |
//!
//! A same-polarity re-cast is a toggle-off ("click again to retract").

use serde::{Deserialize, Serialize};

use crate::types::Polarity;
use crate::vote::VoteState;

/// The store mutation a transition requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteAction {
    /// No existing record: create one with the given polarity.
    Create(Polarity),
    /// Same polarity re-cast: delete the existing record.
    Retract,
    /// Opposite polarity: delete the existing record, then create one with
    /// the given polarity. The delete must complete before the create.
    Switch(Polarity),
}

/// A planned transition: the mutation, the reputation delta to the target's
/// author, and the logical state once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub action: VoteAction,
    pub delta: i64,
    pub next: VoteState,
}

/// Plan the transition for a cast request.
pub fn plan(current: VoteState, requested: Polarity) -> Transition {
    match (current.polarity(), requested) {
        (None, p) => Transition {
            action: VoteAction::Create(p),
            delta: p.effect(),
            next: p.into(),
        },
        (Some(existing), p) if existing == p => Transition {
            action: VoteAction::Retract,
            delta: -existing.effect(),
            next: VoteState::NoVote,
        },
        (Some(existing), p) => Transition {
            action: VoteAction::Switch(p),
            delta: p.effect() - existing.effect(),
            next: p.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_table() {
        use Polarity::{Down, Up};

        let rows = [
            (VoteState::NoVote, Up, VoteAction::Create(Up), 1, VoteState::Up),
            (VoteState::NoVote, Down, VoteAction::Create(Down), -1, VoteState::Down),
            (VoteState::Up, Up, VoteAction::Retract, -1, VoteState::NoVote),
            (VoteState::Down, Down, VoteAction::Retract, 1, VoteState::NoVote),
            (VoteState::Up, Down, VoteAction::Switch(Down), -2, VoteState::Down),
            (VoteState::Down, Up, VoteAction::Switch(Up), 2, VoteState::Up),
        ];

        for (current, requested, action, delta, next) in rows {
            let t = plan(current, requested);
            assert_eq!(t.action, action, "{current:?} + {requested:?}");
            assert_eq!(t.delta, delta, "{current:?} + {requested:?}");
            assert_eq!(t.next, next, "{current:?} + {requested:?}");
        }
    }

    fn any_state() -> impl Strategy<Value = VoteState> {
        prop_oneof![
            Just(VoteState::NoVote),
            Just(VoteState::Up),
            Just(VoteState::Down),
        ]
    }

    fn any_polarity() -> impl Strategy<Value = Polarity> {
        prop_oneof![Just(Polarity::Up), Just(Polarity::Down)]
    }

    proptest! {
        /// The delta always equals the effect of the next state minus the
        /// effect of the current state.
        #[test]
        fn delta_is_effect_difference(current in any_state(), requested in any_polarity()) {
            let t = plan(current, requested);
            prop_assert_eq!(t.delta, t.next.effect() - current.effect());
        }

        /// Casting the polarity the state already holds always retracts.
        #[test]
        fn recast_retracts(p in any_polarity()) {
            let t = plan(p.into(), p);
            prop_assert_eq!(t.action, VoteAction::Retract);
            prop_assert_eq!(t.next, VoteState::NoVote);
            prop_assert_eq!(t.delta, -p.effect());
        }

        /// Replaying any cast sequence, the running delta sum always equals
        /// the effect of the final state.
        #[test]
        fn deltas_track_state(seq in proptest::collection::vec(any_polarity(), 0..32)) {
            let mut state = VoteState::NoVote;
            let mut sum = 0i64;
            for p in seq {
                let t = plan(state, p);
                sum += t.delta;
                state = t.next;
            }
            prop_assert_eq!(sum, state.effect());
        }
    }
}
