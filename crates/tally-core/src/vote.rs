//! Vote records and the per-(voter, target) logical state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Polarity, TargetRef, UserId, VoteId};

/// The uniqueness key for a vote: at most one [`Vote`] exists per key at
/// any time. Absence of a record means "no vote cast".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteKey {
    pub voter: UserId,
    pub target: TargetRef,
}

impl VoteKey {
    pub fn new(voter: impl Into<UserId>, target: TargetRef) -> Self {
        Self {
            voter: voter.into(),
            target,
        }
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.voter, self.target)
    }
}

/// One user's current opinion on one piece of content.
///
/// Created when a user first votes on a target; the record is deleted (or
/// deleted and re-created with the other polarity) on subsequent actions by
/// the same voter on the same target. Never mutated by anyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Store-assigned record id.
    pub id: VoteId,
    pub voter: UserId,
    pub target: TargetRef,
    pub polarity: Polarity,
}

impl Vote {
    /// The uniqueness key of this record.
    pub fn key(&self) -> VoteKey {
        VoteKey {
            voter: self.voter.clone(),
            target: self.target.clone(),
        }
    }
}

/// The logical state of a (voter, target) pair.
///
/// Modeled as an explicit three-state enum rather than an `Option` compared
/// loosely, so that a same-polarity re-cast reads as a toggle-off and a
/// polarity switch reads as exactly that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteState {
    NoVote,
    Up,
    Down,
}

impl VoteState {
    /// The polarity of the active vote, if any.
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            VoteState::NoVote => None,
            VoteState::Up => Some(Polarity::Up),
            VoteState::Down => Some(Polarity::Down),
        }
    }

    /// The reputation contribution of this state: +1, -1, or 0.
    pub fn effect(&self) -> i64 {
        self.polarity().map_or(0, |p| p.effect())
    }
}

impl From<Option<Polarity>> for VoteState {
    fn from(polarity: Option<Polarity>) -> Self {
        match polarity {
            None => VoteState::NoVote,
            Some(Polarity::Up) => VoteState::Up,
            Some(Polarity::Down) => VoteState::Down,
        }
    }
}

impl From<Polarity> for VoteState {
    fn from(polarity: Polarity) -> Self {
        VoteState::from(Some(polarity))
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoteState::NoVote => "none",
            VoteState::Up => "up",
            VoteState::Down => "down",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;

    fn sample_vote() -> Vote {
        Vote {
            id: VoteId::from("v_1"),
            voter: UserId::from("u_1"),
            target: TargetRef::new(TargetKind::Answer, "a_1"),
            polarity: Polarity::Up,
        }
    }

    #[test]
    fn test_vote_key() {
        let vote = sample_vote();
        let key = vote.key();
        assert_eq!(key.voter, vote.voter);
        assert_eq!(key.target, vote.target);
        assert_eq!(key.to_string(), "u_1@answer/a_1");
    }

    #[test]
    fn test_state_from_polarity() {
        assert_eq!(VoteState::from(None), VoteState::NoVote);
        assert_eq!(VoteState::from(Some(Polarity::Up)), VoteState::Up);
        assert_eq!(VoteState::from(Some(Polarity::Down)), VoteState::Down);
    }

    #[test]
    fn test_state_effect() {
        assert_eq!(VoteState::NoVote.effect(), 0);
        assert_eq!(VoteState::Up.effect(), 1);
        assert_eq!(VoteState::Down.effect(), -1);
    }
}
