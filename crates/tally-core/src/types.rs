//! Strong type definitions for the Tally engine.
//!
//! All identifiers are newtypes to prevent misuse at compile time. Ids are
//! opaque strings assigned by the backing store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// View the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_newtype! {
    /// Identity of a user (voter or content author).
    UserId
}

id_newtype! {
    /// Identity of a question or answer.
    TargetId
}

id_newtype! {
    /// Store-assigned identity of a vote record.
    VoteId
}

/// The kind of content a vote lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Question,
    Answer,
}

impl TargetKind {
    /// Stable string encoding, matching the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Question => "question",
            TargetKind::Answer => "answer",
        }
    }

    /// Decode from the stored representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "question" => Ok(TargetKind::Question),
            "answer" => Ok(TargetKind::Answer),
            other => Err(CoreError::InvalidTargetKind(other.to_string())),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Up,
    Down,
}

impl Polarity {
    /// The reputation effect of one active vote of this polarity.
    pub fn effect(&self) -> i64 {
        match self {
            Polarity::Up => 1,
            Polarity::Down => -1,
        }
    }

    /// Stable string encoding, matching the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Up => "up",
            Polarity::Down => "down",
        }
    }

    /// Decode from the stored representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "up" => Ok(Polarity::Up),
            "down" => Ok(Polarity::Down),
            other => Err(CoreError::InvalidPolarity(other.to_string())),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a votable piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: TargetId,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: impl Into<TargetId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a question reference.
    pub fn question(id: impl Into<TargetId>) -> Self {
        Self::new(TargetKind::Question, id)
    }

    /// Shorthand for an answer reference.
    pub fn answer(id: impl Into<TargetId>) -> Self {
        Self::new(TargetKind::Answer, id)
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
