//! Vote records and the per-store vote ledger.
//!
//! # Responsibility
//! - Hold at most one vote per `(user, target)` pair.
//! - Report score deltas so callers adjust aggregates additively.
//!
//! # Invariants
//! - Re-voting on the same target replaces the stored value in place and
//!   yields `new - old` as the delta, never the absolute value.
//! - Vote values are restricted to `-1`, `0` and `+1`; `0` is the "cleared"
//!   convention used by toggling surfaces.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a vote applies to. Serialized as `{"postId": ..}` or
/// `{"commentId": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteTarget {
    PostId(String),
    CommentId(String),
}

impl VoteTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::PostId(id) | Self::CommentId(id) => id.as_str(),
        }
    }

    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PostId(_) => "post",
            Self::CommentId(_) => "comment",
        }
    }
}

/// Validated vote value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct VoteValue(i8);

impl VoteValue {
    pub const UP: Self = Self(1);
    pub const DOWN: Self = Self(-1);
    pub const CLEAR: Self = Self(0);

    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

/// Raised when a vote value lies outside `-1..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidVoteValue(pub i64);

impl Display for InvalidVoteValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "vote value must be -1, 0 or 1, got {}", self.0)
    }
}

impl Error for InvalidVoteValue {}

impl TryFrom<i64> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::DOWN),
            0 => Ok(Self::CLEAR),
            1 => Ok(Self::UP),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    #[serde(flatten)]
    pub target: VoteTarget,
    pub user_id: String,
    pub value: VoteValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VoteKey {
    user_id: String,
    target: VoteTarget,
}

/// Ledger of votes keyed by `(user_id, target)`.
///
/// Serialized as a list ordered by user id, then target, so rendered
/// snapshots stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vote>", into = "Vec<Vote>")]
pub struct VoteBook {
    entries: HashMap<VoteKey, Vote>,
}

impl VoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the vote one user cast on one target.
    pub fn get(&self, user_id: &str, target: &VoteTarget) -> Option<&Vote> {
        self.entries.get(&VoteKey {
            user_id: user_id.to_string(),
            target: target.clone(),
        })
    }

    /// Records `value` for `(user_id, target)` and returns the score delta.
    ///
    /// A first vote returns `value`; a repeat vote returns `value - previous`.
    pub fn cast(&mut self, user_id: &str, target: VoteTarget, value: VoteValue) -> i64 {
        let key = VoteKey {
            user_id: user_id.to_string(),
            target,
        };
        match self.entries.get_mut(&key) {
            Some(existing) => {
                let delta = value.get() - existing.value.get();
                existing.value = value;
                delta
            }
            None => {
                let vote = Vote {
                    id: super::new_record_id(),
                    target: key.target.clone(),
                    user_id: key.user_id.clone(),
                    value,
                };
                self.entries.insert(key, vote);
                value.get()
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vote> {
        self.entries.values()
    }
}

impl From<Vec<Vote>> for VoteBook {
    fn from(votes: Vec<Vote>) -> Self {
        let entries = votes
            .into_iter()
            .map(|vote| {
                (
                    VoteKey {
                        user_id: vote.user_id.clone(),
                        target: vote.target.clone(),
                    },
                    vote,
                )
            })
            .collect();
        Self { entries }
    }
}

impl From<VoteBook> for Vec<Vote> {
    fn from(book: VoteBook) -> Self {
        let mut votes: Vec<Vote> = book.entries.into_values().collect();
        votes.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.target.cmp(&b.target))
        });
        votes
    }
}
