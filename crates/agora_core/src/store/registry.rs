//! Atom registry: the fixed key → slice table.
//!
//! # Responsibility
//! - Declare every atom key, the slice it denotes, and its default value.
//! - Resolve caller-supplied keys under strict or permissive policy.
//!
//! # Invariants
//! - The key set is fixed at compile time; there is no runtime registration.
//! - Key strings are part of the contract with UI surfaces and never change
//!   meaning.

use crate::model::community::Community;
use crate::model::content::{Comment, Post};
use crate::model::user::SessionUser;
use crate::model::vote::VoteBook;
use crate::seed::Seed;
use crate::store::slice::{SliceId, SliceValue};
use crate::store::{KeyResolution, StoreError, StoreResult};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Named slices of the shared state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SliceName {
    Communities,
    Posts,
    Comments,
    CurrentUser,
    Votes,
}

impl SliceName {
    pub const ALL: [SliceName; 5] = [
        Self::Communities,
        Self::Posts,
        Self::Comments,
        Self::CurrentUser,
        Self::Votes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Communities => "communities",
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::CurrentUser => "currentUser",
            Self::Votes => "votes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == value)
    }
}

/// Typed handle for one atom key.
///
/// The type parameter pins the value type stored behind the key.
pub struct AtomKey<T> {
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> AtomKey<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl<T> Clone for AtomKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AtomKey<T> {}

impl<T> Debug for AtomKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AtomKey").field(&self.key).finish()
    }
}

pub const COMMUNITIES: AtomKey<Vec<Community>> = AtomKey::new("communitiesAtom");
pub const POSTS: AtomKey<Vec<Post>> = AtomKey::new("postsAtom");
pub const COMMENTS: AtomKey<Vec<Comment>> = AtomKey::new("commentsAtom");
pub const CURRENT_USER: AtomKey<Option<SessionUser>> = AtomKey::new("currentUserAtom");
pub const VOTES: AtomKey<VoteBook> = AtomKey::new("votesAtom");

const KEY_TABLE: [(&str, SliceName); 5] = [
    ("communitiesAtom", SliceName::Communities),
    ("postsAtom", SliceName::Posts),
    ("commentsAtom", SliceName::Comments),
    ("currentUserAtom", SliceName::CurrentUser),
    ("votesAtom", SliceName::Votes),
];

/// One registry row.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomEntry {
    pub key: &'static str,
    pub slice: SliceName,
    pub default: SliceValue,
}

/// Registry of every atom key and its default.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRegistry {
    entries: Vec<AtomEntry>,
}

impl AtomRegistry {
    /// Registry whose defaults are the demonstration seed.
    pub fn builtin() -> Self {
        Self::with_seed(Seed::demo())
    }

    /// Same key table, with defaults taken from `seed`.
    pub fn with_seed(seed: Seed) -> Self {
        let Seed {
            communities,
            posts,
            comments,
            current_user,
            votes,
        } = seed;
        let defaults = [
            SliceValue::Communities(communities),
            SliceValue::Posts(posts),
            SliceValue::Comments(comments),
            SliceValue::CurrentUser(current_user),
            SliceValue::Votes(votes),
        ];

        let entries = KEY_TABLE
            .into_iter()
            .zip(defaults)
            .map(|((key, slice), default)| AtomEntry {
                key,
                slice,
                default,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[AtomEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&AtomEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Default value for `slice`. Ad hoc slices default to JSON `null`.
    pub fn default_for(&self, slice: &SliceId) -> SliceValue {
        match slice {
            SliceId::Known(name) => self
                .entries
                .iter()
                .find(|entry| entry.slice == *name)
                .map(|entry| entry.default.clone())
                .unwrap_or(SliceValue::AdHoc(serde_json::Value::Null)),
            SliceId::AdHoc(_) => SliceValue::AdHoc(serde_json::Value::Null),
        }
    }

    /// Resolves a key to the slice it addresses.
    ///
    /// Under permissive resolution an unregistered key is taken as a slice
    /// name verbatim; a key that happens to spell a known slice name reaches
    /// that slice.
    pub fn resolve(&self, key: &str, mode: KeyResolution) -> StoreResult<SliceId> {
        if let Some(entry) = self.entry(key) {
            return Ok(SliceId::Known(entry.slice));
        }
        match mode {
            KeyResolution::Strict => Err(StoreError::MissingKey(key.to_string())),
            KeyResolution::Permissive => Ok(SliceName::parse(key)
                .map(SliceId::Known)
                .unwrap_or_else(|| SliceId::AdHoc(key.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomRegistry, SliceName, COMMUNITIES, CURRENT_USER, POSTS};
    use crate::store::slice::SliceId;
    use crate::store::{KeyResolution, StoreError};

    #[test]
    fn builtin_registry_covers_every_slice_once() {
        let registry = AtomRegistry::builtin();
        assert_eq!(registry.entries().len(), SliceName::ALL.len());
        for name in SliceName::ALL {
            let count = registry
                .entries()
                .iter()
                .filter(|entry| entry.slice == name)
                .count();
            assert_eq!(count, 1, "slice {} registered {count} times", name.as_str());
        }
    }

    #[test]
    fn typed_keys_match_registry_rows() {
        let registry = AtomRegistry::builtin();
        for key in [COMMUNITIES.key(), POSTS.key(), CURRENT_USER.key()] {
            assert!(registry.entry(key).is_some(), "{key} should be registered");
        }
    }

    #[test]
    fn strict_resolution_rejects_unregistered_key() {
        let registry = AtomRegistry::builtin();
        let err = registry
            .resolve("posts", KeyResolution::Strict)
            .expect_err("raw slice name is not a key");
        assert_eq!(err, StoreError::MissingKey("posts".to_string()));
    }

    #[test]
    fn permissive_resolution_falls_back_to_slice_names() {
        let registry = AtomRegistry::builtin();
        assert_eq!(
            registry
                .resolve("posts", KeyResolution::Permissive)
                .expect("fallback should resolve"),
            SliceId::Known(SliceName::Posts)
        );
        assert_eq!(
            registry
                .resolve("draftsAtom", KeyResolution::Permissive)
                .expect("ad hoc should resolve"),
            SliceId::AdHoc("draftsAtom".to_string())
        );
    }
}
