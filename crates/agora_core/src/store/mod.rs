//! Shared, key-addressed state store.
//!
//! # Responsibility
//! - Map stable atom keys to named slices (`registry`).
//! - Own one mutable state object per mounted page boundary (`provider`).
//! - Gate reads between registry defaults and live values (hydration).
//! - Provide whole-slice read/write primitives (`state`).
//!
//! # Invariants
//! - Before `commit()`, every read observes the registry default.
//! - Writes replace an entire slice; there are no sub-field patches.
//! - Plain writes are last-write-wins; `compare_and_write` fails fast on a
//!   stale version stamp.

pub mod provider;
pub mod registry;
pub mod slice;
pub mod state;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use provider::{is_mounted, HydrationPhase, StoreProvider};
pub use registry::{
    AtomEntry, AtomKey, AtomRegistry, SliceName, COMMENTS, COMMUNITIES, CURRENT_USER, POSTS,
    VOTES,
};
pub use slice::{SliceData, SliceId, SliceValue};
pub use state::{Next, Store, Versioned, WriteOutcome};

pub type StoreResult<T> = Result<T, StoreError>;

/// How keys missing from the registry are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyResolution {
    /// Unregistered keys fail with `StoreError::MissingKey`.
    #[default]
    Strict,
    /// Unregistered keys are used verbatim as slice names.
    Permissive,
}

/// Construction-time options for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub key_resolution: KeyResolution,
    /// Page boundary name; at most one provider may be mounted per boundary.
    pub boundary: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_resolution: KeyResolution::Strict,
            boundary: DEFAULT_BOUNDARY.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            ..Self::default()
        }
    }

    pub fn permissive(mut self) -> Self {
        self.key_resolution = KeyResolution::Permissive;
        self
    }
}

/// Boundary used when callers do not name one.
pub const DEFAULT_BOUNDARY: &str = "root";

/// Store-level failures. All of these indicate programmer or wiring errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key is absent from the registry under strict resolution.
    MissingKey(String),
    /// Requested value type does not match the slice's value type.
    TypeMismatch { key: String, slice: String },
    /// Slice changed since the caller's read.
    VersionConflict {
        slice: String,
        expected: u64,
        actual: u64,
    },
    /// Another provider is already mounted for this page boundary.
    DuplicateProvider(String),
    /// Boundary name is empty or not a lowercase slug.
    InvalidBoundary(String),
    /// Snapshot rendering failed.
    Render(String),
    /// The owning provider was dropped; the state no longer accepts writes.
    Unmounted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "atom key is not registered: {key}"),
            Self::TypeMismatch { key, slice } => {
                write!(f, "atom key `{key}` does not hold the requested type (slice `{slice}`)")
            }
            Self::VersionConflict {
                slice,
                expected,
                actual,
            } => write!(
                f,
                "slice `{slice}` changed concurrently: expected version {expected}, found {actual}"
            ),
            Self::DuplicateProvider(boundary) => {
                write!(f, "a store provider is already mounted for boundary `{boundary}`")
            }
            Self::InvalidBoundary(boundary) => {
                write!(f, "boundary name is invalid: `{boundary}`")
            }
            Self::Render(message) => write!(f, "failed to render store snapshot: {message}"),
            Self::Unmounted => write!(f, "store provider was unmounted; writes are rejected"),
        }
    }
}

impl Error for StoreError {}
