//! Store provider and hydration gate.
//!
//! # Responsibility
//! - Own exactly one state object per mounted page boundary.
//! - Hand out `Store` handles to every consumer of that boundary.
//! - Flip from prerender to hydrated on the one-shot `commit()` signal.
//!
//! # Invariants
//! - At most one provider is mounted per boundary name on a thread.
//! - Dropping the provider releases its boundary and makes every
//!   outstanding `Store` handle reject writes.
//! - Providers on different boundaries never share state.

use crate::store::registry::AtomRegistry;
use crate::store::state::Store;
use crate::store::{StoreConfig, StoreError, StoreResult};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::collections::BTreeSet;

static BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid boundary regex"));

thread_local! {
    static MOUNTED_BOUNDARIES: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());
}

/// Which value generation readers observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    /// Server render and first client paint: registry defaults only.
    Prerender,
    /// After the readiness signal: live, mutable values.
    Hydrated,
}

/// Owner of one page boundary's store.
pub struct StoreProvider {
    boundary: String,
    store: Store,
}

impl StoreProvider {
    /// Mounts a provider for `config.boundary`.
    ///
    /// # Errors
    /// - `InvalidBoundary` when the name is not a lowercase slug.
    /// - `DuplicateProvider` when the boundary already has a live provider.
    pub fn mount(registry: AtomRegistry, config: StoreConfig) -> StoreResult<Self> {
        let boundary = config.boundary.trim().to_string();
        if !BOUNDARY_RE.is_match(&boundary) {
            return Err(StoreError::InvalidBoundary(config.boundary));
        }

        let inserted =
            MOUNTED_BOUNDARIES.with(|mounted| mounted.borrow_mut().insert(boundary.clone()));
        if !inserted {
            warn!("event=provider_mount module=store status=rejected boundary={boundary}");
            return Err(StoreError::DuplicateProvider(boundary));
        }

        info!(
            "event=provider_mount module=store status=ok boundary={boundary} key_resolution={:?}",
            config.key_resolution
        );
        Ok(Self {
            store: Store::new(registry, config.key_resolution),
            boundary,
        })
    }

    /// Mounts the built-in registry on the default boundary.
    pub fn mount_default() -> StoreResult<Self> {
        Self::mount(AtomRegistry::builtin(), StoreConfig::default())
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Returns a handle sharing this provider's state object.
    pub fn store(&self) -> Store {
        self.store.clone()
    }

    pub fn phase(&self) -> HydrationPhase {
        self.store.phase()
    }

    /// Fires the readiness signal. Returns `true` only on the first call.
    pub fn commit(&self) -> bool {
        let flipped = self.store.hydrate();
        if !flipped {
            warn!(
                "event=provider_commit module=store status=ignored boundary={} reason=already_hydrated",
                self.boundary
            );
        }
        flipped
    }
}

impl Drop for StoreProvider {
    fn drop(&mut self) {
        self.store.unmount();
        MOUNTED_BOUNDARIES.with(|mounted| {
            mounted.borrow_mut().remove(&self.boundary);
        });
        info!(
            "event=provider_unmount module=store status=ok boundary={}",
            self.boundary
        );
    }
}

/// Returns whether a provider is currently mounted for `boundary`.
pub fn is_mounted(boundary: &str) -> bool {
    MOUNTED_BOUNDARIES.with(|mounted| mounted.borrow().contains(boundary.trim()))
}
