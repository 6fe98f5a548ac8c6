//! The per-provider state object and its read/write primitives.
//!
//! # Responsibility
//! - Resolve keys to slices and return typed values.
//! - Replace whole slices and stamp each committed write with a version.
//! - Render the observable state as deterministic JSON.
//!
//! # Invariants
//! - While the phase is `Prerender`, reads return registry defaults and
//!   writes are discarded.
//! - Slice versions start at `0` and grow by one per committed write.
//! - No borrow of the state object is held while caller code runs, so an
//!   updater may itself read the store.
//! - Once the owning provider unmounts, every write fails with `Unmounted`.

use crate::store::provider::HydrationPhase;
use crate::store::registry::{AtomKey, AtomRegistry};
use crate::store::slice::{SliceData, SliceId, SliceValue};
use crate::store::{KeyResolution, StoreError, StoreResult};
use log::{debug, info};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Replacement for a slice: a literal value or a function of the previous one.
pub enum Next<T> {
    Value(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Next<T> {
    pub fn update(updater: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Update(Box::new(updater))
    }
}

impl<T> From<T> for Next<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// A slice value together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Result of a write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The slice was replaced and now carries `version`.
    Committed { version: u64 },
    /// The store is not hydrated yet; nothing changed.
    Discarded,
}

impl WriteOutcome {
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

struct SliceCell {
    value: SliceValue,
    version: u64,
}

struct StoreState {
    registry: AtomRegistry,
    key_resolution: KeyResolution,
    phase: HydrationPhase,
    mounted: bool,
    live: HashMap<SliceId, SliceCell>,
}

/// Shared handle to one provider's state object.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct Store {
    state: Rc<RefCell<StoreState>>,
}

impl Store {
    pub(crate) fn new(registry: AtomRegistry, key_resolution: KeyResolution) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState {
                registry,
                key_resolution,
                phase: HydrationPhase::Prerender,
                mounted: true,
                live: HashMap::new(),
            })),
        }
    }

    pub fn phase(&self) -> HydrationPhase {
        self.state.borrow().phase
    }

    pub fn is_hydrated(&self) -> bool {
        self.phase() == HydrationPhase::Hydrated
    }

    pub fn key_resolution(&self) -> KeyResolution {
        self.state.borrow().key_resolution
    }

    /// Returns `false` once the owning provider has been dropped.
    pub fn is_mounted(&self) -> bool {
        self.state.borrow().mounted
    }

    pub(crate) fn unmount(&self) {
        self.state.borrow_mut().mounted = false;
    }

    /// Returns whether both handles point at the same state object.
    pub fn same_store(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Swaps in the live state, seeded from registry defaults.
    ///
    /// Returns `false` when the store was already hydrated.
    pub(crate) fn hydrate(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase == HydrationPhase::Hydrated {
            return false;
        }

        let live = state
            .registry
            .entries()
            .iter()
            .map(|entry| {
                (
                    SliceId::Known(entry.slice),
                    SliceCell {
                        value: entry.default.clone(),
                        version: 0,
                    },
                )
            })
            .collect();
        state.live = live;
        state.phase = HydrationPhase::Hydrated;
        info!(
            "event=store_hydrate module=store status=ok slices={}",
            state.live.len()
        );
        true
    }

    pub fn read<T: SliceData>(&self, key: &AtomKey<T>) -> StoreResult<T> {
        self.read_versioned(key).map(|versioned| versioned.value)
    }

    /// Reads a slice along with its current version stamp.
    ///
    /// Before hydration the version is always `0`.
    pub fn read_versioned<T: SliceData>(&self, key: &AtomKey<T>) -> StoreResult<Versioned<T>> {
        let state = self.state.borrow();
        let slice = state.registry.resolve(key.key(), state.key_resolution)?;

        let live = match state.phase {
            HydrationPhase::Prerender => None,
            HydrationPhase::Hydrated => state.live.get(&slice),
        };
        match live {
            Some(cell) => Ok(Versioned {
                value: project(key.key(), &slice, &cell.value)?,
                version: cell.version,
            }),
            None => Ok(Versioned {
                value: project(key.key(), &slice, &state.registry.default_for(&slice))?,
                version: 0,
            }),
        }
    }

    /// Replaces the whole slice behind `key`. Last write wins.
    pub fn write<T: SliceData>(
        &self,
        key: &AtomKey<T>,
        next: impl Into<Next<T>>,
    ) -> StoreResult<WriteOutcome> {
        self.ensure_mounted(key.key())?;
        let value = match next.into() {
            Next::Value(value) => value,
            Next::Update(updater) => {
                let current = self.read(key)?;
                if !self.is_hydrated() {
                    return Ok(self.discard(key.key()));
                }
                updater(&current)
            }
        };
        self.commit_slice(key.key(), value.into_slice(), None)
    }

    /// Replaces the slice only if it still carries `expected_version`.
    pub fn compare_and_write<T: SliceData>(
        &self,
        key: &AtomKey<T>,
        expected_version: u64,
        value: T,
    ) -> StoreResult<WriteOutcome> {
        self.commit_slice(key.key(), value.into_slice(), Some(expected_version))
    }

    /// Renders every registered slice, as currently observable, to JSON.
    ///
    /// Prerender output and the first hydrated output are byte-identical
    /// when no write happened in between.
    pub fn render_snapshot(&self) -> StoreResult<String> {
        let state = self.state.borrow();
        let mut rendered: BTreeMap<&'static str, &SliceValue> = BTreeMap::new();
        for entry in state.registry.entries() {
            let value = match state.phase {
                HydrationPhase::Prerender => &entry.default,
                HydrationPhase::Hydrated => state
                    .live
                    .get(&SliceId::Known(entry.slice))
                    .map(|cell| &cell.value)
                    .unwrap_or(&entry.default),
            };
            rendered.insert(entry.slice.as_str(), value);
        }
        serde_json::to_string(&rendered).map_err(|err| StoreError::Render(err.to_string()))
    }

    fn ensure_mounted(&self, key: &str) -> StoreResult<()> {
        if self.is_mounted() {
            return Ok(());
        }
        debug!("event=slice_write module=store status=rejected key={key} reason=unmounted");
        Err(StoreError::Unmounted)
    }

    fn discard(&self, key: &str) -> WriteOutcome {
        debug!("event=slice_write module=store status=discarded key={key} reason=prerender");
        WriteOutcome::Discarded
    }

    fn commit_slice(
        &self,
        key: &str,
        value: SliceValue,
        expected_version: Option<u64>,
    ) -> StoreResult<WriteOutcome> {
        self.ensure_mounted(key)?;
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let slice = state.registry.resolve(key, state.key_resolution)?;
        if !value.fits(&slice) {
            return Err(StoreError::TypeMismatch {
                key: key.to_string(),
                slice: slice.to_string(),
            });
        }
        if state.phase == HydrationPhase::Prerender {
            return Ok(self.discard(key));
        }

        let registry = &state.registry;
        let cell = state
            .live
            .entry(slice.clone())
            .or_insert_with(|| SliceCell {
                value: registry.default_for(&slice),
                version: 0,
            });
        if let Some(expected) = expected_version {
            if cell.version != expected {
                debug!(
                    "event=slice_write module=store status=conflict slice={slice} expected={expected} actual={}",
                    cell.version
                );
                return Err(StoreError::VersionConflict {
                    slice: slice.to_string(),
                    expected,
                    actual: cell.version,
                });
            }
        }

        cell.value = value;
        cell.version += 1;
        debug!(
            "event=slice_write module=store status=ok slice={slice} version={}",
            cell.version
        );
        Ok(WriteOutcome::Committed {
            version: cell.version,
        })
    }
}

fn project<T: SliceData>(key: &str, slice: &SliceId, value: &SliceValue) -> StoreResult<T> {
    T::project(value)
        .cloned()
        .ok_or_else(|| StoreError::TypeMismatch {
            key: key.to_string(),
            slice: slice.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{Next, Store, WriteOutcome};
    use crate::model::community::Community;
    use crate::model::content::Post;
    use crate::seed::Seed;
    use crate::store::registry::{AtomKey, AtomRegistry, COMMUNITIES, POSTS};
    use crate::store::{KeyResolution, StoreError};

    fn hydrated_store(mode: KeyResolution) -> Store {
        let store = Store::new(AtomRegistry::builtin(), mode);
        assert!(store.hydrate());
        store
    }

    #[test]
    fn hydrate_is_one_shot() {
        let store = Store::new(AtomRegistry::builtin(), KeyResolution::Strict);
        assert!(store.hydrate());
        assert!(!store.hydrate());
    }

    #[test]
    fn updater_sees_previous_value() {
        let store = hydrated_store(KeyResolution::Strict);
        let before = store.read(&COMMUNITIES).expect("read communities").len();
        store
            .write(
                &COMMUNITIES,
                Next::update(|previous: &Vec<Community>| previous[..1].to_vec()),
            )
            .expect("write communities");
        assert!(before > 1);
        assert_eq!(store.read(&COMMUNITIES).expect("read communities").len(), 1);
    }

    #[test]
    fn versions_increment_per_committed_write() {
        let store = hydrated_store(KeyResolution::Strict);
        assert_eq!(store.read_versioned(&POSTS).expect("read posts").version, 0);
        let outcome = store.write(&POSTS, Vec::<Post>::new()).expect("write posts");
        assert_eq!(outcome, WriteOutcome::Committed { version: 1 });
        let outcome = store.write(&POSTS, Vec::<Post>::new()).expect("write posts");
        assert_eq!(outcome, WriteOutcome::Committed { version: 2 });
    }

    #[test]
    fn permissive_raw_slice_name_reaches_registered_slice() {
        let store = hydrated_store(KeyResolution::Permissive);
        let raw: AtomKey<Vec<Post>> = AtomKey::new("posts");
        store.write(&raw, Vec::<Post>::new()).expect("raw write");
        assert!(store.read(&POSTS).expect("read posts").is_empty());
    }

    #[test]
    fn mismatched_type_is_rejected() {
        let store = hydrated_store(KeyResolution::Permissive);
        let wrong: AtomKey<serde_json::Value> = AtomKey::new("postsAtom");
        let err = store.read(&wrong).expect_err("posts are not json");
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
        let err = store
            .write(&wrong, serde_json::Value::Null)
            .expect_err("posts are not json");
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }

    #[test]
    fn prerender_updater_write_still_checks_type() {
        let store = Store::new(AtomRegistry::builtin(), KeyResolution::Permissive);
        let wrong: AtomKey<serde_json::Value> = AtomKey::new("postsAtom");
        let err = store
            .write(&wrong, Next::update(|previous: &serde_json::Value| previous.clone()))
            .expect_err("posts are not json");
        assert_eq!(
            err,
            StoreError::TypeMismatch {
                key: "postsAtom".to_string(),
                slice: "posts".to_string(),
            }
        );
        let outcome = store
            .write(&POSTS, Next::update(|previous: &Vec<Post>| previous.clone()))
            .expect("typed updater");
        assert_eq!(outcome, WriteOutcome::Discarded);
    }

    #[test]
    fn unmounted_store_rejects_writes() {
        let store = hydrated_store(KeyResolution::Strict);
        store.unmount();
        assert!(!store.is_mounted());
        assert_eq!(
            store.write(&POSTS, Vec::<Post>::new()).unwrap_err(),
            StoreError::Unmounted
        );
        assert_eq!(
            store
                .write(&POSTS, Next::update(|previous: &Vec<Post>| previous.clone()))
                .unwrap_err(),
            StoreError::Unmounted
        );
        assert_eq!(
            store
                .compare_and_write(&POSTS, 0, Vec::<Post>::new())
                .unwrap_err(),
            StoreError::Unmounted
        );
        assert!(!store.read(&POSTS).expect("reads still work").is_empty());
    }

    #[test]
    fn ad_hoc_slices_default_to_null() {
        let store = Store::new(AtomRegistry::with_seed(Seed::empty()), KeyResolution::Permissive);
        let drafts: AtomKey<serde_json::Value> = AtomKey::new("draftsAtom");
        assert_eq!(store.read(&drafts).expect("ad hoc read"), serde_json::Value::Null);
        store.hydrate();
        store
            .write(&drafts, serde_json::json!({"title": "wip"}))
            .expect("ad hoc write");
        assert_eq!(
            store.read(&drafts).expect("ad hoc read")["title"],
            serde_json::json!("wip")
        );
    }
}
