//! Identity-keyed metadata side tables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::class::{AnyShared, ClassId};

/// Mutable per-class record handed out by [`Container::meta_for`](crate::Container::meta_for).
///
/// A `Meta` is a shared string-keyed map owned by one container. It lets
/// collaborators stash per-class, per-container state without mutating the
/// class itself, which may be registered in several containers at once.
/// Cloning the handle is cheap and every clone points at the same record.
///
/// The container itself stores two entries here: the container-local short
/// name under [`LOCAL_NAME_KEY`](crate::LOCAL_NAME_KEY), and class-level
/// injections under [`CLASS_INJECTIONS_KEY`](crate::CLASS_INJECTIONS_KEY).
#[derive(Clone, Default)]
pub struct Meta {
    inner: Arc<Mutex<HashMap<String, AnyShared>>>,
}

impl Meta {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<AnyShared> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    /// Returns the stored value for `key` downcast to `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key)?.downcast::<T>().ok()
    }

    /// Stores `value` under `key`, replacing any prior value.
    pub fn set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.set_shared(key, Arc::new(value));
    }

    /// Stores an already-shared value under `key`.
    pub fn set_shared(&self, key: impl Into<String>, value: AnyShared) {
        self.inner.lock().unwrap().insert(key.into(), value);
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().contains_key(key)
    }

    /// Whether two handles point at the same record.
    pub fn ptr_eq(&self, other: &Meta) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Container-private table mapping class identity to its `Meta` record.
#[derive(Default)]
pub(crate) struct MetaMap {
    records: Mutex<HashMap<ClassId, Meta>>,
}

impl MetaMap {
    /// Lazily creates the record for `id`; idempotent thereafter.
    pub(crate) fn record_for(&self, id: ClassId) -> Meta {
        self.records
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(Meta::new)
            .clone()
    }
}
