//! Session-owned memo tables with cycle detection.
//!
//! Resolution and inference results are memoized per [`NodeKey`]. A query
//! that re-enters itself on the same thread (a recursive type alias, a
//! function whose return type depends on its own call) gets `None` instead
//! of recursing forever; that `None` is not memoized, so the outer query
//! still stores its real answer.

use std::hash::Hash;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use tolk_ir::NodeKey;

use crate::decl::Decl;
use crate::ty::Ty;

/// One memo table keyed by `K`.
pub struct QueryCache<K, V> {
    name: &'static str,
    values: RwLock<FxHashMap<K, Option<V>>>,
    in_flight: Mutex<FxHashSet<(ThreadId, K)>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Copy + Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        QueryCache {
            name,
            values: RwLock::new(FxHashMap::default()),
            in_flight: Mutex::new(FxHashSet::default()),
        }
    }

    /// Memoized `compute(key)`.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> Option<V>) -> Option<V> {
        if let Some(value) = self.values.read().get(&key) {
            return value.clone();
        }

        let marker = (thread::current().id(), key);
        if !self.in_flight.lock().insert(marker) {
            tracing::trace!(cache = self.name, "cycle, yielding no value");
            return None;
        }
        let guard = InFlight {
            set: &self.in_flight,
            marker: Some(marker),
        };
        let value = compute();
        drop(guard);

        self.values.write().insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }
}

/// Removes the in-flight marker even if `compute` unwinds.
struct InFlight<'a, K: Eq + Hash> {
    set: &'a Mutex<FxHashSet<(ThreadId, K)>>,
    marker: Option<(ThreadId, K)>,
}

impl<K: Eq + Hash> Drop for InFlight<'_, K> {
    fn drop(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.set.lock().remove(&marker);
        }
    }
}

/// Every memo table of a session.
pub struct Caches {
    pub resolve: QueryCache<NodeKey, Decl>,
    pub types: QueryCache<NodeKey, Ty>,
}

impl Caches {
    pub fn new() -> Self {
        Caches {
            resolve: QueryCache::new("resolve"),
            types: QueryCache::new("types"),
        }
    }

    /// Drop every memoized result. Called whenever any file changes, since
    /// any result may depend on any file.
    pub fn clear_all(&self) {
        tracing::debug!(
            resolve = self.resolve.len(),
            types = self.types.len(),
            "clearing caches"
        );
        self.resolve.clear();
        self.types.clear();
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}
