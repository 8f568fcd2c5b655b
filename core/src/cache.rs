//! # Host Snapshot Cache
//!
//! Read-through cache of built host trees.
//!
//! ## Policy
//! * Keyed by host identifier **and** filter fingerprint: a tree built under
//!   one filter set is never served for another.
//! * An entry is fresh for `ttl` after it was stored; stale entries are
//!   ignored on read and replaced on the next store.
//! * Stores are insert-if-absent: a fresh entry is never overwritten, so two
//!   concurrent builds of the same key settle on the first one stored.
//! * Every store first sweeps out all stale entries, so keys that are never
//!   requested again do not pile up.
//! * A zero `ttl` disables the cache; nothing is read or stored.
//! * There is no other invalidation. Changes in the naming service show up
//!   once the entry expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use devtree_common::network::address::HostAddr;
use devtree_common::tree::HostTree;

use crate::filter::FilterSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    host: String,
    filter: String,
}

impl SnapshotKey {
    pub fn new(addr: &HostAddr, filter: &FilterSet) -> Self {
        Self {
            host: addr.as_str().to_string(),
            filter: filter.fingerprint(),
        }
    }
}

#[derive(Debug)]
struct Snapshot {
    tree: Arc<HostTree>,
    stored_at: Instant,
}

impl Snapshot {
    fn stored_now(tree: Arc<HostTree>) -> Self {
        Self {
            tree,
            stored_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

#[derive(Debug)]
pub struct HostSnapshotCache {
    ttl: Duration,
    entries: DashMap<SnapshotKey, Snapshot>,
}

impl HostSnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// The stored tree for `key`, if there is a fresh one.
    pub fn get(&self, key: &SnapshotKey) -> Option<Arc<HostTree>> {
        if !self.is_enabled() {
            return None;
        }
        self.entries
            .get(key)
            .filter(|snapshot| snapshot.is_fresh(self.ttl))
            .map(|snapshot| Arc::clone(&snapshot.tree))
    }

    /// Stores `tree` unless a fresh entry already exists, and returns the
    /// tree now held for `key` (which is `tree` itself when the cache is off).
    pub fn insert_if_absent(&self, key: SnapshotKey, tree: Arc<HostTree>) -> Arc<HostTree> {
        if !self.is_enabled() {
            return tree;
        }
        self.purge_expired();

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_fresh(self.ttl) {
                    return Arc::clone(&occupied.get().tree);
                }
                occupied.insert(Snapshot::stored_now(Arc::clone(&tree)));
                tree
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Snapshot::stored_now(Arc::clone(&tree)));
                tree
            }
        }
    }

    /// Drops every stale entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, snapshot| snapshot.is_fresh(ttl));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
