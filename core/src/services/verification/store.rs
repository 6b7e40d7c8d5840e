//! Concurrent identity → code map

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::entities::verification_code::CodeEntry;

/// In-memory store holding at most one code per identity
///
/// Backed by a sharded concurrent map: callers working on different
/// identities rarely contend, and operations on the same identity are
/// linearized by the shard lock. Closures passed to [`for_each`],
/// [`inspect_and_remove`] and [`evict_where`] run while a shard lock is held
/// and must not call back into the store.
///
/// [`for_each`]: CodeStore::for_each
/// [`inspect_and_remove`]: CodeStore::inspect_and_remove
/// [`evict_where`]: CodeStore::evict_where
#[derive(Default)]
pub struct CodeStore {
    entries: DashMap<String, CodeEntry>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its identity, returning the entry it replaced
    pub fn put(&self, entry: CodeEntry) -> Option<CodeEntry> {
        self.entries.insert(entry.identity.clone(), entry)
    }

    /// Copy of the entry for `identity`
    pub fn get(&self, identity: &str) -> Option<CodeEntry> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    /// Remove and return the entry for `identity`
    pub fn remove(&self, identity: &str) -> Option<CodeEntry> {
        self.entries.remove(identity).map(|(_, entry)| entry)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Visit every entry; no ordering across identities
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&CodeEntry),
    {
        for item in self.entries.iter() {
            visitor(item.value());
        }
    }

    /// Judge the entry for `identity` and remove it if the judge says so
    ///
    /// `judge` returns a value for the caller and whether to evict. Inspection
    /// and removal happen under one lock, so a concurrent `put` for the same
    /// identity is either fully before or fully after. Returns `None` when no
    /// entry exists.
    pub fn inspect_and_remove<R, F>(&self, identity: &str, judge: F) -> Option<R>
    where
        F: FnOnce(&CodeEntry) -> (R, bool),
    {
        match self.entries.entry(identity.to_string()) {
            Entry::Vacant(_) => None,
            Entry::Occupied(occupied) => {
                let (verdict, evict) = judge(occupied.get());
                if evict {
                    occupied.remove();
                }
                Some(verdict)
            }
        }
    }

    /// Remove every entry matching `predicate`; returns how many were removed
    pub fn evict_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&CodeEntry) -> bool,
    {
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            if predicate(entry) {
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every stored code
    pub fn clear(&self) {
        self.entries.clear();
    }
}

// Codes are secrets; only the size is printed.
impl std::fmt::Debug for CodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStore").field("len", &self.len()).finish()
    }
}
