// Copyright (c) 2025 - Cowboy AI, Inc.
//! Multi-version element index
//!
//! Every id maps to a chain of `(version, value)` entries in ascending version
//! order; `None` marks a removal. A single writer stages changes in a
//! [`Transaction`] and publishes them all under `committed + 1` before the
//! committed counter moves. A reader pinned to version `v` sees the newest
//! entry at or below `v`, so it never observes half a transaction.

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

#[derive(Debug)]
struct VersionChain<T> {
    entries: Vec<(u64, Option<T>)>,
}

impl<T> Default for VersionChain<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> VersionChain<T> {
    fn at(&self, version: u64) -> Option<&T> {
        self.entries
            .iter()
            .rev()
            .find(|(v, _)| *v <= version)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Drop entries no reader at or above `horizon` can see
    fn prune(&mut self, horizon: u64) {
        if let Some(keep_from) = self.entries.iter().rposition(|(v, _)| *v <= horizon) {
            self.entries.drain(..keep_from);
        }
    }

    fn is_dead_at(&self, horizon: u64) -> bool {
        matches!(self.entries.as_slice(), [(v, None)] if *v <= horizon)
    }
}

/// Versioned concurrent index
#[derive(Debug)]
pub struct VersionedIndex<T> {
    chains: DashMap<Uuid, VersionChain<T>>,
    committed: AtomicU64,
    writer: Mutex<()>,
    retention: u64,
    tombstones: Mutex<VecDeque<(u64, Uuid)>>,
}

impl<T: Clone> VersionedIndex<T> {
    /// `retention` is how many versions behind the latest stay readable
    pub fn new(retention: u64) -> Self {
        Self {
            chains: DashMap::new(),
            committed: AtomicU64::new(0),
            writer: Mutex::new(()),
            retention,
            tombstones: Mutex::new(VecDeque::new()),
        }
    }

    /// Latest committed version
    pub fn committed_version(&self) -> u64 {
        self.committed.load(Ordering::Acquire)
    }

    /// Value as seen at `version`
    pub fn get_at(&self, id: Uuid, version: u64) -> Option<T> {
        self.chains
            .get(&id)
            .and_then(|chain| chain.at(version).cloned())
    }

    /// Value at the latest committed version
    pub fn get(&self, id: Uuid) -> Option<T> {
        self.get_at(id, self.committed_version())
    }

    /// Number of live values at `version`
    pub fn len_at(&self, version: u64) -> usize {
        self.chains
            .iter()
            .filter(|chain| chain.at(version).is_some())
            .count()
    }

    /// Every live value at `version`
    pub fn values_at(&self, version: u64) -> Vec<T> {
        self.chains
            .iter()
            .filter_map(|chain| chain.at(version).cloned())
            .collect()
    }

    /// Start the single write transaction; blocks while another is open
    pub fn begin(&self) -> Transaction<'_, T> {
        let guard = self.writer.lock();
        Transaction {
            base: self.committed_version(),
            index: self,
            _guard: guard,
            writes: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn publish(&self, version: u64, writes: Vec<(Uuid, Option<T>)>) {
        let horizon = version.saturating_sub(self.retention);
        let mut tombstones = self.tombstones.lock();

        for (id, value) in writes {
            if value.is_none() {
                tombstones.push_back((version, id));
            }
            let mut chain = self.chains.entry(id).or_default();
            chain.entries.push((version, value));
            chain.prune(horizon);
        }

        self.committed.store(version, Ordering::Release);

        while let Some((removed_at, id)) = tombstones.front().copied() {
            if removed_at > horizon {
                break;
            }
            tombstones.pop_front();
            if let Some(mut chain) = self.chains.get_mut(&id) {
                chain.prune(horizon);
            }
            self.chains.remove_if(&id, |_, chain| chain.is_dead_at(horizon));
        }
    }
}

/// Staged writes of one unit of work
///
/// Dropping without [`Transaction::commit`] discards everything.
pub struct Transaction<'a, T: Clone> {
    index: &'a VersionedIndex<T>,
    _guard: MutexGuard<'a, ()>,
    base: u64,
    writes: HashMap<Uuid, Option<T>>,
    order: Vec<Uuid>,
}

impl<'a, T: Clone> Transaction<'a, T> {
    /// Value as this transaction sees it: staged first, then the base version
    pub fn get(&self, id: Uuid) -> Option<T> {
        match self.writes.get(&id) {
            Some(staged) => staged.clone(),
            None => self.index.get_at(id, self.base),
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn insert(&mut self, id: Uuid, value: T) {
        self.stage(id, Some(value));
    }

    pub fn remove(&mut self, id: Uuid) {
        self.stage(id, None);
    }

    fn stage(&mut self, id: Uuid, value: Option<T>) {
        if self.writes.insert(id, value).is_none() {
            self.order.push(id);
        }
    }

    /// Whether anything was staged
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Publish all staged writes as one new version
    pub fn commit(mut self) -> u64 {
        let version = self.base + 1;
        let writes: Vec<(Uuid, Option<T>)> = self
            .order
            .iter()
            .filter_map(|id| self.writes.remove(id).map(|value| (*id, value)))
            .collect();
        self.index.publish(version, writes);
        version
    }
}
