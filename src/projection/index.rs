// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compare-and-swap equipment index

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::FatalError;

/// Concurrent id → record map updated only by compare-and-swap
///
/// Records are shared `Arc`s and compared by pointer: the projection hands
/// back exactly the `Arc` it read, so anything else means another writer got
/// there first or events were applied out of order.
#[derive(Debug)]
pub struct EquipmentIndex<T> {
    kind: &'static str,
    entries: DashMap<Uuid, Arc<T>>,
}

impl<T> EquipmentIndex<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<T>> {
        self.entries.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> Vec<Arc<T>> {
        self.entries.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    /// Replace `expected` by `next`
    ///
    /// `None` as `expected` means the id must be absent; `None` as `next`
    /// removes the entry.
    pub fn compare_and_swap(
        &self,
        id: Uuid,
        expected: Option<&Arc<T>>,
        next: Option<Arc<T>>,
    ) -> Result<(), FatalError> {
        let mismatch = || FatalError::ConcurrencyMismatch { kind: self.kind, id };

        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                match expected {
                    Some(expected) if Arc::ptr_eq(occupied.get(), expected) => {}
                    _ => return Err(mismatch()),
                }
                match next {
                    Some(next) => {
                        occupied.insert(next);
                    }
                    None => {
                        occupied.remove();
                    }
                }
            }
            Entry::Vacant(vacant) => {
                if expected.is_some() {
                    return Err(mismatch());
                }
                if let Some(next) = next {
                    vacant.insert(next);
                }
            }
        }
        Ok(())
    }
}
