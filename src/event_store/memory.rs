// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory event store
//!
//! Default store for tests and single-process hosts. The version check and
//! the write happen under one lock, so concurrent appends to the same
//! aggregate cannot both succeed.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::{EventStore, StoredEvent};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::UtilityNetworkEvent;

#[derive(Debug, Default)]
struct Log {
    events: Vec<StoredEvent<UtilityNetworkEvent>>,
    /// Positions of each aggregate's events in `events`
    streams: HashMap<Uuid, Vec<usize>>,
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Log>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: Vec<UtilityNetworkEvent>,
        expected_version: Option<u64>,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let mut log = self.log.write();
        let current = log.streams.get(&aggregate_id).map_or(0, |s| s.len() as u64);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(InfrastructureError::ConcurrencyError(format!(
                    "Expected version {} of {}, but current version is {}",
                    expected, aggregate_id, current
                )));
            }
        }

        let mut stored = Vec::with_capacity(events.len());
        for (offset, event) in events.into_iter().enumerate() {
            if event.aggregate_id() != aggregate_id {
                return Err(InfrastructureError::Serialization(format!(
                    "event {} belongs to {}, not {}",
                    event.event_id(),
                    event.aggregate_id(),
                    aggregate_id
                )));
            }
            let position = log.events.len() + stored.len() + 1;
            stored.push(StoredEvent::wrap(event, current + offset as u64 + 1, position as u64));
        }

        for event in &stored {
            let index = log.events.len();
            log.events.push(event.clone());
            log.streams.entry(aggregate_id).or_default().push(index);
        }

        debug!(
            %aggregate_id,
            appended = stored.len(),
            version = current + stored.len() as u64,
            "Events appended"
        );
        Ok(stored)
    }

    async fn read_events(
        &self,
        aggregate_id: Uuid,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let log = self.log.read();
        Ok(log
            .streams
            .get(&aggregate_id)
            .map(|indexes| indexes.iter().map(|i| log.events[*i].clone()).collect())
            .unwrap_or_default())
    }

    async fn read_all(&self) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        Ok(self.log.read().events.clone())
    }

    async fn get_version(&self, aggregate_id: Uuid) -> InfrastructureResult<Option<u64>> {
        Ok(self
            .log
            .read()
            .streams
            .get(&aggregate_id)
            .map(|s| s.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventHeader, NodeContainerEvent, NodeContainerRemoved};
    use chrono::Utc;

    fn removed(aggregate_id: Uuid) -> UtilityNetworkEvent {
        NodeContainerEvent::NodeContainerRemoved(NodeContainerRemoved {
            header: EventHeader::new(aggregate_id, Utc::now(), Uuid::now_v7()),
            interest_id: Uuid::now_v7(),
        })
        .into()
    }

    #[tokio::test]
    async fn test_append_assigns_sequence_and_position() {
        let store = InMemoryEventStore::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        store.append(a, vec![removed(a)], Some(0)).await.unwrap();
        let stored = store.append(b, vec![removed(b), removed(b)], Some(0)).await.unwrap();

        assert_eq!(stored[1].sequence, 2);
        assert_eq!(stored[1].position, 3);
        assert_eq!(store.get_version(b).await.unwrap(), Some(2));
        assert_eq!(store.read_events_up_to(b, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_expected_version_mismatch_rejected() {
        let store = InMemoryEventStore::new();
        let id = Uuid::now_v7();
        store.append(id, vec![removed(id)], Some(0)).await.unwrap();

        let result = store.append(id, vec![removed(id)], Some(0)).await;

        assert!(matches!(result, Err(InfrastructureError::ConcurrencyError(_))));
        assert_eq!(store.len(), 1);
    }
}
