// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Store Abstraction
//!
//! The durable, append-only log the projection is derived from.
//!
//! # Architecture
//!
//! ```text
//! Command → Aggregate → Events → EventStore → Persistent Storage
//!                                    ↓
//!                              Projection (replay)
//! ```
//!
//! # Event Store Requirements
//!
//! 1. **Append-Only**: Events are never updated or deleted
//! 2. **Ordered**: Events keep their sequence within an aggregate
//! 3. **Optimistic concurrency**: `append` checks the expected version
//! 4. **Replay**: The full log can be read back in append order
//!
//! # Example
//!
//! ```rust,ignore
//! let store = InMemoryEventStore::new();
//!
//! let version = store.append(aggregate_id, vec![event], Some(0)).await?;
//! let events = store.read_events_up_to(aggregate_id, version).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InfrastructureResult;
use crate::events::UtilityNetworkEvent;

pub mod memory;
#[cfg(feature = "nats")]
pub mod nats;

pub use memory::InMemoryEventStore;
#[cfg(feature = "nats")]
pub use nats::NatsEventStore;

/// Stored event envelope
///
/// Wraps a domain event with its position in the aggregate stream and in the
/// whole log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent<E> {
    /// Unique event ID (UUID v7 for time-ordering)
    pub event_id: Uuid,

    /// Aggregate ID this event belongs to
    pub aggregate_id: Uuid,

    /// Version of the aggregate after this event, starting at 1
    pub sequence: u64,

    /// Position in the whole log, starting at 1
    #[serde(default)]
    pub position: u64,

    /// Event timestamp (when the command was issued)
    pub timestamp: DateTime<Utc>,

    /// Correlation ID (tracks related events across aggregates)
    pub correlation_id: Uuid,

    /// Causation ID (immediate cause of this event)
    pub causation_id: Option<Uuid>,

    /// Event type name
    pub event_type: String,

    /// The actual domain event data
    pub data: E,
}

impl StoredEvent<UtilityNetworkEvent> {
    /// Wrap an event at the given aggregate version and log position
    pub fn wrap(event: UtilityNetworkEvent, sequence: u64, position: u64) -> Self {
        Self {
            event_id: event.event_id(),
            aggregate_id: event.aggregate_id(),
            sequence,
            position,
            timestamp: event.timestamp(),
            correlation_id: event.correlation_id(),
            causation_id: event.causation_id(),
            event_type: event.event_type_name().to_string(),
            data: event,
        }
    }
}

/// Event Store trait for persisting and retrieving utility network events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events to an aggregate's event stream
    ///
    /// Events are written as a unit. `expected_version` is the version the
    /// caller based its decision on (`Some(0)` for a new aggregate); `None`
    /// skips the check.
    ///
    /// # Returns
    ///
    /// The new version after appending events
    ///
    /// # Errors
    ///
    /// - `ConcurrencyError` if expected_version doesn't match actual version
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: Vec<UtilityNetworkEvent>,
        expected_version: Option<u64>,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>>;

    /// Read all events for an aggregate in sequence order
    async fn read_events(
        &self,
        aggregate_id: Uuid,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>>;

    /// Read events for an aggregate up to and including `version`
    async fn read_events_up_to(
        &self,
        aggregate_id: Uuid,
        version: u64,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let mut events = self.read_events(aggregate_id).await?;
        events.retain(|e| e.sequence <= version);
        Ok(events)
    }

    /// Read the whole log in append order
    async fn read_all(&self) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>>;

    /// Read all events sharing a correlation id, across aggregates
    async fn read_by_correlation(
        &self,
        correlation_id: Uuid,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let mut events = self.read_all().await?;
        events.retain(|e| e.correlation_id == correlation_id);
        Ok(events)
    }

    /// Current version of an aggregate, `None` if it has no events
    async fn get_version(&self, aggregate_id: Uuid) -> InfrastructureResult<Option<u64>>;
}
