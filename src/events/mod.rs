// Copyright (c) 2025 - Cowboy AI, Inc.
//! Utility Network Domain Events
//!
//! Events are immutable facts. Each aggregate type has its own event enum; the
//! [`UtilityNetworkEvent`] envelope carries any of them through the event
//! store and into the projection.
//!
//! # Correlation and Causation
//!
//! - **correlation_id**: groups every event produced by one request, across
//!   aggregates (a merge touches two span equipments)
//! - **causation_id**: the event that directly caused this one
//!
//! # Event Versioning
//!
//! Every event carries `event_version` in its [`EventHeader`], starting at 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod node_container;
pub mod span_equipment;
pub mod terminal_equipment;
pub mod utility_network;

pub use node_container::*;
pub use span_equipment::*;
pub use terminal_equipment::*;
pub use utility_network::UtilityNetworkEvent;

/// Current schema version of all events
pub const EVENT_VERSION: u32 = 1;

/// Metadata shared by every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    /// Event version for schema evolution
    pub event_version: u32,

    /// Unique event identifier (UUID v7 for time ordering)
    pub event_id: Uuid,

    /// Aggregate the event belongs to
    pub aggregate_id: Uuid,

    /// When the command producing this event was issued
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    /// Event that caused this one
    pub causation_id: Option<Uuid>,
}

impl EventHeader {
    pub fn new(aggregate_id: Uuid, timestamp: DateTime<Utc>, correlation_id: Uuid) -> Self {
        Self {
            event_version: EVENT_VERSION,
            event_id: Uuid::now_v7(),
            aggregate_id,
            timestamp,
            correlation_id,
            causation_id: None,
        }
    }

    pub fn caused_by(mut self, causation_id: Option<Uuid>) -> Self {
        self.causation_id = causation_id;
        self
    }
}
