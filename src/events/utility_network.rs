// Copyright (c) 2025 - Cowboy AI, Inc.
//! Utility Network Event Envelope
//!
//! Top-level event envelope for all utility network aggregates. Consumers
//! (event store, projection) handle any event through it while each variant
//! stays strongly typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node_container::NodeContainerEvent;
use super::span_equipment::SpanEquipmentEvent;
use super::terminal_equipment::TerminalEquipmentEvent;
use super::EventHeader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate_type", content = "event", rename_all = "snake_case")]
pub enum UtilityNetworkEvent {
    /// Events from the SpanEquipment aggregate
    SpanEquipment(SpanEquipmentEvent),

    /// Events from the TerminalEquipment aggregate
    TerminalEquipment(TerminalEquipmentEvent),

    /// Events from the NodeContainer aggregate
    NodeContainer(NodeContainerEvent),
}

impl UtilityNetworkEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            UtilityNetworkEvent::SpanEquipment(event) => event.header(),
            UtilityNetworkEvent::TerminalEquipment(event) => event.header(),
            UtilityNetworkEvent::NodeContainer(event) => event.header(),
        }
    }

    /// Extract aggregate ID from any event type
    pub fn aggregate_id(&self) -> Uuid {
        self.header().aggregate_id
    }

    pub fn event_id(&self) -> Uuid {
        self.header().event_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header().timestamp
    }

    pub fn correlation_id(&self) -> Uuid {
        self.header().correlation_id
    }

    pub fn causation_id(&self) -> Option<Uuid> {
        self.header().causation_id
    }

    /// Aggregate type segment used in subjects and logs
    pub fn aggregate_type_name(&self) -> &'static str {
        match self {
            UtilityNetworkEvent::SpanEquipment(_) => "span_equipment",
            UtilityNetworkEvent::TerminalEquipment(_) => "terminal_equipment",
            UtilityNetworkEvent::NodeContainer(_) => "node_container",
        }
    }

    /// Get human-readable event type name
    pub fn event_type_name(&self) -> &'static str {
        match self {
            UtilityNetworkEvent::SpanEquipment(event) => event.event_type_name(),
            UtilityNetworkEvent::TerminalEquipment(event) => event.event_type_name(),
            UtilityNetworkEvent::NodeContainer(event) => event.event_type_name(),
        }
    }
}

impl From<SpanEquipmentEvent> for UtilityNetworkEvent {
    fn from(event: SpanEquipmentEvent) -> Self {
        UtilityNetworkEvent::SpanEquipment(event)
    }
}

impl From<TerminalEquipmentEvent> for UtilityNetworkEvent {
    fn from(event: TerminalEquipmentEvent) -> Self {
        UtilityNetworkEvent::TerminalEquipment(event)
    }
}

impl From<NodeContainerEvent> for UtilityNetworkEvent {
    fn from(event: NodeContainerEvent) -> Self {
        UtilityNetworkEvent::NodeContainer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NodeContainerEvent, NodeContainerRemoved};

    #[test]
    fn test_envelope_serializes_aggregate_type_tag() {
        let aggregate_id = Uuid::now_v7();
        let event: UtilityNetworkEvent = NodeContainerEvent::NodeContainerRemoved(NodeContainerRemoved {
            header: EventHeader::new(aggregate_id, Utc::now(), Uuid::now_v7()),
            interest_id: Uuid::now_v7(),
        })
        .into();

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["aggregate_type"], "node_container");
        assert_eq!(json["event"]["type"], "node_container_removed");

        let back: UtilityNetworkEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.aggregate_id(), aggregate_id);
        assert_eq!(back.aggregate_type_name(), "node_container");
    }
}
