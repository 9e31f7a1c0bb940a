// Copyright (c) 2025 - Cowboy AI, Inc.
//! Span Equipment Domain Events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventHeader;
use crate::domain::{
    SpanEquipment, SpanEquipmentNodeContainerAffix, SpanSegmentCut, SpanSegmentToTerminalConnect,
    SpanSegmentToTerminalDisconnect, SpanStructure, UtilityNetworkHop,
};

/// Span Equipment Domain Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpanEquipmentEvent {
    /// Equipment was placed along a route walk
    SpanEquipmentPlaced(SpanEquipmentPlaced),

    /// Segments were split at a node of interest
    SpanSegmentsCut(SpanSegmentsCut),

    /// Segment ends were connected to terminals of terminal equipment
    SpanSegmentsConnectedToTerminals(SpanSegmentsConnectedToTerminals),

    /// Segment ends were joined through junction terminals at a route node
    SpanSegmentsConnectedToSimpleTerminals(SpanSegmentsConnectedToSimpleTerminals),

    /// Segment ends were released from terminals
    SpanSegmentsDisconnectedFromTerminals(SpanSegmentsDisconnectedFromTerminals),

    /// An end was bound to a node container
    SpanEquipmentAffixedToContainer(SpanEquipmentAffixedToContainer),

    /// A node container binding was removed
    SpanEquipmentDetachedFromContainer(SpanEquipmentDetachedFromContainer),

    /// The equipment now follows a different walk
    SpanEquipmentMoved(SpanEquipmentMoved),

    /// Another span equipment was joined onto this one
    SpanEquipmentMerged(SpanEquipmentMerged),

    /// This equipment was absorbed by a merge and no longer exists
    SpanEquipmentMergedInto(SpanEquipmentMergedInto),

    /// An inner structure was removed
    SpanStructureRemoved(SpanStructureRemoved),

    /// The equipment was removed
    SpanEquipmentRemoved(SpanEquipmentRemoved),
}

/// Equipment was placed; carries the complete initial record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentPlaced {
    pub header: EventHeader,
    pub span_equipment: SpanEquipment,
}

/// Segments were cut at a node of interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentsCut {
    pub header: EventHeader,

    /// Route node the cut happened at
    pub cut_node_of_interest_id: Uuid,

    /// Index the node has (or gets) in the node of interest list
    pub cut_node_of_interest_index: u16,

    /// Whether the node was inserted by this cut
    pub is_new_node_of_interest: bool,

    pub cuts: Vec<SpanSegmentCut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentsConnectedToTerminals {
    pub header: EventHeader,
    pub connects: Vec<SpanSegmentToTerminalConnect>,
}

/// Segments joined through junction terminals that exist only in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentsConnectedToSimpleTerminals {
    pub header: EventHeader,
    pub route_node_id: Uuid,
    pub connects: Vec<SpanSegmentToTerminalConnect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentsDisconnectedFromTerminals {
    pub header: EventHeader,
    pub disconnects: Vec<SpanSegmentToTerminalDisconnect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentAffixedToContainer {
    pub header: EventHeader,
    pub affix: SpanEquipmentNodeContainerAffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentDetachedFromContainer {
    pub header: EventHeader,
    pub node_container_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentMoved {
    pub header: EventHeader,
    pub walk_of_interest_id: Uuid,
    pub node_of_interest_ids: Vec<Uuid>,
}

/// Result of a merge, applied to the surviving equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentMerged {
    pub header: EventHeader,

    /// Equipment that was absorbed
    pub merged_span_equipment_id: Uuid,

    /// Walk of the combined equipment
    pub walk_of_interest_id: Uuid,

    pub node_of_interest_ids: Vec<Uuid>,
    pub span_structures: Vec<SpanStructure>,
    pub node_container_affixes: Vec<SpanEquipmentNodeContainerAffix>,
    pub utility_network_hops: Vec<UtilityNetworkHop>,
}

/// Emitted on the absorbed equipment after [`SpanEquipmentMerged`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentMergedInto {
    pub header: EventHeader,
    pub target_span_equipment_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStructureRemoved {
    pub header: EventHeader,
    pub span_structure_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentRemoved {
    pub header: EventHeader,
}

impl SpanEquipmentEvent {
    pub fn header(&self) -> &EventHeader {
        use SpanEquipmentEvent::*;
        match self {
            SpanEquipmentPlaced(e) => &e.header,
            SpanSegmentsCut(e) => &e.header,
            SpanSegmentsConnectedToTerminals(e) => &e.header,
            SpanSegmentsConnectedToSimpleTerminals(e) => &e.header,
            SpanSegmentsDisconnectedFromTerminals(e) => &e.header,
            SpanEquipmentAffixedToContainer(e) => &e.header,
            SpanEquipmentDetachedFromContainer(e) => &e.header,
            SpanEquipmentMoved(e) => &e.header,
            SpanEquipmentMerged(e) => &e.header,
            SpanEquipmentMergedInto(e) => &e.header,
            SpanStructureRemoved(e) => &e.header,
            SpanEquipmentRemoved(e) => &e.header,
        }
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.header().aggregate_id
    }

    /// Get human-readable event type name
    pub fn event_type_name(&self) -> &'static str {
        use SpanEquipmentEvent::*;
        match self {
            SpanEquipmentPlaced(_) => "SpanEquipmentPlaced",
            SpanSegmentsCut(_) => "SpanSegmentsCut",
            SpanSegmentsConnectedToTerminals(_) => "SpanSegmentsConnectedToTerminals",
            SpanSegmentsConnectedToSimpleTerminals(_) => "SpanSegmentsConnectedToSimpleTerminals",
            SpanSegmentsDisconnectedFromTerminals(_) => "SpanSegmentsDisconnectedFromTerminals",
            SpanEquipmentAffixedToContainer(_) => "SpanEquipmentAffixedToContainer",
            SpanEquipmentDetachedFromContainer(_) => "SpanEquipmentDetachedFromContainer",
            SpanEquipmentMoved(_) => "SpanEquipmentMoved",
            SpanEquipmentMerged(_) => "SpanEquipmentMerged",
            SpanEquipmentMergedInto(_) => "SpanEquipmentMergedInto",
            SpanStructureRemoved(_) => "SpanStructureRemoved",
            SpanEquipmentRemoved(_) => "SpanEquipmentRemoved",
        }
    }
}
