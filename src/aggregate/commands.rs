// Copyright (c) 2025 - Cowboy AI, Inc.
//! Commands
//!
//! Commands express intent and can be rejected. Each carries the issuing
//! timestamp and correlation id; handlers copy them into the event header and
//! never read the clock themselves.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AddressInfo, LifecycleInfo, MarkingInfo, NamingInfo, NodeContainerSide,
    SpanSegmentToTerminalConnect, SpanSegmentToTerminalDisconnect, UtilityNetworkHop,
};
use crate::events::EventHeader;

/// Time and tracing ids shared by every command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    /// When the command was issued
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    /// Event that caused this command, if any
    pub causation_id: Option<Uuid>,
}

impl CommandContext {
    pub fn new(timestamp: DateTime<Utc>, correlation_id: Uuid) -> Self {
        Self {
            timestamp,
            correlation_id,
            causation_id: None,
        }
    }

    /// Header for an event on `aggregate_id`
    pub fn header(&self, aggregate_id: Uuid) -> EventHeader {
        EventHeader::new(aggregate_id, self.timestamp, self.correlation_id).caused_by(self.causation_id)
    }
}

// ---------------------------------------------------------------------------
// Span equipment
// ---------------------------------------------------------------------------

/// Place a conduit or cable along a registered walk of interest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSpanEquipmentCommand {
    pub span_equipment_id: Uuid,
    pub specification_id: Uuid,
    /// Walk of interest the equipment follows
    pub interest_id: Uuid,
    pub naming: NamingInfo,
    pub marking: Option<MarkingInfo>,
    pub manufacturer_id: Option<Uuid>,
    /// Parent segments a cable runs through
    pub utility_network_hops: Vec<UtilityNetworkHop>,
    pub context: CommandContext,
}

/// Cut segments at a route node
///
/// At a route node that is not yet a node of interest an empty list cuts every
/// structure; otherwise only the listed segments are cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutSpanSegmentsCommand {
    pub span_equipment_id: Uuid,
    pub route_node_id: Uuid,
    pub span_segment_ids: Vec<Uuid>,
    pub context: CommandContext,
}

/// Connect segment ends to terminals of terminal equipment at a route node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSpanSegmentsToTerminalsCommand {
    pub span_equipment_id: Uuid,
    pub route_node_id: Uuid,
    pub connects: Vec<SpanSegmentToTerminalConnect>,
    pub context: CommandContext,
}

/// Join segment ends of two span equipments at a route node
///
/// Segments are paired in list order per equipment: the first segment of one
/// equipment with the first segment of the other, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSpanSegmentsAtRouteNodeCommand {
    pub route_node_id: Uuid,
    pub span_segment_ids: Vec<Uuid>,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectSpanSegmentsCommand {
    pub span_equipment_id: Uuid,
    pub disconnects: Vec<SpanSegmentToTerminalDisconnect>,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixSpanEquipmentToNodeContainerCommand {
    pub span_equipment_id: Uuid,
    pub node_container_id: Uuid,
    pub side: NodeContainerSide,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachSpanEquipmentFromNodeContainerCommand {
    pub span_equipment_id: Uuid,
    pub node_container_id: Uuid,
    pub context: CommandContext,
}

/// Join another span equipment onto this one at a shared end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpanEquipmentCommand {
    /// Surviving equipment
    pub span_equipment_id: Uuid,
    /// Equipment absorbed by the merge
    pub merge_with_span_equipment_id: Uuid,
    /// Route node both ends meet at
    pub route_node_id: Uuid,
    /// Id the combined walk of interest is registered under
    pub merged_walk_of_interest_id: Uuid,
    pub context: CommandContext,
}

/// Move onto a new, already registered walk of interest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSpanEquipmentCommand {
    pub span_equipment_id: Uuid,
    pub walk_of_interest_id: Uuid,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSpanStructureCommand {
    pub span_equipment_id: Uuid,
    pub span_structure_id: Uuid,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSpanEquipmentCommand {
    pub span_equipment_id: Uuid,
    pub context: CommandContext,
}

// ---------------------------------------------------------------------------
// Terminal equipment
// ---------------------------------------------------------------------------

/// Mount position requested for rack equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RackMountRequest {
    pub rack_id: Uuid,
    pub start_unit_position: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceTerminalEquipmentCommand {
    pub terminal_equipment_id: Uuid,
    pub specification_id: Uuid,
    pub node_container_id: Uuid,
    pub naming: NamingInfo,
    pub lifecycle: LifecycleInfo,
    pub address: Option<AddressInfo>,
    pub manufacturer_id: Option<Uuid>,
    /// Mount into a rack instead of placing loose in the container
    pub rack: Option<RackMountRequest>,
    pub context: CommandContext,
}

/// Change any subset of properties; `None` leaves a property alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTerminalEquipmentPropertiesCommand {
    pub terminal_equipment_id: Uuid,
    pub naming: Option<NamingInfo>,
    pub address: Option<Option<AddressInfo>>,
    pub lifecycle: Option<LifecycleInfo>,
    pub manufacturer_id: Option<Option<Uuid>>,
    pub specification_id: Option<Uuid>,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveTerminalEquipmentCommand {
    pub terminal_equipment_id: Uuid,
    pub context: CommandContext,
}

// ---------------------------------------------------------------------------
// Node container
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceNodeContainerCommand {
    pub node_container_id: Uuid,
    pub specification_id: Uuid,
    /// Node of interest the container sits at
    pub interest_id: Uuid,
    pub manufacturer_id: Option<Uuid>,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRackCommand {
    pub node_container_id: Uuid,
    pub rack_id: Uuid,
    pub rack_specification_id: Uuid,
    pub name: String,
    pub height_in_units: u16,
    /// Next free position when `None`
    pub position: Option<u16>,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseVerticalContentAlignmentCommand {
    pub node_container_id: Uuid,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTerminalEquipmentReferenceCommand {
    pub node_container_id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub rack: Option<RackMountRequest>,
    pub context: CommandContext,
}

/// Move rack mounted terminal equipment within or between racks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSubrackMountCommand {
    pub node_container_id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub rack_id: Uuid,
    pub start_unit_position: u16,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveTerminalEquipmentReferenceCommand {
    pub node_container_id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub context: CommandContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveNodeContainerCommand {
    pub node_container_id: Uuid,
    pub context: CommandContext,
}
