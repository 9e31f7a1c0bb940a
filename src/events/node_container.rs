// Copyright (c) 2025 - Cowboy AI, Inc.
//! Node Container Domain Events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventHeader;
use crate::domain::{NodeContainer, Rack, RackPlacement, VerticalContentAlignment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeContainerEvent {
    NodeContainerPlaced(NodeContainerPlaced),
    NodeContainerRackAdded(NodeContainerRackAdded),
    NodeContainerVerticalContentAlignmentReversed(NodeContainerVerticalContentAlignmentReversed),
    NodeContainerTerminalEquipmentAdded(NodeContainerTerminalEquipmentAdded),
    NodeContainerTerminalEquipmentReferenceRemoved(NodeContainerTerminalEquipmentReferenceRemoved),
    NodeContainerSubrackMountMoved(NodeContainerSubrackMountMoved),
    NodeContainerRemoved(NodeContainerRemoved),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerPlaced {
    pub header: EventHeader,
    pub node_container: NodeContainer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerRackAdded {
    pub header: EventHeader,
    pub rack: Rack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerVerticalContentAlignmentReversed {
    pub header: EventHeader,
    /// Alignment after the reversal
    pub vertical_content_alignment: VerticalContentAlignment,
}

/// Terminal equipment was placed loose in the container or into a rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerTerminalEquipmentAdded {
    pub header: EventHeader,
    pub terminal_equipment_id: Uuid,
    pub rack_placement: Option<RackPlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerTerminalEquipmentReferenceRemoved {
    pub header: EventHeader,
    pub terminal_equipment_id: Uuid,
}

/// A rack mount moved; `position` is already snapped clear of occupants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerSubrackMountMoved {
    pub header: EventHeader,
    pub terminal_equipment_id: Uuid,
    pub rack_id: Uuid,
    pub position: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerRemoved {
    pub header: EventHeader,
    pub interest_id: Uuid,
}

impl NodeContainerEvent {
    pub fn header(&self) -> &EventHeader {
        use NodeContainerEvent::*;
        match self {
            NodeContainerPlaced(e) => &e.header,
            NodeContainerRackAdded(e) => &e.header,
            NodeContainerVerticalContentAlignmentReversed(e) => &e.header,
            NodeContainerTerminalEquipmentAdded(e) => &e.header,
            NodeContainerTerminalEquipmentReferenceRemoved(e) => &e.header,
            NodeContainerSubrackMountMoved(e) => &e.header,
            NodeContainerRemoved(e) => &e.header,
        }
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.header().aggregate_id
    }

    pub fn event_type_name(&self) -> &'static str {
        use NodeContainerEvent::*;
        match self {
            NodeContainerPlaced(_) => "NodeContainerPlaced",
            NodeContainerRackAdded(_) => "NodeContainerRackAdded",
            NodeContainerVerticalContentAlignmentReversed(_) => {
                "NodeContainerVerticalContentAlignmentReversed"
            }
            NodeContainerTerminalEquipmentAdded(_) => "NodeContainerTerminalEquipmentAdded",
            NodeContainerTerminalEquipmentReferenceRemoved(_) => {
                "NodeContainerTerminalEquipmentReferenceRemoved"
            }
            NodeContainerSubrackMountMoved(_) => "NodeContainerSubrackMountMoved",
            NodeContainerRemoved(_) => "NodeContainerRemoved",
        }
    }
}
