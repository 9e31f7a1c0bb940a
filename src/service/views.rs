// Copyright (c) 2025 - Cowboy AI, Inc.
//! Read models returned by the query surface

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{NodeContainer, SpanEquipment, TerminalEquipment};

/// GetEquipmentDetails request
///
/// Exactly one of the two lists must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetEquipmentDetails {
    pub equipment_ids: Vec<Uuid>,
    pub interest_ids: Vec<Uuid>,
}

impl GetEquipmentDetails {
    pub fn by_equipment_ids(equipment_ids: Vec<Uuid>) -> Self {
        Self {
            equipment_ids,
            interest_ids: Vec::new(),
        }
    }

    pub fn by_interest_ids(interest_ids: Vec<Uuid>) -> Self {
        Self {
            equipment_ids: Vec::new(),
            interest_ids,
        }
    }
}

/// Equipment found by a details query; unknown ids are left out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquipmentDetails {
    pub span_equipment: Vec<SpanEquipment>,
    pub terminal_equipment: Vec<TerminalEquipment>,
    pub node_containers: Vec<NodeContainer>,
}

impl EquipmentDetails {
    pub fn is_empty(&self) -> bool {
        self.span_equipment.is_empty() && self.terminal_equipment.is_empty() && self.node_containers.is_empty()
    }
}

/// One element on a traced path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceHop {
    pub element_id: Uuid,
    pub kind: &'static str,
    pub equipment_id: Option<Uuid>,
    pub equipment_name: Option<String>,
    /// Structure position for a segment, terminal name for a terminal
    pub part_name: Option<String>,
    /// From and to node for a segment, the node a terminal sits at
    pub route_node_names: Vec<String>,
}

/// Upstream end first, downstream end last
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityTraceView {
    pub element_id: Uuid,
    pub hops: Vec<TraceHop>,
    /// Index of `element_id` in `hops`
    pub start_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalEnd {
    pub terminal_id: Uuid,
    /// `None` for a junction terminal
    pub terminal_equipment_id: Option<Uuid>,
    pub equipment_name: Option<String>,
    pub terminal_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentConnectivity {
    pub span_segment_id: Uuid,
    pub structure_position: u16,
    pub structure_level: u8,
    pub from_route_node_name: String,
    pub to_route_node_name: String,
    pub from_terminal: Option<TerminalEnd>,
    pub to_terminal: Option<TerminalEnd>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanEquipmentConnectivityView {
    pub span_equipment_id: Uuid,
    pub name: Option<String>,
    pub segments: Vec<SegmentConnectivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerTermination {
    pub terminal_id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub equipment_name: Option<String>,
    pub terminal_name: String,
    pub address: Option<String>,
}

/// Customers affected if the queried equipment fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutageView {
    pub id: Uuid,
    pub customer_terminations: Vec<CustomerTermination>,
}
