// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectivity graph elements
//!
//! Unconnected terminals and segments are stored as placeholders holding only
//! the shared equipment record and two indices. They become full nodes and
//! edges when connected and fall back to placeholders when the last
//! connection goes away.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{SpanEquipment, SpanSegment, Terminal, TerminalEquipment};
use crate::errors::FatalError;

/// Placeholder for a segment with no terminal at either end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectedSegment {
    pub id: Uuid,
    pub span_equipment: Arc<SpanEquipment>,
    pub structure_index: u16,
    pub segment_index: u16,
}

/// Edge between terminal nodes; a missing end is a dummy end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSegment {
    pub id: Uuid,
    pub span_equipment: Arc<SpanEquipment>,
    pub structure_index: u16,
    pub segment_index: u16,
    pub from: Option<Uuid>,
    pub to: Option<Uuid>,
}

/// Placeholder for a terminal with no edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectedTerminal {
    pub id: Uuid,
    pub terminal_equipment: Arc<TerminalEquipment>,
    pub structure_index: u16,
    pub terminal_index: u16,
}

/// Terminal node with its incident edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedTerminal {
    pub id: Uuid,
    pub terminal_equipment: Arc<TerminalEquipment>,
    pub structure_index: u16,
    pub terminal_index: u16,
    pub edges: Vec<Uuid>,
}

/// Junction created where two span segments meet at a route node without any
/// terminal equipment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTerminal {
    pub id: Uuid,
    pub route_node_id: Uuid,
    pub edges: Vec<Uuid>,
}

/// Fixed wiring hub inside a terminal equipment (e.g. a splitter's fan-out point)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    pub id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub edges: Vec<Uuid>,
}

/// Directed edge between a terminal and an internal node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalEdge {
    pub id: Uuid,
    pub terminal_equipment_id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
}

/// Id of the internal edge wiring `terminal_id` to its internal node
///
/// Derived, so the same wiring gets the same ids on every replay.
pub fn internal_edge_id(internal_connectivity_node_id: Uuid, terminal_id: Uuid) -> Uuid {
    Uuid::new_v5(&internal_connectivity_node_id, terminal_id.as_bytes())
}

/// Any element of the connectivity graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphElement {
    DisconnectedSegment(DisconnectedSegment),
    ConnectedSegment(ConnectedSegment),
    DisconnectedTerminal(DisconnectedTerminal),
    ConnectedTerminal(ConnectedTerminal),
    SimpleTerminal(SimpleTerminal),
    InternalNode(InternalNode),
    InternalEdge(InternalEdge),
}

impl DisconnectedSegment {
    pub fn span_segment(&self) -> Result<&SpanSegment, FatalError> {
        span_segment(self.id, &self.span_equipment, self.structure_index, self.segment_index)
    }
}

impl ConnectedSegment {
    pub fn span_segment(&self) -> Result<&SpanSegment, FatalError> {
        span_segment(self.id, &self.span_equipment, self.structure_index, self.segment_index)
    }
}

impl DisconnectedTerminal {
    pub fn terminal(&self) -> Result<&Terminal, FatalError> {
        terminal(self.id, &self.terminal_equipment, self.structure_index, self.terminal_index)
    }

    /// Promote to a node carrying the given edges
    pub fn connect(&self, edges: Vec<Uuid>) -> ConnectedTerminal {
        ConnectedTerminal {
            id: self.id,
            terminal_equipment: Arc::clone(&self.terminal_equipment),
            structure_index: self.structure_index,
            terminal_index: self.terminal_index,
            edges,
        }
    }
}

impl ConnectedTerminal {
    pub fn terminal(&self) -> Result<&Terminal, FatalError> {
        terminal(self.id, &self.terminal_equipment, self.structure_index, self.terminal_index)
    }

    /// Edges other than the terminal's own internal wiring
    pub fn segment_edges(&self) -> impl Iterator<Item = &Uuid> {
        let internal = self
            .terminal()
            .ok()
            .and_then(|t| t.internal_connectivity_node_id)
            .map(|node| internal_edge_id(node, self.id));
        self.edges.iter().filter(move |e| Some(**e) != internal)
    }

    pub fn disconnect(&self) -> DisconnectedTerminal {
        DisconnectedTerminal {
            id: self.id,
            terminal_equipment: Arc::clone(&self.terminal_equipment),
            structure_index: self.structure_index,
            terminal_index: self.terminal_index,
        }
    }
}

fn span_segment(
    id: Uuid,
    equipment: &SpanEquipment,
    structure_index: u16,
    segment_index: u16,
) -> Result<&SpanSegment, FatalError> {
    equipment
        .span_structures
        .get(structure_index as usize)
        .and_then(|s| s.span_segments.get(segment_index as usize))
        .filter(|s| s.id == id)
        .ok_or_else(|| FatalError::GraphElementInconsistent {
            id,
            reason: format!(
                "span equipment {} has no such segment at {}/{}",
                equipment.id, structure_index, segment_index
            ),
        })
}

fn terminal(
    id: Uuid,
    equipment: &TerminalEquipment,
    structure_index: u16,
    terminal_index: u16,
) -> Result<&Terminal, FatalError> {
    equipment
        .terminal_structures
        .get(structure_index as usize)
        .and_then(|s| s.terminals.get(terminal_index as usize))
        .filter(|t| t.id == id)
        .ok_or_else(|| FatalError::GraphElementInconsistent {
            id,
            reason: format!(
                "terminal equipment {} has no such terminal at {}/{}",
                equipment.id, structure_index, terminal_index
            ),
        })
}

impl GraphElement {
    pub fn id(&self) -> Uuid {
        match self {
            GraphElement::DisconnectedSegment(e) => e.id,
            GraphElement::ConnectedSegment(e) => e.id,
            GraphElement::DisconnectedTerminal(e) => e.id,
            GraphElement::ConnectedTerminal(e) => e.id,
            GraphElement::SimpleTerminal(e) => e.id,
            GraphElement::InternalNode(e) => e.id,
            GraphElement::InternalEdge(e) => e.id,
        }
    }

    /// Nodes carry edge lists; edges and placeholders do not
    pub fn edges(&self) -> &[Uuid] {
        match self {
            GraphElement::ConnectedTerminal(e) => &e.edges,
            GraphElement::SimpleTerminal(e) => &e.edges,
            GraphElement::InternalNode(e) => &e.edges,
            _ => &[],
        }
    }

    /// `(from, to)` of an edge
    pub fn endpoints(&self) -> Option<(Option<Uuid>, Option<Uuid>)> {
        match self {
            GraphElement::ConnectedSegment(e) => Some((e.from, e.to)),
            GraphElement::InternalEdge(e) => Some((Some(e.from), Some(e.to))),
            _ => None,
        }
    }

    /// The end of an edge opposite to `node_id`
    pub fn opposite(&self, node_id: Uuid) -> Option<Uuid> {
        let (from, to) = self.endpoints()?;
        if from == Some(node_id) {
            to
        } else {
            from
        }
    }

    pub fn is_segment(&self) -> bool {
        matches!(
            self,
            GraphElement::DisconnectedSegment(_) | GraphElement::ConnectedSegment(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GraphElement::DisconnectedTerminal(_)
                | GraphElement::ConnectedTerminal(_)
                | GraphElement::SimpleTerminal(_)
        )
    }

    /// Internal nodes and edges are wiring detail, never reported by traces
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GraphElement::InternalNode(_) | GraphElement::InternalEdge(_)
        )
    }

    pub fn is_customer_termination(&self) -> bool {
        match self {
            GraphElement::ConnectedTerminal(e) => e.terminal_equipment.is_customer_termination,
            GraphElement::DisconnectedTerminal(e) => e.terminal_equipment.is_customer_termination,
            _ => false,
        }
    }

    /// Id of the span or terminal equipment owning the element
    pub fn equipment_id(&self) -> Option<Uuid> {
        match self {
            GraphElement::DisconnectedSegment(e) => Some(e.span_equipment.id),
            GraphElement::ConnectedSegment(e) => Some(e.span_equipment.id),
            GraphElement::DisconnectedTerminal(e) => Some(e.terminal_equipment.id),
            GraphElement::ConnectedTerminal(e) => Some(e.terminal_equipment.id),
            GraphElement::InternalNode(e) => Some(e.terminal_equipment_id),
            GraphElement::InternalEdge(e) => Some(e.terminal_equipment_id),
            GraphElement::SimpleTerminal(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GraphElement::DisconnectedSegment(_) => "disconnected_segment",
            GraphElement::ConnectedSegment(_) => "connected_segment",
            GraphElement::DisconnectedTerminal(_) => "disconnected_terminal",
            GraphElement::ConnectedTerminal(_) => "connected_terminal",
            GraphElement::SimpleTerminal(_) => "simple_terminal",
            GraphElement::InternalNode(_) => "internal_node",
            GraphElement::InternalEdge(_) => "internal_edge",
        }
    }
}

macro_rules! element_conversions {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for GraphElement {
                fn from(element: $variant) -> Self {
                    GraphElement::$variant(element)
                }
            }

            impl TryFrom<GraphElement> for $variant {
                type Error = GraphElement;

                fn try_from(element: GraphElement) -> Result<Self, Self::Error> {
                    match element {
                        GraphElement::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

element_conversions!(
    DisconnectedSegment,
    ConnectedSegment,
    DisconnectedTerminal,
    ConnectedTerminal,
    SimpleTerminal,
    InternalNode,
    InternalEdge,
);
