// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectivity Graph
//!
//! Terminals are nodes, connected span segments are edges. Every mutating
//! operation runs in one write transaction and publishes exactly one new
//! version, so concurrent traces see the graph either before or after it.
//!
//! All span equipment mutations funnel into one reconcile step that compares
//! the equipment record before and after the event and moves edges between
//! terminals accordingly. That keeps the graph equal to the equipment's
//! current segment topology after every event.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::elements::*;
use super::versioned::{Transaction, VersionedIndex};
use crate::domain::{
    SpanEquipment, SpanSegment, SpanSegmentCut, SpanSegmentToTerminalConnect, TerminalDirection,
    TerminalEquipment,
};
use crate::errors::FatalError;

type Txn<'a> = Transaction<'a, GraphElement>;

/// Versioned connectivity graph
#[derive(Debug)]
pub struct UtilityGraph {
    elements: VersionedIndex<GraphElement>,
}

impl UtilityGraph {
    pub fn new(version_retention: u64) -> Self {
        Self {
            elements: VersionedIndex::new(version_retention),
        }
    }

    pub fn committed_version(&self) -> u64 {
        self.elements.committed_version()
    }

    /// Any element at the latest committed version
    pub fn element(&self, id: Uuid) -> Option<GraphElement> {
        self.elements.get(id)
    }

    /// Any element as of a pinned version
    pub fn element_at(&self, id: Uuid, version: u64) -> Option<GraphElement> {
        self.elements.get_at(id, version)
    }

    /// Typed lookup; `None` when missing or of a different kind
    ///
    /// ```rust,ignore
    /// let terminal: Option<ConnectedTerminal> = graph.lookup(terminal_id);
    /// ```
    pub fn lookup<T>(&self, id: Uuid) -> Option<T>
    where
        T: TryFrom<GraphElement>,
    {
        self.elements.get(id).and_then(|e| T::try_from(e).ok())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len_at(self.committed_version())
    }

    pub fn elements(&self) -> Vec<GraphElement> {
        self.elements.values_at(self.committed_version())
    }

    /// Insert a placeholder for one segment
    pub fn register_disconnected(
        &self,
        span_equipment: &Arc<SpanEquipment>,
        structure_index: u16,
        segment_index: u16,
    ) -> Result<u64, FatalError> {
        let segment_id = span_equipment
            .span_structures
            .get(structure_index as usize)
            .and_then(|s| s.span_segments.get(segment_index as usize))
            .map(|s| s.id)
            .ok_or_else(|| FatalError::GraphElementInconsistent {
                id: span_equipment.id,
                reason: format!("no segment at {}/{}", structure_index, segment_index),
            })?;

        let mut txn = self.elements.begin();
        if txn.contains(segment_id) {
            return Err(FatalError::DuplicateGraphElement(segment_id));
        }
        txn.insert(
            segment_id,
            DisconnectedSegment {
                id: segment_id,
                span_equipment: Arc::clone(span_equipment),
                structure_index,
                segment_index,
            }
            .into(),
        );
        Ok(self.commit(txn, "register_disconnected"))
    }

    /// Register every segment of a newly placed span equipment
    pub fn register_span_equipment(&self, span_equipment: &Arc<SpanEquipment>) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_span_equipment(&mut txn, None, Some(span_equipment))?;
        Ok(self.commit(txn, "register_span_equipment"))
    }

    /// Replace cut segments by their two halves
    ///
    /// The old segments must be present and owned by the equipment; the new
    /// ids must be unused across the whole graph.
    pub fn apply_cut(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
        cuts: &[SpanSegmentCut],
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        for cut in cuts {
            expect_owned_segment(&txn, cut.old_span_segment_id, before.id)?;
            for new_id in [cut.new_span_segment_id_1, cut.new_span_segment_id_2] {
                if txn.contains(new_id) {
                    return Err(FatalError::DuplicateGraphElement(new_id));
                }
            }
        }
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "apply_cut"))
    }

    /// Attach segment ends to terminals of terminal equipment
    pub fn apply_connect(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
        connects: &[SpanSegmentToTerminalConnect],
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        for connect in connects {
            expect_owned_segment(&txn, connect.span_segment_id, before.id)?;
            match txn.get(connect.terminal_id) {
                Some(element) if element.is_terminal() => {}
                Some(element) => {
                    return Err(inconsistent(connect.terminal_id, element.kind(), "a terminal"))
                }
                None => return Err(FatalError::GraphElementNotFound(connect.terminal_id)),
            }
        }
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "apply_connect"))
    }

    /// Attach segment ends to junction terminals, creating them on first use
    pub fn apply_connect_at_route_node(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
        route_node_id: Uuid,
        connects: &[SpanSegmentToTerminalConnect],
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        for connect in connects {
            expect_owned_segment(&txn, connect.span_segment_id, before.id)?;
            match txn.get(connect.terminal_id) {
                None => txn.insert(
                    connect.terminal_id,
                    SimpleTerminal {
                        id: connect.terminal_id,
                        route_node_id,
                        edges: Vec::new(),
                    }
                    .into(),
                ),
                Some(GraphElement::SimpleTerminal(_)) => {}
                Some(element) => {
                    return Err(inconsistent(connect.terminal_id, element.kind(), "a junction terminal"))
                }
            }
        }
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "apply_connect_at_route_node"))
    }

    /// Detach segment ends from terminals
    pub fn apply_disconnect(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "apply_disconnect"))
    }

    /// Point every element of the equipment at its new record
    ///
    /// Used for affix, detach, move and structure removal; segments of
    /// removed structures leave the graph.
    pub fn update_span_equipment(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "update_span_equipment"))
    }

    /// Take over the absorbed equipment's segments into the merged record
    pub fn apply_merge(
        &self,
        before: &SpanEquipment,
        after: &Arc<SpanEquipment>,
        absorbed: &SpanEquipment,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        for (_, _, segment) in live_segments(absorbed) {
            remove_segment(&mut txn, segment.id)?;
        }
        sync_span_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "apply_merge"))
    }

    pub fn remove_span_equipment(&self, span_equipment: &SpanEquipment) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_span_equipment(&mut txn, Some(span_equipment), None)?;
        Ok(self.commit(txn, "remove_span_equipment"))
    }

    pub fn register_terminal_equipment(
        &self,
        terminal_equipment: &Arc<TerminalEquipment>,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_terminal_equipment(&mut txn, None, Some(terminal_equipment))?;
        Ok(self.commit(txn, "register_terminal_equipment"))
    }

    pub fn update_terminal_equipment(
        &self,
        before: &TerminalEquipment,
        after: &Arc<TerminalEquipment>,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_terminal_equipment(&mut txn, Some(before), Some(after))?;
        Ok(self.commit(txn, "update_terminal_equipment"))
    }

    pub fn remove_terminal_equipment(
        &self,
        terminal_equipment: &TerminalEquipment,
    ) -> Result<u64, FatalError> {
        let mut txn = self.elements.begin();
        sync_terminal_equipment(&mut txn, Some(terminal_equipment), None)?;
        Ok(self.commit(txn, "remove_terminal_equipment"))
    }

    /// Whether a span segment is attached to the terminal
    ///
    /// Internal wiring alone does not count.
    pub fn is_terminal_connected(&self, terminal_id: Uuid) -> bool {
        self.lookup::<ConnectedTerminal>(terminal_id)
            .map_or(false, |t| t.segment_edges().next().is_some())
    }

    /// Whether any terminal of the equipment has a span segment attached
    pub fn has_connected_terminals(&self, terminal_equipment: &TerminalEquipment) -> bool {
        terminal_equipment
            .terminals()
            .any(|(_, _, t)| self.is_terminal_connected(t.id))
    }

    fn commit(&self, txn: Txn<'_>, operation: &'static str) -> u64 {
        let version = txn.commit();
        debug!(operation, version, "Graph version committed");
        version
    }
}

fn inconsistent(id: Uuid, found: &str, expected: &str) -> FatalError {
    FatalError::GraphElementInconsistent {
        id,
        reason: format!("found {} where {} was expected", found, expected),
    }
}

fn push_unique(edges: &mut Vec<Uuid>, edge_id: Uuid) {
    if !edges.contains(&edge_id) {
        edges.push(edge_id);
    }
}

/// Segments of structures that have not been removed
fn live_segments(equipment: &SpanEquipment) -> impl Iterator<Item = (u16, u16, &SpanSegment)> {
    equipment
        .span_structures
        .iter()
        .enumerate()
        .filter(|(_, structure)| !structure.deleted)
        .flat_map(|(si, structure)| {
            structure
                .span_segments
                .iter()
                .enumerate()
                .map(move |(gi, segment)| (si as u16, gi as u16, segment))
        })
}

fn expect_owned_segment(txn: &Txn<'_>, segment_id: Uuid, span_equipment_id: Uuid) -> Result<(), FatalError> {
    match txn.get(segment_id) {
        Some(element) if element.is_segment() && element.equipment_id() == Some(span_equipment_id) => Ok(()),
        Some(element) => Err(inconsistent(segment_id, element.kind(), "a segment of this equipment")),
        None => Err(FatalError::GraphElementNotFound(segment_id)),
    }
}

fn sync_span_equipment(
    txn: &mut Txn<'_>,
    before: Option<&SpanEquipment>,
    after: Option<&Arc<SpanEquipment>>,
) -> Result<(), FatalError> {
    let live: HashSet<Uuid> = after
        .map(|equipment| live_segments(equipment).map(|(_, _, s)| s.id).collect())
        .unwrap_or_default();

    if let Some(before) = before {
        for (_, _, segment) in live_segments(before) {
            if !live.contains(&segment.id) {
                remove_segment(txn, segment.id)?;
            }
        }
    }

    let Some(after) = after else {
        return Ok(());
    };

    for (structure_index, segment_index, segment) in live_segments(after) {
        let (old_from, old_to) = match txn.get(segment.id) {
            None => (None, None),
            Some(GraphElement::DisconnectedSegment(d)) if d.span_equipment.id == after.id => (None, None),
            Some(GraphElement::ConnectedSegment(c)) if c.span_equipment.id == after.id => (c.from, c.to),
            Some(_) => return Err(FatalError::DuplicateGraphElement(segment.id)),
        };
        let (new_from, new_to) = (segment.from_terminal_id, segment.to_terminal_id);

        if old_from != new_from {
            if let Some(terminal_id) = old_from {
                detach(txn, terminal_id, segment.id)?;
            }
        }
        if old_to != new_to {
            if let Some(terminal_id) = old_to {
                detach(txn, terminal_id, segment.id)?;
            }
        }
        if old_from != new_from {
            if let Some(terminal_id) = new_from {
                attach(txn, terminal_id, segment.id)?;
            }
        }
        if old_to != new_to {
            if let Some(terminal_id) = new_to {
                attach(txn, terminal_id, segment.id)?;
            }
        }

        let element = if segment.is_connected() {
            GraphElement::from(ConnectedSegment {
                id: segment.id,
                span_equipment: Arc::clone(after),
                structure_index,
                segment_index,
                from: new_from,
                to: new_to,
            })
        } else {
            GraphElement::from(DisconnectedSegment {
                id: segment.id,
                span_equipment: Arc::clone(after),
                structure_index,
                segment_index,
            })
        };
        txn.insert(segment.id, element);
    }

    Ok(())
}

fn remove_segment(txn: &mut Txn<'_>, segment_id: Uuid) -> Result<(), FatalError> {
    match txn.get(segment_id) {
        Some(GraphElement::ConnectedSegment(c)) => {
            if let Some(from) = c.from {
                detach(txn, from, segment_id)?;
            }
            if let Some(to) = c.to.filter(|to| Some(*to) != c.from) {
                detach(txn, to, segment_id)?;
            }
        }
        Some(GraphElement::DisconnectedSegment(_)) => {}
        Some(element) => return Err(inconsistent(segment_id, element.kind(), "a segment")),
        None => return Err(FatalError::GraphElementNotFound(segment_id)),
    }
    txn.remove(segment_id);
    Ok(())
}

fn attach(txn: &mut Txn<'_>, terminal_id: Uuid, edge_id: Uuid) -> Result<(), FatalError> {
    match txn.get(terminal_id) {
        Some(GraphElement::ConnectedTerminal(mut terminal)) => {
            push_unique(&mut terminal.edges, edge_id);
            txn.insert(terminal_id, terminal.into());
        }
        Some(GraphElement::SimpleTerminal(mut terminal)) => {
            push_unique(&mut terminal.edges, edge_id);
            txn.insert(terminal_id, terminal.into());
        }
        Some(GraphElement::DisconnectedTerminal(placeholder)) => {
            let internal_node = placeholder.terminal()?.internal_connectivity_node_id;
            let equipment = Arc::clone(&placeholder.terminal_equipment);
            txn.insert(terminal_id, placeholder.connect(vec![edge_id]).into());
            if let Some(node_id) = internal_node {
                ensure_internal_wiring(txn, &equipment, node_id)?;
            }
        }
        Some(element) => return Err(inconsistent(terminal_id, element.kind(), "a terminal")),
        None => return Err(FatalError::GraphElementNotFound(terminal_id)),
    }
    Ok(())
}

/// Create the internal node and wire every terminal sharing it, once
fn ensure_internal_wiring(
    txn: &mut Txn<'_>,
    equipment: &Arc<TerminalEquipment>,
    node_id: Uuid,
) -> Result<(), FatalError> {
    if txn.contains(node_id) {
        return Ok(());
    }

    let mut node = InternalNode {
        id: node_id,
        terminal_equipment_id: equipment.id,
        edges: Vec::new(),
    };

    for (_, _, terminal) in equipment.terminals_sharing_node(node_id) {
        let edge_id = internal_edge_id(node_id, terminal.id);
        let (from, to) = match terminal.direction {
            TerminalDirection::Outbound => (node_id, terminal.id),
            TerminalDirection::Inbound | TerminalDirection::Bidirectional => (terminal.id, node_id),
        };
        txn.insert(
            edge_id,
            InternalEdge {
                id: edge_id,
                terminal_equipment_id: equipment.id,
                from,
                to,
            }
            .into(),
        );
        node.edges.push(edge_id);

        match txn.get(terminal.id) {
            Some(GraphElement::ConnectedTerminal(mut connected)) => {
                push_unique(&mut connected.edges, edge_id);
                txn.insert(terminal.id, connected.into());
            }
            Some(GraphElement::DisconnectedTerminal(placeholder)) => {
                txn.insert(terminal.id, placeholder.connect(vec![edge_id]).into());
            }
            Some(element) => return Err(inconsistent(terminal.id, element.kind(), "a terminal")),
            None => return Err(FatalError::GraphElementNotFound(terminal.id)),
        }
    }

    debug!(%node_id, edges = node.edges.len(), "Internal connectivity node wired");
    txn.insert(node_id, node.into());
    Ok(())
}

fn detach(txn: &mut Txn<'_>, terminal_id: Uuid, edge_id: Uuid) -> Result<(), FatalError> {
    match txn.get(terminal_id) {
        Some(GraphElement::ConnectedTerminal(mut terminal)) => {
            terminal.edges.retain(|e| *e != edge_id);
            let in_use = terminal.segment_edges().next().is_some();
            let internal_node = terminal.terminal()?.internal_connectivity_node_id;
            match internal_node {
                Some(node_id) => {
                    txn.insert(terminal_id, terminal.into());
                    if !in_use {
                        release_internal_wiring(txn, node_id)?;
                    }
                }
                None if in_use => txn.insert(terminal_id, terminal.into()),
                None => txn.insert(terminal_id, terminal.disconnect().into()),
            }
        }
        Some(GraphElement::SimpleTerminal(mut terminal)) => {
            terminal.edges.retain(|e| *e != edge_id);
            if terminal.edges.is_empty() {
                txn.remove(terminal_id);
            } else {
                txn.insert(terminal_id, terminal.into());
            }
        }
        Some(element) => return Err(inconsistent(terminal_id, element.kind(), "a connected terminal")),
        None => return Err(FatalError::GraphElementNotFound(terminal_id)),
    }
    Ok(())
}

/// Tear the internal wiring down once no wired terminal carries a segment
fn release_internal_wiring(txn: &mut Txn<'_>, node_id: Uuid) -> Result<(), FatalError> {
    let node = match txn.get(node_id) {
        Some(GraphElement::InternalNode(node)) => node,
        Some(element) => return Err(inconsistent(node_id, element.kind(), "an internal node")),
        None => return Err(FatalError::GraphElementNotFound(node_id)),
    };

    let mut wired = Vec::with_capacity(node.edges.len());
    for edge_id in &node.edges {
        let edge = txn
            .get(*edge_id)
            .ok_or(FatalError::GraphElementNotFound(*edge_id))?;
        let terminal_id = edge
            .opposite(node_id)
            .ok_or(FatalError::GraphElementNotFound(*edge_id))?;
        match txn.get(terminal_id) {
            Some(GraphElement::ConnectedTerminal(terminal)) => {
                if terminal.segment_edges().next().is_some() {
                    return Ok(());
                }
                wired.push((*edge_id, terminal_id, terminal));
            }
            Some(element) => return Err(inconsistent(terminal_id, element.kind(), "a wired terminal")),
            None => return Err(FatalError::GraphElementNotFound(terminal_id)),
        }
    }

    for (edge_id, terminal_id, terminal) in wired {
        txn.remove(edge_id);
        txn.insert(terminal_id, terminal.disconnect().into());
    }
    txn.remove(node_id);
    debug!(%node_id, "Internal connectivity node released");
    Ok(())
}

fn sync_terminal_equipment(
    txn: &mut Txn<'_>,
    before: Option<&TerminalEquipment>,
    after: Option<&Arc<TerminalEquipment>>,
) -> Result<(), FatalError> {
    let live: HashSet<Uuid> = after
        .map(|equipment| equipment.terminals().map(|(_, _, t)| t.id).collect())
        .unwrap_or_default();

    if let Some(before) = before {
        for (_, _, terminal) in before.terminals() {
            if live.contains(&terminal.id) {
                continue;
            }
            match txn.get(terminal.id) {
                Some(GraphElement::DisconnectedTerminal(_)) => txn.remove(terminal.id),
                Some(element) => {
                    return Err(inconsistent(terminal.id, element.kind(), "an unconnected terminal"))
                }
                None => return Err(FatalError::GraphElementNotFound(terminal.id)),
            }
        }
    }

    let Some(after) = after else {
        return Ok(());
    };

    for (si, ti, terminal) in after.terminals() {
        let (structure_index, terminal_index) = (si as u16, ti as u16);
        let element = match txn.get(terminal.id) {
            None => GraphElement::from(DisconnectedTerminal {
                id: terminal.id,
                terminal_equipment: Arc::clone(after),
                structure_index,
                terminal_index,
            }),
            Some(GraphElement::DisconnectedTerminal(d)) if d.terminal_equipment.id == after.id => {
                GraphElement::from(DisconnectedTerminal {
                    id: terminal.id,
                    terminal_equipment: Arc::clone(after),
                    structure_index,
                    terminal_index,
                })
            }
            Some(GraphElement::ConnectedTerminal(c)) if c.terminal_equipment.id == after.id => {
                GraphElement::from(ConnectedTerminal {
                    id: terminal.id,
                    terminal_equipment: Arc::clone(after),
                    structure_index,
                    terminal_index,
                    edges: c.edges,
                })
            }
            Some(_) => return Err(FatalError::DuplicateGraphElement(terminal.id)),
        };
        txn.insert(terminal.id, element);
    }

    Ok(())
}
