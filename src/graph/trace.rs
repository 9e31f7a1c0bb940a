// Copyright (c) 2025 - Cowboy AI, Inc.
//! Trace Engine
//!
//! Read-only walks over one pinned graph version. Writers never block a trace
//! and a trace never sees half a mutation.
//!
//! Terminals are undirected: a walk leaves through any edge except the one it
//! arrived by. Internal nodes are directed: downstream follows their outgoing
//! edges, upstream their incoming ones. A splitter input therefore fans out
//! downstream but an output traced upstream reaches only the input.

use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use super::elements::GraphElement;
use super::utility_graph::UtilityGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceDirection {
    Upstream,
    Downstream,
}

/// Single path result; the start element is not included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceResult {
    pub upstream: Vec<GraphElement>,
    pub downstream: Vec<GraphElement>,
}

impl TraceResult {
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty() && self.downstream.is_empty()
    }

    pub fn upstream_ids(&self) -> Vec<Uuid> {
        self.upstream.iter().map(GraphElement::id).collect()
    }

    pub fn downstream_ids(&self) -> Vec<Uuid> {
        self.downstream.iter().map(GraphElement::id).collect()
    }
}

/// Every element reachable through all branches; the start is not included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedTraceResult {
    pub elements: Vec<GraphElement>,
}

impl AdvancedTraceResult {
    pub fn ids(&self) -> Vec<Uuid> {
        self.elements.iter().map(GraphElement::id).collect()
    }

    /// Customer termination terminals reached; these end their branch
    pub fn customer_terminations(&self) -> Vec<&GraphElement> {
        self.elements
            .iter()
            .filter(|e| e.is_customer_termination())
            .collect()
    }
}

impl UtilityGraph {
    /// Single path walk in both directions from any element
    ///
    /// Returns `None` for an unknown id and an empty result for an element
    /// that is not connected. A walk stops at a dummy end, at a customer
    /// termination, where it would revisit an element, or where the path
    /// forks.
    pub fn trace(&self, id: Uuid) -> Option<TraceResult> {
        self.trace_at(id, self.committed_version())
    }

    /// [`trace`](Self::trace) against a pinned graph version
    pub fn trace_at(&self, id: Uuid, version: u64) -> Option<TraceResult> {
        let start = self.element_at(id, version)?;
        let mut result = TraceResult::default();
        let mut visited = HashSet::from([id]);

        match &start {
            GraphElement::DisconnectedSegment(_) | GraphElement::DisconnectedTerminal(_) => {}
            GraphElement::ConnectedSegment(_) | GraphElement::InternalEdge(_) => {
                if let Some((from, to)) = start.endpoints() {
                    self.walk(version, from, id, TraceDirection::Upstream, &mut visited, &mut result.upstream);
                    self.walk(version, to, id, TraceDirection::Downstream, &mut visited, &mut result.downstream);
                }
            }
            GraphElement::ConnectedTerminal(_)
            | GraphElement::SimpleTerminal(_)
            | GraphElement::InternalNode(_) => {
                let (outgoing, incoming) = self.split_edges(version, &start);
                if let [edge] = incoming.as_slice() {
                    self.leave_by(version, id, edge, TraceDirection::Upstream, &mut visited, &mut result.upstream);
                }
                if let [edge] = outgoing.as_slice() {
                    self.leave_by(version, id, edge, TraceDirection::Downstream, &mut visited, &mut result.downstream);
                }
            }
        }

        Some(result)
    }

    /// Breadth-first walk through every branch in both directions
    ///
    /// Returns `None` for an unknown id.
    pub fn advanced_trace(&self, id: Uuid) -> Option<AdvancedTraceResult> {
        self.advanced_trace_at(id, self.committed_version())
    }

    /// [`advanced_trace`](Self::advanced_trace) against a pinned graph version
    pub fn advanced_trace_at(&self, id: Uuid, version: u64) -> Option<AdvancedTraceResult> {
        let start = self.element_at(id, version)?;
        let mut result = AdvancedTraceResult::default();
        let mut visited = HashSet::from([id]);
        let mut queue: VecDeque<(Option<Uuid>, Uuid, TraceDirection)> = VecDeque::new();

        match &start {
            GraphElement::DisconnectedSegment(_) | GraphElement::DisconnectedTerminal(_) => {}
            GraphElement::ConnectedSegment(_) | GraphElement::InternalEdge(_) => {
                if let Some((from, to)) = start.endpoints() {
                    queue.push_back((from, id, TraceDirection::Upstream));
                    queue.push_back((to, id, TraceDirection::Downstream));
                }
            }
            GraphElement::ConnectedTerminal(_)
            | GraphElement::SimpleTerminal(_)
            | GraphElement::InternalNode(_) => {
                let (outgoing, incoming) = self.split_edges(version, &start);
                let branches = incoming
                    .into_iter()
                    .map(|edge| (edge, TraceDirection::Upstream))
                    .chain(outgoing.into_iter().map(|edge| (edge, TraceDirection::Downstream)));
                for (edge, direction) in branches {
                    if visited.insert(edge.id()) {
                        queue.push_back((edge.opposite(id), edge.id(), direction));
                        if !edge.is_internal() {
                            result.elements.push(edge);
                        }
                    }
                }
            }
        }

        while let Some((node_id, arrived_via, direction)) = queue.pop_front() {
            let Some(node_id) = node_id else { continue };
            if !visited.insert(node_id) {
                continue;
            }
            let Some(node) = self.element_at(node_id, version) else {
                continue;
            };
            if !node.is_internal() {
                result.elements.push(node.clone());
            }
            if node.is_customer_termination() {
                continue;
            }
            for edge in self.candidates(version, &node, arrived_via, direction) {
                if visited.insert(edge.id()) {
                    queue.push_back((edge.opposite(node_id), edge.id(), direction));
                    if !edge.is_internal() {
                        result.elements.push(edge);
                    }
                }
            }
        }

        Some(result)
    }

    fn leave_by(
        &self,
        version: u64,
        node_id: Uuid,
        edge: &GraphElement,
        direction: TraceDirection,
        visited: &mut HashSet<Uuid>,
        out: &mut Vec<GraphElement>,
    ) {
        if !visited.insert(edge.id()) {
            return;
        }
        if !edge.is_internal() {
            out.push(edge.clone());
        }
        self.walk(version, edge.opposite(node_id), edge.id(), direction, visited, out);
    }

    fn walk(
        &self,
        version: u64,
        mut next: Option<Uuid>,
        mut arrived_via: Uuid,
        direction: TraceDirection,
        visited: &mut HashSet<Uuid>,
        out: &mut Vec<GraphElement>,
    ) {
        while let Some(node_id) = next {
            if !visited.insert(node_id) {
                return;
            }
            let Some(node) = self.element_at(node_id, version) else {
                return;
            };
            if !node.is_internal() {
                out.push(node.clone());
            }
            if node.is_customer_termination() {
                return;
            }

            let mut candidates = self.candidates(version, &node, arrived_via, direction);
            if candidates.len() != 1 {
                return;
            }
            let edge = candidates.remove(0);
            if !visited.insert(edge.id()) {
                return;
            }
            next = edge.opposite(node_id);
            arrived_via = edge.id();
            if !edge.is_internal() {
                out.push(edge);
            }
        }
    }

    /// Edges a walk may leave `node` by
    fn candidates(
        &self,
        version: u64,
        node: &GraphElement,
        arrived_via: Uuid,
        direction: TraceDirection,
    ) -> Vec<GraphElement> {
        let node_id = node.id();
        node.edges()
            .iter()
            .filter(|edge_id| **edge_id != arrived_via)
            .filter_map(|edge_id| self.element_at(*edge_id, version))
            .filter(|edge| match node {
                GraphElement::InternalNode(_) => {
                    let Some((from, to)) = edge.endpoints() else {
                        return false;
                    };
                    match direction {
                        TraceDirection::Downstream => from == Some(node_id),
                        TraceDirection::Upstream => to == Some(node_id),
                    }
                }
                _ => true,
            })
            .collect()
    }

    /// `(outgoing, incoming)` edges of a node
    fn split_edges(&self, version: u64, node: &GraphElement) -> (Vec<GraphElement>, Vec<GraphElement>) {
        let node_id = node.id();
        node.edges()
            .iter()
            .filter_map(|edge_id| self.element_at(*edge_id, version))
            .partition(|edge| matches!(edge.endpoints(), Some((Some(from), _)) if from == node_id))
    }
}
