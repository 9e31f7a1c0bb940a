// Copyright (c) 2025 - Cowboy AI, Inc.
//! Query side of the utility network service
//!
//! Queries read the projection at its latest committed version and resolve
//! names and addresses through the collaborators. A collaborator failure
//! fails the query.

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use super::views::*;
use super::{EventSourcedUtilityNetworkService, QueryError, QueryResult, UtilityNetworkQueries};
use crate::domain::{AddressLookup, RouteNetworkLookup, SpanEquipment};
use crate::event_store::EventStore;
use crate::graph::GraphElement;
use crate::projection::EquipmentRef;

impl<S, R, A> EventSourcedUtilityNetworkService<S, R, A>
where
    S: EventStore,
    R: RouteNetworkLookup,
    A: AddressLookup,
{
    fn route_node_name(&self, route_node_id: Uuid) -> QueryResult<String> {
        Ok(self
            .route_network
            .route_node_name(route_node_id)?
            .unwrap_or_else(|| route_node_id.to_string()))
    }

    /// Name of the node a terminal equipment's container stands at
    fn container_node_name(&self, node_container_id: Uuid) -> QueryResult<Vec<String>> {
        match self.projection.node_container(node_container_id) {
            Some(container) => Ok(vec![self.route_node_name(container.route_node_id)?]),
            None => Ok(Vec::new()),
        }
    }

    fn segment_node_names(&self, equipment: &SpanEquipment, from: u16, to: u16) -> QueryResult<(String, String)> {
        let name = |index: u16| match equipment.node_id_at(index) {
            Some(node) => self.route_node_name(node),
            None => Ok(String::new()),
        };
        Ok((name(from)?, name(to)?))
    }

    fn trace_hop(&self, element: &GraphElement) -> QueryResult<TraceHop> {
        let mut hop = TraceHop {
            element_id: element.id(),
            kind: element.kind(),
            equipment_id: element.equipment_id(),
            equipment_name: None,
            part_name: None,
            route_node_names: Vec::new(),
        };

        let segment = match element {
            GraphElement::DisconnectedSegment(e) => Some((&e.span_equipment, e.structure_index, e.span_segment()?)),
            GraphElement::ConnectedSegment(e) => Some((&e.span_equipment, e.structure_index, e.span_segment()?)),
            _ => None,
        };
        if let Some((equipment, structure_index, span_segment)) = segment {
            let (from, to) = self.segment_node_names(
                equipment,
                span_segment.from_node_of_interest_index,
                span_segment.to_node_of_interest_index,
            )?;
            hop.equipment_name = equipment.naming.name.clone();
            hop.part_name = equipment
                .span_structures
                .get(structure_index as usize)
                .map(|s| s.position.to_string());
            hop.route_node_names = vec![from, to];
            return Ok(hop);
        }

        match element {
            GraphElement::ConnectedTerminal(e) => {
                hop.equipment_name = e.terminal_equipment.naming.name.clone();
                hop.part_name = Some(e.terminal()?.name.clone());
                hop.route_node_names = self.container_node_name(e.terminal_equipment.node_container_id)?;
            }
            GraphElement::DisconnectedTerminal(e) => {
                hop.equipment_name = e.terminal_equipment.naming.name.clone();
                hop.part_name = Some(e.terminal()?.name.clone());
                hop.route_node_names = self.container_node_name(e.terminal_equipment.node_container_id)?;
            }
            GraphElement::SimpleTerminal(e) => {
                hop.route_node_names = vec![self.route_node_name(e.route_node_id)?];
            }
            _ => {}
        }
        Ok(hop)
    }

    fn terminal_end(&self, terminal_id: Uuid, version: u64) -> QueryResult<TerminalEnd> {
        let mut end = TerminalEnd {
            terminal_id,
            terminal_equipment_id: None,
            equipment_name: None,
            terminal_name: None,
        };
        let equipment = match self.projection.graph().element_at(terminal_id, version) {
            Some(GraphElement::ConnectedTerminal(e)) => Some((e.terminal_equipment.clone(), e.terminal()?.name.clone())),
            Some(GraphElement::DisconnectedTerminal(e)) => {
                Some((e.terminal_equipment.clone(), e.terminal()?.name.clone()))
            }
            _ => None,
        };
        if let Some((equipment, terminal_name)) = equipment {
            end.terminal_equipment_id = Some(equipment.id);
            end.equipment_name = equipment.naming.name.clone();
            end.terminal_name = Some(terminal_name);
        }
        Ok(end)
    }

    /// Graph elements an outage query starts from, as of `version`
    fn outage_starts(&self, id: Uuid, version: u64) -> QueryResult<Vec<Uuid>> {
        if let Some(equipment) = self.projection.span_equipment(id) {
            return Ok(equipment
                .segments()
                .map(|(_, _, s)| s.id)
                .filter(|s| self.projection.graph().element_at(*s, version).is_some())
                .collect());
        }
        if let Some(equipment) = self.projection.terminal_equipment(id) {
            return Ok(equipment.terminals().map(|(_, _, t)| t.id).collect());
        }
        match self.projection.graph().element_at(id, version) {
            Some(_) => Ok(vec![id]),
            None => Err(QueryError::NotFound(id)),
        }
    }

    fn customer_termination(&self, element: &GraphElement) -> QueryResult<Option<CustomerTermination>> {
        let (equipment, terminal) = match element {
            GraphElement::ConnectedTerminal(e) => (&e.terminal_equipment, e.terminal()?),
            GraphElement::DisconnectedTerminal(e) => (&e.terminal_equipment, e.terminal()?),
            _ => return Ok(None),
        };
        let address = match equipment.address.as_ref().and_then(|a| a.primary_address_id()) {
            Some(address_id) => self.addresses.address_display(address_id)?,
            None => None,
        };
        Ok(Some(CustomerTermination {
            terminal_id: terminal.id,
            terminal_equipment_id: equipment.id,
            equipment_name: equipment.naming.name.clone(),
            terminal_name: terminal.name.clone(),
            address,
        }))
    }
}

#[async_trait]
impl<S, R, A> UtilityNetworkQueries for EventSourcedUtilityNetworkService<S, R, A>
where
    S: EventStore,
    R: RouteNetworkLookup,
    A: AddressLookup,
{
    async fn get_equipment_details(&self, query: GetEquipmentDetails) -> QueryResult<EquipmentDetails> {
        let ids = match (query.equipment_ids.is_empty(), query.interest_ids.is_empty()) {
            (false, true) => query.equipment_ids,
            (true, false) => query
                .interest_ids
                .iter()
                .filter_map(|interest| self.projection.equipment_by_interest(*interest))
                .map(|owner| match owner {
                    EquipmentRef::SpanEquipment(id) | EquipmentRef::NodeContainer(id) => id,
                })
                .collect(),
            (false, false) => {
                return Err(QueryError::InvalidFilter(
                    "equipment ids and interest ids cannot be combined",
                ))
            }
            (true, true) => return Err(QueryError::InvalidFilter("no equipment or interest ids given")),
        };

        let mut details = EquipmentDetails::default();
        for id in ids {
            if let Some(equipment) = self.projection.span_equipment(id) {
                details.span_equipment.push((*equipment).clone());
            } else if let Some(equipment) = self.projection.terminal_equipment(id) {
                details.terminal_equipment.push((*equipment).clone());
            } else if let Some(container) = self.projection.node_container(id) {
                details.node_containers.push((*container).clone());
            }
        }
        Ok(details)
    }

    async fn get_connectivity_trace_view(&self, element_id: Uuid) -> QueryResult<ConnectivityTraceView> {
        let graph = self.projection.graph();
        let version = graph.committed_version();
        let start = graph
            .element_at(element_id, version)
            .ok_or(QueryError::NotFound(element_id))?;
        let trace = graph
            .trace_at(element_id, version)
            .ok_or(QueryError::NotFound(element_id))?;

        let mut hops = Vec::with_capacity(trace.upstream.len() + trace.downstream.len() + 1);
        for element in trace.upstream.iter().rev() {
            hops.push(self.trace_hop(element)?);
        }
        let start_index = hops.len();
        hops.push(self.trace_hop(&start)?);
        for element in &trace.downstream {
            hops.push(self.trace_hop(element)?);
        }

        Ok(ConnectivityTraceView {
            element_id,
            hops,
            start_index,
        })
    }

    async fn get_span_equipment_connectivity_view(
        &self,
        span_equipment_ids: Vec<Uuid>,
    ) -> QueryResult<Vec<SpanEquipmentConnectivityView>> {
        let version = self.projection.graph().committed_version();
        let mut views = Vec::with_capacity(span_equipment_ids.len());
        for id in span_equipment_ids {
            let equipment = self.projection.span_equipment(id).ok_or(QueryError::NotFound(id))?;

            let mut segments = Vec::new();
            for structure in equipment.span_structures.iter().filter(|s| !s.deleted) {
                for segment in &structure.span_segments {
                    let (from, to) = self.segment_node_names(
                        &equipment,
                        segment.from_node_of_interest_index,
                        segment.to_node_of_interest_index,
                    )?;
                    segments.push(SegmentConnectivity {
                        span_segment_id: segment.id,
                        structure_position: structure.position,
                        structure_level: structure.level,
                        from_route_node_name: from,
                        to_route_node_name: to,
                        from_terminal: segment
                            .from_terminal_id
                            .map(|t| self.terminal_end(t, version))
                            .transpose()?,
                        to_terminal: segment
                            .to_terminal_id
                            .map(|t| self.terminal_end(t, version))
                            .transpose()?,
                    });
                }
            }

            views.push(SpanEquipmentConnectivityView {
                span_equipment_id: id,
                name: equipment.naming.name.clone(),
                segments,
            });
        }
        Ok(views)
    }

    async fn get_outage_view(&self, id: Uuid) -> QueryResult<OutageView> {
        let graph = self.projection.graph();
        let version = graph.committed_version();
        let mut seen = HashSet::new();
        let mut customer_terminations = Vec::new();

        for start in self.outage_starts(id, version)? {
            let Some(reached) = graph.advanced_trace_at(start, version) else {
                continue;
            };
            for element in reached.customer_terminations() {
                if !seen.insert(element.id()) {
                    continue;
                }
                if let Some(termination) = self.customer_termination(element)? {
                    customer_terminations.push(termination);
                }
            }
        }

        Ok(OutageView {
            id,
            customer_terminations,
        })
    }
}
