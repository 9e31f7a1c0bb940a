// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command side of the utility network service

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{EventSourcedUtilityNetworkService, ServiceError, ServiceResult, UtilityNetworkService};
use crate::aggregate::{
    node_container, span_equipment, terminal_equipment, AddTerminalEquipmentReferenceCommand,
    AffixSpanEquipmentToNodeContainerCommand, ChangeSubrackMountCommand, CommandContext,
    ConnectSpanSegmentsAtRouteNodeCommand, ConnectSpanSegmentsError, ConnectSpanSegmentsToTerminalsCommand,
    CutSpanSegmentsCommand, DetachSpanEquipmentFromNodeContainerCommand, DisconnectSpanSegmentsCommand,
    MergeSpanEquipmentCommand, MoveSpanEquipmentCommand, NodeContainerState, PlaceNodeContainerCommand,
    PlaceRackCommand, PlaceSpanEquipmentCommand, PlaceTerminalEquipmentCommand,
    RemoveNodeContainerCommand, RemoveSpanEquipmentCommand, RemoveSpanStructureCommand,
    RemoveTerminalEquipmentCommand, RemoveTerminalEquipmentReferenceCommand,
    ReverseVerticalContentAlignmentCommand, SpanEquipmentState, TerminalEquipmentState,
    UpdateTerminalEquipmentPropertiesCommand,
};
use crate::domain::{AddressLookup, NodeContainer, RouteNetworkLookup, SpanEquipment, TerminalEquipment};
use crate::errors::FatalError;
use crate::event_store::EventStore;
use crate::events::{NodeContainerEvent, SpanEquipmentEvent, TerminalEquipmentEvent, UtilityNetworkEvent};
use crate::graph::GraphElement;

const SPAN_EQUIPMENT: &str = "span_equipment";
const TERMINAL_EQUIPMENT: &str = "terminal_equipment";
const NODE_CONTAINER: &str = "node_container";

fn require<T>(record: Option<Arc<T>>, kind: &'static str, id: Uuid) -> ServiceResult<Arc<T>> {
    record.ok_or(ServiceError::NotFound { kind, id })
}

/// A failed second step leaves the first one committed
fn second_step(step: &'static str, result: ServiceResult<()>) -> ServiceResult<()> {
    result.map_err(|cause| FatalError::CrossAggregateStepFailed(format!("{}: {}", step, cause)).into())
}

impl<S, R, A> EventSourcedUtilityNetworkService<S, R, A>
where
    S: EventStore,
    R: RouteNetworkLookup,
    A: AddressLookup,
{
    async fn load(&self, aggregate_id: Uuid) -> ServiceResult<Vec<UtilityNetworkEvent>> {
        let stored = self.event_store.read_events(aggregate_id).await?;
        Ok(stored.into_iter().map(|e| e.data).collect())
    }

    async fn load_span_equipment(&self, id: Uuid) -> ServiceResult<SpanEquipmentState> {
        let events: Vec<SpanEquipmentEvent> = self
            .load(id)
            .await?
            .into_iter()
            .filter_map(|event| match event {
                UtilityNetworkEvent::SpanEquipment(e) => Some(e),
                _ => None,
            })
            .collect();
        Ok(SpanEquipmentState::from_events(id, &events))
    }

    async fn load_terminal_equipment(&self, id: Uuid) -> ServiceResult<TerminalEquipmentState> {
        let events: Vec<TerminalEquipmentEvent> = self
            .load(id)
            .await?
            .into_iter()
            .filter_map(|event| match event {
                UtilityNetworkEvent::TerminalEquipment(e) => Some(e),
                _ => None,
            })
            .collect();
        Ok(TerminalEquipmentState::from_events(id, &events))
    }

    async fn load_node_container(&self, id: Uuid) -> ServiceResult<NodeContainerState> {
        let events: Vec<NodeContainerEvent> = self
            .load(id)
            .await?
            .into_iter()
            .filter_map(|event| match event {
                UtilityNetworkEvent::NodeContainer(e) => Some(e),
                _ => None,
            })
            .collect();
        Ok(NodeContainerState::from_events(id, &events))
    }

    /// Append at the expected version and apply what was stored
    async fn commit(
        &self,
        aggregate_id: Uuid,
        events: Vec<UtilityNetworkEvent>,
        expected_version: u64,
    ) -> ServiceResult<()> {
        let stored = self
            .event_store
            .append(aggregate_id, events, Some(expected_version))
            .await?;
        for event in &stored {
            self.projection.apply_stored(event)?;
        }
        debug!(%aggregate_id, events = stored.len(), "Command committed");
        Ok(())
    }

    async fn existing_span_equipment(
        &self,
        id: Uuid,
    ) -> ServiceResult<(SpanEquipmentState, Arc<SpanEquipment>)> {
        let state = self.load_span_equipment(id).await?;
        let equipment = require(state.span_equipment.clone(), SPAN_EQUIPMENT, id)?;
        Ok((state, equipment))
    }

    async fn existing_terminal_equipment(
        &self,
        id: Uuid,
    ) -> ServiceResult<(TerminalEquipmentState, Arc<TerminalEquipment>)> {
        let state = self.load_terminal_equipment(id).await?;
        let equipment = require(state.terminal_equipment.clone(), TERMINAL_EQUIPMENT, id)?;
        Ok((state, equipment))
    }

    async fn existing_node_container(
        &self,
        id: Uuid,
    ) -> ServiceResult<(NodeContainerState, Arc<NodeContainer>)> {
        let state = self.load_node_container(id).await?;
        let container = require(state.node_container.clone(), NODE_CONTAINER, id)?;
        Ok((state, container))
    }

    /// Second half of terminal equipment removal
    async fn drop_container_reference(
        &self,
        equipment: &TerminalEquipment,
        context: CommandContext,
    ) -> ServiceResult<()> {
        let (state, container) = self
            .existing_node_container(equipment.node_container_id)
            .await?;
        let event = node_container::handle_remove_terminal_equipment_reference(
            &container,
            RemoveTerminalEquipmentReferenceCommand {
                node_container_id: container.id,
                terminal_equipment_id: equipment.id,
                context,
            },
        )?;
        self.commit(container.id, vec![event.into()], state.version).await
    }

    /// Owner of each segment, in first-seen order
    fn segment_owners(&self, span_segment_ids: &[Uuid]) -> ServiceResult<Vec<Uuid>> {
        let mut owners = Vec::new();
        for segment_id in span_segment_ids {
            let owner = self
                .projection
                .graph()
                .element(*segment_id)
                .filter(GraphElement::is_segment)
                .and_then(|e| e.equipment_id())
                .ok_or_else(|| {
                    ServiceError::Rejected(ConnectSpanSegmentsError::SpanSegmentNotFound(*segment_id).into())
                })?;
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        Ok(owners)
    }
}

#[async_trait]
impl<S, R, A> UtilityNetworkService for EventSourcedUtilityNetworkService<S, R, A>
where
    S: EventStore,
    R: RouteNetworkLookup,
    A: AddressLookup,
{
    async fn place_span_equipment(&self, command: PlaceSpanEquipmentCommand) -> ServiceResult<Uuid> {
        let _writer = self.writer.lock().await;
        let id = command.span_equipment_id;

        let state = self.load_span_equipment(id).await?;
        let interest = self.route_network.interest(command.interest_id)?;
        let projection = &self.projection;
        let event = span_equipment::handle_place_span_equipment(&state, command, &self.catalog, &interest, |segment| {
            projection.segment_exists(segment)
        })?;

        self.commit(id, vec![event.into()], state.version).await?;
        info!(span_equipment_id = %id, "Span equipment placed");
        Ok(id)
    }

    async fn cut_span_segments(&self, command: CutSpanSegmentsCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let walk = self.route_network.interest(equipment.walk_of_interest_id)?;
        let event = span_equipment::handle_cut_span_segments(&equipment, command, &walk)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn connect_span_segments_to_terminals(
        &self,
        command: ConnectSpanSegmentsToTerminalsCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let event =
            span_equipment::handle_connect_span_segments_to_terminals(&equipment, command, self.projection.graph())?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn connect_span_segments_at_route_node(
        &self,
        command: ConnectSpanSegmentsAtRouteNodeCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        if command.span_segment_ids.is_empty() {
            return Err(ServiceError::Rejected(ConnectSpanSegmentsError::NoConnects.into()));
        }

        let owners = self.segment_owners(&command.span_segment_ids)?;
        let &[first_id, second_id] = owners.as_slice() else {
            return Err(ServiceError::Rejected(ConnectSpanSegmentsError::ExpectedTwoSpanEquipment.into()));
        };
        let (first_state, first) = self.existing_span_equipment(first_id).await?;
        let (second_state, second) = self.existing_span_equipment(second_id).await?;

        let (first_event, second_event) =
            span_equipment::handle_connect_span_segments_at_route_node(&first, &second, command)?;

        self.commit(first_id, vec![first_event.into()], first_state.version)
            .await?;
        second_step(
            "connect second span equipment",
            self.commit(second_id, vec![second_event.into()], second_state.version)
                .await,
        )
    }

    async fn disconnect_span_segments(&self, command: DisconnectSpanSegmentsCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let event = span_equipment::handle_disconnect_span_segments(&equipment, command)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn affix_span_equipment_to_node_container(
        &self,
        command: AffixSpanEquipmentToNodeContainerCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;
        let container = require(
            self.projection.node_container(command.node_container_id),
            NODE_CONTAINER,
            command.node_container_id,
        )?;

        let event = span_equipment::handle_affix_to_node_container(&equipment, command, &container)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn detach_span_equipment_from_node_container(
        &self,
        command: DetachSpanEquipmentFromNodeContainerCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let event = span_equipment::handle_detach_from_node_container(&equipment, command)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn merge_span_equipment(&self, command: MergeSpanEquipmentCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (this_state, this) = self.existing_span_equipment(command.span_equipment_id).await?;
        let (other_state, other) = self
            .existing_span_equipment(command.merge_with_span_equipment_id)
            .await?;

        let this_walk = self.route_network.interest(this.walk_of_interest_id)?;
        let other_walk = self.route_network.interest(other.walk_of_interest_id)?;
        let merged_walk_id = command.merged_walk_of_interest_id;

        let outcome = span_equipment::handle_merge_span_equipment(&this, &other, command, &this_walk, &other_walk)?;

        self.commit(this.id, vec![outcome.merged.into()], this_state.version)
            .await?;
        second_step(
            "register merged walk of interest",
            self.route_network
                .register_walk_of_interest(merged_walk_id, outcome.walk_element_ids)
                .map(|_| ())
                .map_err(ServiceError::from),
        )?;
        second_step(
            "retire absorbed span equipment",
            self.commit(other.id, vec![outcome.merged_into.into()], other_state.version)
                .await,
        )?;

        info!(survivor = %this.id, absorbed = %other.id, "Span equipment merged");
        Ok(())
    }

    async fn move_span_equipment(&self, command: MoveSpanEquipmentCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let new_walk = self.route_network.interest(command.walk_of_interest_id)?;
        let has_children = self.projection.has_child_span_equipment(equipment.id);
        let event = span_equipment::handle_move_span_equipment(&equipment, command, &new_walk, has_children)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn remove_span_structure(&self, command: RemoveSpanStructureCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let has_children = self.projection.has_child_span_equipment(equipment.id);
        let event = span_equipment::handle_remove_span_structure(&equipment, command, has_children)?;

        self.commit(equipment.id, vec![event.into()], state.version).await
    }

    async fn remove_span_equipment(&self, command: RemoveSpanEquipmentCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self.existing_span_equipment(command.span_equipment_id).await?;

        let has_children = self.projection.has_child_span_equipment(equipment.id);
        let event = span_equipment::handle_remove_span_equipment(&equipment, command, has_children)?;

        self.commit(equipment.id, vec![event.into()], state.version).await?;
        info!(span_equipment_id = %equipment.id, "Span equipment removed");
        Ok(())
    }

    async fn place_terminal_equipment(&self, command: PlaceTerminalEquipmentCommand) -> ServiceResult<Uuid> {
        let _writer = self.writer.lock().await;
        let id = command.terminal_equipment_id;
        let container_id = command.node_container_id;
        let rack = command.rack;
        let context = command.context;

        let state = self.load_terminal_equipment(id).await?;
        let specification_id = command.specification_id;
        let placed = terminal_equipment::handle_place_terminal_equipment(&state, command, &self.catalog)?;

        // The container must accept the reference before anything is written
        let (container_state, container) = self.existing_node_container(container_id).await?;
        let specification = self
            .catalog
            .terminal_equipment_specification(specification_id)
            .ok_or(FatalError::SpecificationMissing(specification_id))?;
        let reference = node_container::handle_add_terminal_equipment_reference(
            &container,
            AddTerminalEquipmentReferenceCommand {
                node_container_id: container_id,
                terminal_equipment_id: id,
                rack,
                context: CommandContext {
                    causation_id: Some(placed.header().event_id),
                    ..context
                },
            },
            &specification,
        )?;

        self.commit(id, vec![placed.into()], state.version).await?;
        second_step(
            "reference terminal equipment from node container",
            self.commit(container_id, vec![reference.into()], container_state.version)
                .await,
        )?;

        info!(terminal_equipment_id = %id, node_container_id = %container_id, "Terminal equipment placed");
        Ok(id)
    }

    async fn update_terminal_equipment_properties(
        &self,
        command: UpdateTerminalEquipmentPropertiesCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self
            .existing_terminal_equipment(command.terminal_equipment_id)
            .await?;

        let events = terminal_equipment::handle_update_properties(
            &equipment,
            command,
            &self.catalog,
            self.projection.graph(),
        )?;

        self.commit(
            equipment.id,
            events.into_iter().map(UtilityNetworkEvent::from).collect(),
            state.version,
        )
        .await
    }

    async fn remove_terminal_equipment(&self, command: RemoveTerminalEquipmentCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, equipment) = self
            .existing_terminal_equipment(command.terminal_equipment_id)
            .await?;
        let context = command.context;

        let removed =
            terminal_equipment::handle_remove_terminal_equipment(&equipment, command, self.projection.graph())?;
        let removed_event_id = removed.header().event_id;

        self.commit(equipment.id, vec![removed.into()], state.version)
            .await?;

        let dereference = self
            .drop_container_reference(&equipment, CommandContext {
                causation_id: Some(removed_event_id),
                ..context
            })
            .await;
        second_step("drop node container reference", dereference)
    }

    async fn place_node_container(&self, command: PlaceNodeContainerCommand) -> ServiceResult<Uuid> {
        let _writer = self.writer.lock().await;
        let id = command.node_container_id;

        let state = self.load_node_container(id).await?;
        let interest = self.route_network.interest(command.interest_id)?;
        let occupied = interest
            .node_ids()
            .first()
            .map_or(false, |node| self.projection.container_at_route_node(*node).is_some());

        let event = node_container::handle_place_node_container(&state, command, &self.catalog, &interest, occupied)?;

        self.commit(id, vec![event.into()], state.version).await?;
        info!(node_container_id = %id, "Node container placed");
        Ok(id)
    }

    async fn place_rack(&self, command: PlaceRackCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, container) = self.existing_node_container(command.node_container_id).await?;

        let event = node_container::handle_place_rack(&container, command, &self.catalog)?;

        self.commit(container.id, vec![event.into()], state.version).await
    }

    async fn reverse_vertical_content_alignment(
        &self,
        command: ReverseVerticalContentAlignmentCommand,
    ) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, container) = self.existing_node_container(command.node_container_id).await?;

        let event = node_container::handle_reverse_vertical_content_alignment(&container, command);

        self.commit(container.id, vec![event.into()], state.version).await
    }

    async fn change_subrack_mount(&self, command: ChangeSubrackMountCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, container) = self.existing_node_container(command.node_container_id).await?;

        let event = node_container::handle_change_subrack_mount(&container, command)?;

        self.commit(container.id, vec![event.into()], state.version).await
    }

    async fn remove_node_container(&self, command: RemoveNodeContainerCommand) -> ServiceResult<()> {
        let _writer = self.writer.lock().await;
        let (state, container) = self.existing_node_container(command.node_container_id).await?;

        let affixed = self.projection.has_affixed_span_equipment(container.id);
        let event = node_container::handle_remove_node_container(&container, command, affixed)?;

        self.commit(container.id, vec![event.into()], state.version)
            .await?;
        second_step(
            "release node of interest",
            self.route_network
                .unregister_interest(container.interest_id)
                .map_err(ServiceError::from),
        )?;

        info!(node_container_id = %container.id, "Node container removed");
        Ok(())
    }
}
