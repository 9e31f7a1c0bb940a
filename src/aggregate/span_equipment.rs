// Copyright (c) 2025 - Cowboy AI, Inc.
//! SpanEquipment Aggregate
//!
//! ```text
//! Command + current record + context → handle_*() → Result<Event, CommandError<Code>>
//!                                                       ↓
//! Events → apply_event() → SpanEquipmentState
//! ```
//!
//! Handlers are pure. Everything they need from outside the aggregate (route
//! walks, the catalog, the connectivity graph, child equipment) is passed in
//! explicitly by the caller.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::commands::*;
use super::errors::*;
use super::manufacturer_allowed;
use crate::domain::{
    build_span_structures, merge_span_equipment, ConnectionDirection, InterestKind,
    NodeContainer, RouteNetworkInterest, SegmentEnd, SpanEquipment,
    SpanEquipmentNodeContainerAffix, SpanSegmentCut, SpanSegmentToTerminalConnect,
    SpecificationCatalog,
};
use crate::errors::CommandError;
use crate::events::*;
use crate::graph::{GraphElement, UtilityGraph};

/// Span equipment state reconstructed from its events
///
/// `span_equipment` is `None` before placement and after removal or merge;
/// `version` keeps counting so a removed id can never be placed again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanEquipmentState {
    pub id: Uuid,
    pub span_equipment: Option<Arc<SpanEquipment>>,
    pub version: u64,
}

impl SpanEquipmentState {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            span_equipment: None,
            version: 0,
        }
    }

    /// Reconstruct state by folding the aggregate's events
    pub fn from_events(id: Uuid, events: &[SpanEquipmentEvent]) -> Self {
        events.iter().fold(Self::new(id), apply_event)
    }

    /// Whether any event was ever recorded for this id
    pub fn exists(&self) -> bool {
        self.version > 0
    }
}

/// Next equipment record after an event
///
/// Returns `None` when the event ends the equipment's life, or when a
/// mutation arrives for an equipment that does not exist.
pub fn evolve(current: Option<&SpanEquipment>, event: &SpanEquipmentEvent) -> Option<SpanEquipment> {
    use SpanEquipmentEvent::*;

    if let SpanEquipmentPlaced(e) = event {
        return Some(e.span_equipment.clone());
    }
    let current = current?;

    match event {
        SpanEquipmentPlaced(_) => None,
        SpanSegmentsCut(e) => Some(current.with_cut(
            e.cut_node_of_interest_id,
            e.cut_node_of_interest_index,
            e.is_new_node_of_interest,
            &e.cuts,
        )),
        SpanSegmentsConnectedToTerminals(e) => Some(current.with_connects(&e.connects)),
        SpanSegmentsConnectedToSimpleTerminals(e) => Some(current.with_connects(&e.connects)),
        SpanSegmentsDisconnectedFromTerminals(e) => Some(current.with_disconnects(&e.disconnects)),
        SpanEquipmentAffixedToContainer(e) => Some(current.with_affix(e.affix.clone())),
        SpanEquipmentDetachedFromContainer(e) => Some(current.without_affix(e.node_container_id)),
        SpanEquipmentMoved(e) => Some(SpanEquipment {
            walk_of_interest_id: e.walk_of_interest_id,
            node_of_interest_ids: e.node_of_interest_ids.clone(),
            ..current.clone()
        }),
        SpanEquipmentMerged(e) => Some(SpanEquipment {
            walk_of_interest_id: e.walk_of_interest_id,
            node_of_interest_ids: e.node_of_interest_ids.clone(),
            span_structures: e.span_structures.clone(),
            node_container_affixes: e.node_container_affixes.clone(),
            utility_network_hops: e.utility_network_hops.clone(),
            ..current.clone()
        }),
        SpanStructureRemoved(e) => Some(current.with_structure_deleted(e.span_structure_id)),
        SpanEquipmentMergedInto(_) | SpanEquipmentRemoved(_) => None,
    }
}

/// Apply event to state (pure function)
pub fn apply_event(state: SpanEquipmentState, event: &SpanEquipmentEvent) -> SpanEquipmentState {
    SpanEquipmentState {
        id: state.id,
        span_equipment: evolve(state.span_equipment.as_deref(), event).map(Arc::new),
        version: state.version + 1,
    }
}

/// Handle PlaceSpanEquipment
///
/// # Business Rules
/// - Id must be non-nil and never used before
/// - Interest must be a well formed walk of interest
/// - Specification must exist; manufacturer must be one it allows
/// - Every hop parent segment must be known
///
/// The new equipment has the two walk ends as its only nodes of interest and
/// one segment per structure spanning them.
pub fn handle_place_span_equipment(
    state: &SpanEquipmentState,
    command: PlaceSpanEquipmentCommand,
    catalog: &SpecificationCatalog,
    interest: &RouteNetworkInterest,
    segment_exists: impl Fn(Uuid) -> bool,
) -> Result<SpanEquipmentEvent, CommandError<PlaceSpanEquipmentError>> {
    use PlaceSpanEquipmentError::*;

    if command.span_equipment_id.is_nil() {
        return Err(InvalidSpanEquipmentId.into());
    }
    if state.exists() {
        return Err(SpanEquipmentAlreadyExists(command.span_equipment_id).into());
    }
    if interest.kind != InterestKind::WalkOfInterest {
        return Err(InterestMustBeWalkOfInterest(interest.id).into());
    }
    if !interest.is_valid_walk() {
        return Err(InvalidWalk(interest.id).into());
    }

    let specification = catalog
        .span_equipment_specification(command.specification_id)
        .ok_or(UnknownSpecification(command.specification_id))?;

    manufacturer_allowed(&specification.manufacturer_refs, command.manufacturer_id)
        .map_err(ManufacturerNotAllowed)?;

    for hop in &command.utility_network_hops {
        if let Some(unknown) = hop
            .parent_span_segment_ids
            .iter()
            .find(|id| !segment_exists(**id))
        {
            return Err(UnknownHopParentSegment(*unknown).into());
        }
    }

    let node_ids = interest.node_ids();
    let (Some(a_end), Some(z_end)) = (node_ids.first(), node_ids.last()) else {
        return Err(InvalidWalk(interest.id).into());
    };

    let span_equipment = SpanEquipment {
        id: command.span_equipment_id,
        specification_id: specification.id,
        walk_of_interest_id: interest.id,
        node_of_interest_ids: vec![*a_end, *z_end],
        span_structures: build_span_structures(&specification.root_template, 1),
        naming: command.naming,
        marking: command.marking,
        manufacturer_id: command.manufacturer_id,
        is_cable: specification.is_cable,
        node_container_affixes: Vec::new(),
        utility_network_hops: command.utility_network_hops,
    };

    Ok(SpanEquipmentEvent::SpanEquipmentPlaced(SpanEquipmentPlaced {
        header: command.context.header(command.span_equipment_id),
        span_equipment,
    }))
}

/// Handle CutSpanSegments
///
/// # Business Rules
/// - The route node must lie on the walk and must not be an end
/// - A route node that is not yet a node of interest is appended to the node
///   list; with no segments named, every structure is cut there
/// - Every named segment must be live and pass the route node
pub fn handle_cut_span_segments(
    equipment: &SpanEquipment,
    command: CutSpanSegmentsCommand,
    walk: &RouteNetworkInterest,
) -> Result<SpanEquipmentEvent, CommandError<CutSpanSegmentsError>> {
    use CutSpanSegmentsError::*;

    let walk_nodes = walk.node_ids();
    let position_on_walk = |node_id: Uuid| walk_nodes.iter().position(|id| *id == node_id);

    let cut_position = position_on_walk(command.route_node_id).ok_or(NodeNotOnWalk(command.route_node_id))?;
    if equipment.is_end(command.route_node_id) {
        return Err(CannotCutAtEnd(command.route_node_id).into());
    }

    let existing_index = equipment.node_index_of(command.route_node_id);
    let is_new_node_of_interest = existing_index.is_none();
    let cut_index = existing_index.unwrap_or(equipment.node_of_interest_ids.len() as u16);

    let passes = |from: u16, to: u16| -> bool {
        if from == cut_index || to == cut_index {
            return false;
        }
        let from = equipment.node_id_at(from).and_then(position_on_walk);
        let to = equipment.node_id_at(to).and_then(position_on_walk);
        match (from, to) {
            (Some(from), Some(to)) => from.min(to) < cut_position && cut_position < from.max(to),
            _ => false,
        }
    };

    let mut to_cut = Vec::new();
    if command.span_segment_ids.is_empty() && is_new_node_of_interest {
        for structure in equipment.span_structures.iter().filter(|s| !s.deleted) {
            if let Some(segment) = structure
                .span_segments
                .iter()
                .find(|s| passes(s.from_node_of_interest_index, s.to_node_of_interest_index))
            {
                to_cut.push(segment.id);
            }
        }
    } else {
        for segment_id in &command.span_segment_ids {
            let (structure_index, _, segment) = equipment
                .segment(*segment_id)
                .ok_or(SpanSegmentNotFound(*segment_id))?;
            if equipment.span_structures[structure_index].deleted {
                return Err(SpanSegmentNotFound(*segment_id).into());
            }
            if !passes(segment.from_node_of_interest_index, segment.to_node_of_interest_index) {
                return Err(SpanSegmentDoesNotPassNode(*segment_id).into());
            }
            if !to_cut.contains(segment_id) {
                to_cut.push(*segment_id);
            }
        }
    }

    if to_cut.is_empty() {
        return Err(NoSegmentsToCut.into());
    }

    Ok(SpanEquipmentEvent::SpanSegmentsCut(SpanSegmentsCut {
        header: command.context.header(equipment.id),
        cut_node_of_interest_id: command.route_node_id,
        cut_node_of_interest_index: cut_index,
        is_new_node_of_interest,
        cuts: to_cut
            .into_iter()
            .map(|old_span_segment_id| SpanSegmentCut {
                old_span_segment_id,
                new_span_segment_id_1: Uuid::now_v7(),
                new_span_segment_id_2: Uuid::now_v7(),
            })
            .collect(),
    }))
}

/// Handle ConnectSpanSegmentsToTerminals
///
/// # Business Rules
/// - Every segment must be live and have the stated end at the route node
/// - That end must not be connected already
/// - Every terminal must exist in the connectivity graph
pub fn handle_connect_span_segments_to_terminals(
    equipment: &SpanEquipment,
    command: ConnectSpanSegmentsToTerminalsCommand,
    graph: &UtilityGraph,
) -> Result<SpanEquipmentEvent, CommandError<ConnectSpanSegmentsError>> {
    use ConnectSpanSegmentsError::*;

    if command.connects.is_empty() {
        return Err(NoConnects.into());
    }

    let mut claimed = HashSet::new();
    for connect in &command.connects {
        let end = SegmentEnd::from(connect.direction);
        check_free_end_at(equipment, connect.span_segment_id, end, command.route_node_id)?;
        if !claimed.insert((connect.span_segment_id, end)) {
            return Err(SpanSegmentEndAlreadyConnected(connect.span_segment_id).into());
        }
        match graph.element(connect.terminal_id) {
            Some(GraphElement::DisconnectedTerminal(_)) | Some(GraphElement::ConnectedTerminal(_)) => {}
            _ => return Err(TerminalNotFound(connect.terminal_id).into()),
        }
    }

    Ok(SpanEquipmentEvent::SpanSegmentsConnectedToTerminals(
        SpanSegmentsConnectedToTerminals {
            header: command.context.header(equipment.id),
            connects: command.connects,
        },
    ))
}

fn check_free_end_at(
    equipment: &SpanEquipment,
    span_segment_id: Uuid,
    end: SegmentEnd,
    route_node_id: Uuid,
) -> Result<(), CommandError<ConnectSpanSegmentsError>> {
    use ConnectSpanSegmentsError::*;

    let (structure_index, _, segment) = equipment
        .segment(span_segment_id)
        .ok_or(SpanSegmentNotFound(span_segment_id))?;
    if equipment.span_structures[structure_index].deleted {
        return Err(SpanSegmentNotFound(span_segment_id).into());
    }
    if equipment.node_id_at(segment.index_at(end)) != Some(route_node_id) {
        return Err(SpanSegmentNotEndingAtRouteNode(span_segment_id).into());
    }
    if segment.terminal_at(end).is_some() {
        return Err(SpanSegmentEndAlreadyConnected(span_segment_id).into());
    }
    Ok(())
}

/// End of a segment lying at the route node, as a connection direction
fn end_at(
    equipment: &SpanEquipment,
    span_segment_id: Uuid,
    route_node_id: Uuid,
) -> Result<ConnectionDirection, CommandError<ConnectSpanSegmentsError>> {
    use ConnectSpanSegmentsError::*;

    let (_, _, segment) = equipment
        .segment(span_segment_id)
        .ok_or(SpanSegmentNotFound(span_segment_id))?;
    let direction = if equipment.node_id_at(segment.from_node_of_interest_index) == Some(route_node_id) {
        ConnectionDirection::Out
    } else if equipment.node_id_at(segment.to_node_of_interest_index) == Some(route_node_id) {
        ConnectionDirection::In
    } else {
        return Err(SpanSegmentNotEndingAtRouteNode(span_segment_id).into());
    };
    check_free_end_at(equipment, span_segment_id, direction.into(), route_node_id)?;
    Ok(direction)
}

/// Handle ConnectSpanSegmentsAtRouteNode
///
/// # Business Rules
/// - Segments must come from exactly two span equipments, the same number
///   from each
/// - Every segment must end, unconnected, at the route node
///
/// Pairs are joined through a new junction terminal each. Returns the event
/// for `first` and the event for `second`.
pub fn handle_connect_span_segments_at_route_node(
    first: &SpanEquipment,
    second: &SpanEquipment,
    command: ConnectSpanSegmentsAtRouteNodeCommand,
) -> Result<(SpanEquipmentEvent, SpanEquipmentEvent), CommandError<ConnectSpanSegmentsError>> {
    use ConnectSpanSegmentsError::*;

    if command.span_segment_ids.is_empty() {
        return Err(NoConnects.into());
    }
    if first.id == second.id {
        return Err(ExpectedTwoSpanEquipment.into());
    }

    let mut first_segments = Vec::new();
    let mut second_segments = Vec::new();
    for segment_id in &command.span_segment_ids {
        if first.segment(*segment_id).is_some() {
            first_segments.push(*segment_id);
        } else if second.segment(*segment_id).is_some() {
            second_segments.push(*segment_id);
        } else {
            return Err(SpanSegmentNotFound(*segment_id).into());
        }
    }
    if first_segments.len() != second_segments.len() {
        return Err(SegmentCountMismatch.into());
    }

    let mut first_connects = Vec::with_capacity(first_segments.len());
    let mut second_connects = Vec::with_capacity(second_segments.len());
    for (first_segment, second_segment) in first_segments.into_iter().zip(second_segments) {
        let junction = Uuid::now_v7();
        first_connects.push(SpanSegmentToTerminalConnect {
            span_segment_id: first_segment,
            terminal_id: junction,
            direction: end_at(first, first_segment, command.route_node_id)?,
        });
        second_connects.push(SpanSegmentToTerminalConnect {
            span_segment_id: second_segment,
            terminal_id: junction,
            direction: end_at(second, second_segment, command.route_node_id)?,
        });
    }

    let event = |equipment_id: Uuid, connects| {
        SpanEquipmentEvent::SpanSegmentsConnectedToSimpleTerminals(SpanSegmentsConnectedToSimpleTerminals {
            header: command.context.header(equipment_id),
            route_node_id: command.route_node_id,
            connects,
        })
    };

    Ok((event(first.id, first_connects), event(second.id, second_connects)))
}

/// Handle DisconnectSpanSegments
pub fn handle_disconnect_span_segments(
    equipment: &SpanEquipment,
    command: DisconnectSpanSegmentsCommand,
) -> Result<SpanEquipmentEvent, CommandError<DisconnectSpanSegmentsError>> {
    use DisconnectSpanSegmentsError::*;

    if command.disconnects.is_empty() {
        return Err(NoDisconnects.into());
    }

    for disconnect in &command.disconnects {
        let (_, _, segment) = equipment
            .segment(disconnect.span_segment_id)
            .ok_or(SpanSegmentNotFound(disconnect.span_segment_id))?;
        if segment.from_terminal_id != Some(disconnect.terminal_id)
            && segment.to_terminal_id != Some(disconnect.terminal_id)
        {
            return Err(SpanSegmentNotConnectedToTerminal {
                span_segment_id: disconnect.span_segment_id,
                terminal_id: disconnect.terminal_id,
            }
            .into());
        }
    }

    Ok(SpanEquipmentEvent::SpanSegmentsDisconnectedFromTerminals(
        SpanSegmentsDisconnectedFromTerminals {
            header: command.context.header(equipment.id),
            disconnects: command.disconnects,
        },
    ))
}

/// Handle AffixSpanEquipmentToNodeContainer
pub fn handle_affix_to_node_container(
    equipment: &SpanEquipment,
    command: AffixSpanEquipmentToNodeContainerCommand,
    container: &NodeContainer,
) -> Result<SpanEquipmentEvent, CommandError<AffixSpanEquipmentError>> {
    use AffixSpanEquipmentError::*;

    if equipment
        .node_container_affixes
        .iter()
        .any(|a| a.node_container_id == container.id)
    {
        return Err(AlreadyAffixed(container.id).into());
    }
    let node_of_interest_index = equipment
        .node_index_of(container.route_node_id)
        .ok_or(RouteNodeNotNodeOfInterest(container.route_node_id))?;

    Ok(SpanEquipmentEvent::SpanEquipmentAffixedToContainer(
        SpanEquipmentAffixedToContainer {
            header: command.context.header(equipment.id),
            affix: SpanEquipmentNodeContainerAffix {
                node_container_id: container.id,
                node_of_interest_index,
                side: command.side,
            },
        },
    ))
}

/// Handle DetachSpanEquipmentFromNodeContainer
///
/// Rejected while any segment is connected to a terminal at the affix point.
pub fn handle_detach_from_node_container(
    equipment: &SpanEquipment,
    command: DetachSpanEquipmentFromNodeContainerCommand,
) -> Result<SpanEquipmentEvent, CommandError<DetachSpanEquipmentError>> {
    use DetachSpanEquipmentError::*;

    let affix = equipment
        .node_container_affixes
        .iter()
        .find(|a| a.node_container_id == command.node_container_id)
        .ok_or(NotAffixed(command.node_container_id))?;

    if !equipment.connections_at(affix.node_of_interest_index).is_empty() {
        return Err(TerminalConnectionsAtAffixPoint.into());
    }

    Ok(SpanEquipmentEvent::SpanEquipmentDetachedFromContainer(
        SpanEquipmentDetachedFromContainer {
            header: command.context.header(equipment.id),
            node_container_id: command.node_container_id,
        },
    ))
}

/// Events and walk produced by a successful merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Applied to the surviving equipment
    pub merged: SpanEquipmentEvent,
    /// Applied to the absorbed equipment, after `merged`
    pub merged_into: SpanEquipmentEvent,
    /// Route network elements of the combined walk
    pub walk_element_ids: Vec<Uuid>,
}

/// Handle MergeSpanEquipment
///
/// # Business Rules
/// - The two equipments must differ and share a specification
/// - The route node must be an end of both
/// - Neither end at the route node may be affixed to a node container
/// - No segment may be connected at the route node
pub fn handle_merge_span_equipment(
    this: &SpanEquipment,
    other: &SpanEquipment,
    command: MergeSpanEquipmentCommand,
    this_walk: &RouteNetworkInterest,
    other_walk: &RouteNetworkInterest,
) -> Result<MergeOutcome, CommandError<MergeSpanEquipmentError>> {
    use MergeSpanEquipmentError::*;

    let node = command.route_node_id;

    if this.id == other.id {
        return Err(SameSpanEquipment.into());
    }
    if this.specification_id != other.specification_id {
        return Err(SpecificationMismatch.into());
    }
    if !this.is_end(node) || !other.is_end(node) {
        return Err(EndsNotColocated(node).into());
    }

    for equipment in [this, other] {
        let Some(index) = equipment.node_index_of(node) else {
            return Err(EndsNotColocated(node).into());
        };
        if let Some(affix) = equipment.affix_at(index) {
            return Err(EndAffixedToNodeContainer(affix.node_container_id).into());
        }
        if !equipment.connections_at(index).is_empty() {
            return Err(SegmentsConnectedAtMergePoint.into());
        }
    }

    let merged = merge_span_equipment(this, other, node).ok_or(SpecificationMismatch)?;
    let walk_element_ids = this_walk
        .joined_at(other_walk, node)
        .ok_or(EndsNotColocated(node))?;

    let mut utility_network_hops = this.utility_network_hops.clone();
    utility_network_hops.extend(other.utility_network_hops.iter().cloned());

    let merged_header = command.context.header(this.id);
    let merged_event_id = merged_header.event_id;

    Ok(MergeOutcome {
        merged: SpanEquipmentEvent::SpanEquipmentMerged(SpanEquipmentMerged {
            header: merged_header,
            merged_span_equipment_id: other.id,
            walk_of_interest_id: command.merged_walk_of_interest_id,
            node_of_interest_ids: merged.node_of_interest_ids,
            span_structures: merged.span_structures,
            node_container_affixes: merged.node_container_affixes,
            utility_network_hops,
        }),
        merged_into: SpanEquipmentEvent::SpanEquipmentMergedInto(SpanEquipmentMergedInto {
            header: command.context.header(other.id).caused_by(Some(merged_event_id)),
            target_span_equipment_id: this.id,
        }),
        walk_element_ids,
    })
}

/// Handle MoveSpanEquipment
///
/// # Business Rules
/// - The new walk must be well formed and differ from the current one
/// - Equipment routed through a parent, or carrying children, cannot move
/// - A relocated end may not be connected or affixed
/// - Every intermediate node of interest must lie on the new walk, in the
///   same order along every structure
pub fn handle_move_span_equipment(
    equipment: &SpanEquipment,
    command: MoveSpanEquipmentCommand,
    new_walk: &RouteNetworkInterest,
    has_child_span_equipment: bool,
) -> Result<SpanEquipmentEvent, CommandError<MoveSpanEquipmentError>> {
    use MoveSpanEquipmentError::*;

    if !new_walk.is_valid_walk() {
        return Err(InvalidWalk(new_walk.id).into());
    }
    if command.walk_of_interest_id == equipment.walk_of_interest_id {
        return Err(NoChange(command.walk_of_interest_id).into());
    }
    if !equipment.utility_network_hops.is_empty() {
        return Err(IsRoutedThroughParent.into());
    }
    if has_child_span_equipment {
        return Err(HasChildSpanEquipment.into());
    }

    let walk_nodes = new_walk.node_ids();
    let (Some(new_a), Some(new_z)) = (walk_nodes.first().copied(), walk_nodes.last().copied()) else {
        return Err(InvalidWalk(new_walk.id).into());
    };

    let ends = [
        (equipment.a_end_index(), new_a),
        (equipment.z_end_index(), new_z),
    ];
    for (index, new_node) in ends {
        let Some(old_node) = equipment.node_id_at(index) else {
            continue;
        };
        if old_node == new_node {
            continue;
        }
        if !equipment.connections_at(index).is_empty() {
            return Err(ConnectedEndCannotMove(old_node).into());
        }
        if equipment.affix_at(index).is_some() {
            return Err(AffixedEndCannotMove(old_node).into());
        }
    }

    let moved = equipment.with_walk(command.walk_of_interest_id, new_a, new_z);
    let position = |node_id: Uuid| walk_nodes.iter().position(|id| *id == node_id);

    for node_id in &moved.node_of_interest_ids {
        if position(*node_id).is_none() {
            return Err(CutNodeNotOnNewWalk(*node_id).into());
        }
    }

    for structure in moved.span_structures.iter().filter(|s| !s.deleted) {
        let mut last = None;
        for segment in &structure.span_segments {
            let from = moved.node_id_at(segment.from_node_of_interest_index).and_then(position);
            let to = moved.node_id_at(segment.to_node_of_interest_index).and_then(position);
            let (Some(from), Some(to)) = (from, to) else {
                return Err(CutNodesOutOfOrder.into());
            };
            if from >= to || last.map_or(false, |last| from < last) {
                return Err(CutNodesOutOfOrder.into());
            }
            last = Some(to);
        }
    }

    Ok(SpanEquipmentEvent::SpanEquipmentMoved(SpanEquipmentMoved {
        header: command.context.header(equipment.id),
        walk_of_interest_id: command.walk_of_interest_id,
        node_of_interest_ids: moved.node_of_interest_ids,
    }))
}

/// Handle RemoveSpanStructure
///
/// Removing the outer structure removes the whole span equipment.
pub fn handle_remove_span_structure(
    equipment: &SpanEquipment,
    command: RemoveSpanStructureCommand,
    has_child_span_equipment: bool,
) -> Result<SpanEquipmentEvent, CommandError<RemoveSpanStructureError>> {
    use RemoveSpanStructureError::*;

    let (structure_index, structure) = equipment
        .structure(command.span_structure_id)
        .ok_or(SpanStructureNotFound(command.span_structure_id))?;
    if structure.deleted {
        return Err(AlreadyRemoved(command.span_structure_id).into());
    }

    let header = command.context.header(equipment.id);

    if structure_index == 0 {
        if equipment.has_connections() {
            return Err(SpanSegmentsConnected.into());
        }
        if has_child_span_equipment {
            return Err(HasChildSpanEquipment.into());
        }
        return Ok(SpanEquipmentEvent::SpanEquipmentRemoved(SpanEquipmentRemoved { header }));
    }

    if structure.span_segments.iter().any(|s| s.is_connected()) {
        return Err(SpanSegmentsConnected.into());
    }

    Ok(SpanEquipmentEvent::SpanStructureRemoved(SpanStructureRemoved {
        header,
        span_structure_id: command.span_structure_id,
    }))
}

/// Handle RemoveSpanEquipment
pub fn handle_remove_span_equipment(
    equipment: &SpanEquipment,
    command: RemoveSpanEquipmentCommand,
    has_child_span_equipment: bool,
) -> Result<SpanEquipmentEvent, CommandError<RemoveSpanEquipmentError>> {
    use RemoveSpanEquipmentError::*;

    if equipment.has_connections() {
        return Err(HasConnectedSegments.into());
    }
    if let Some(affix) = equipment.node_container_affixes.first() {
        return Err(AffixedToNodeContainer(affix.node_container_id).into());
    }
    if has_child_span_equipment {
        return Err(HasChildSpanEquipment.into());
    }

    Ok(SpanEquipmentEvent::SpanEquipmentRemoved(SpanEquipmentRemoved {
        header: command.context.header(equipment.id),
    }))
}
