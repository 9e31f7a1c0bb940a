// Copyright (c) 2025 - Cowboy AI, Inc.
//! NodeContainer Aggregate
//!
//! Cabinets, manholes and buildings at a single route node. The container
//! owns rack layout and the list of terminal equipment it holds.

use std::sync::Arc;
use uuid::Uuid;

use super::commands::*;
use super::errors::*;
use super::manufacturer_allowed;
use crate::domain::{
    InterestKind, NodeContainer, Rack, RackPlacement, RouteNetworkInterest, SpecificationCatalog,
    TerminalEquipmentSpecification, VerticalContentAlignment,
};
use crate::errors::CommandError;
use crate::events::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContainerState {
    pub id: Uuid,
    pub node_container: Option<Arc<NodeContainer>>,
    pub version: u64,
}

impl NodeContainerState {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            node_container: None,
            version: 0,
        }
    }

    pub fn from_events(id: Uuid, events: &[NodeContainerEvent]) -> Self {
        events.iter().fold(Self::new(id), apply_event)
    }

    pub fn exists(&self) -> bool {
        self.version > 0
    }
}

pub fn evolve(current: Option<&NodeContainer>, event: &NodeContainerEvent) -> Option<NodeContainer> {
    use NodeContainerEvent::*;

    if let NodeContainerPlaced(e) = event {
        return Some(e.node_container.clone());
    }
    let current = current?;

    match event {
        NodeContainerPlaced(_) => None,
        NodeContainerRackAdded(e) => Some(current.with_rack(e.rack.clone())),
        NodeContainerVerticalContentAlignmentReversed(e) => Some(NodeContainer {
            vertical_content_alignment: e.vertical_content_alignment,
            ..current.clone()
        }),
        NodeContainerTerminalEquipmentAdded(e) => {
            Some(current.with_terminal_equipment(e.terminal_equipment_id, e.rack_placement))
        }
        NodeContainerTerminalEquipmentReferenceRemoved(e) => {
            Some(current.without_terminal_equipment(e.terminal_equipment_id))
        }
        NodeContainerSubrackMountMoved(e) => Some(current.with_subrack_mount_moved(
            e.terminal_equipment_id,
            e.rack_id,
            e.position,
        )),
        NodeContainerRemoved(_) => None,
    }
}

/// Apply event to state (pure function)
pub fn apply_event(state: NodeContainerState, event: &NodeContainerEvent) -> NodeContainerState {
    NodeContainerState {
        id: state.id,
        node_container: evolve(state.node_container.as_deref(), event).map(Arc::new),
        version: state.version + 1,
    }
}

/// Handle PlaceNodeContainer
///
/// # Business Rules
/// - Id must be non-nil and never used before
/// - Interest must be a node of interest
/// - At most one container per route node
/// - Specification must exist; manufacturer must be one it allows
pub fn handle_place_node_container(
    state: &NodeContainerState,
    command: PlaceNodeContainerCommand,
    catalog: &SpecificationCatalog,
    interest: &RouteNetworkInterest,
    route_node_has_container: bool,
) -> Result<NodeContainerEvent, CommandError<PlaceNodeContainerError>> {
    use PlaceNodeContainerError::*;

    if command.node_container_id.is_nil() {
        return Err(InvalidNodeContainerId.into());
    }
    if state.exists() {
        return Err(AlreadyExists(command.node_container_id).into());
    }
    let route_node_id = match (interest.kind, interest.route_network_element_ids.as_slice()) {
        (InterestKind::NodeOfInterest, [route_node_id]) => *route_node_id,
        _ => return Err(InterestMustBeNodeOfInterest(interest.id).into()),
    };
    if route_node_has_container {
        return Err(RouteNodeAlreadyHasContainer(route_node_id).into());
    }

    let specification = catalog
        .node_container_specification(command.specification_id)
        .ok_or(UnknownSpecification(command.specification_id))?;
    manufacturer_allowed(&specification.manufacturer_refs, command.manufacturer_id)
        .map_err(ManufacturerNotAllowed)?;

    Ok(NodeContainerEvent::NodeContainerPlaced(NodeContainerPlaced {
        header: command.context.header(command.node_container_id),
        node_container: NodeContainer {
            id: command.node_container_id,
            specification_id: specification.id,
            route_node_id,
            interest_id: interest.id,
            manufacturer_id: command.manufacturer_id,
            vertical_content_alignment: VerticalContentAlignment::Bottom,
            racks: Vec::new(),
            terminal_equipment_reference_ids: Vec::new(),
        },
    }))
}

/// Handle PlaceRack
///
/// Rack names are unique within a container, compared case-insensitively.
pub fn handle_place_rack(
    container: &NodeContainer,
    command: PlaceRackCommand,
    catalog: &SpecificationCatalog,
) -> Result<NodeContainerEvent, CommandError<PlaceRackError>> {
    use PlaceRackError::*;

    let name = command.name.trim();
    if name.is_empty() {
        return Err(InvalidRackName.into());
    }
    if container
        .racks
        .iter()
        .any(|r| r.name.eq_ignore_ascii_case(name))
    {
        return Err(RackNameAlreadyExists(name.to_string()).into());
    }

    let position = command.position.unwrap_or_else(|| container.next_rack_position());
    if container.racks.iter().any(|r| r.position == position) {
        return Err(RackPositionAlreadyTaken(position).into());
    }
    if catalog.rack_specification(command.rack_specification_id).is_none() {
        return Err(UnknownRackSpecification(command.rack_specification_id).into());
    }

    Ok(NodeContainerEvent::NodeContainerRackAdded(NodeContainerRackAdded {
        header: command.context.header(container.id),
        rack: Rack {
            id: command.rack_id,
            name: name.to_string(),
            position,
            specification_id: command.rack_specification_id,
            height_in_units: command.height_in_units,
            subrack_mounts: Vec::new(),
        },
    }))
}

pub fn handle_reverse_vertical_content_alignment(
    container: &NodeContainer,
    command: ReverseVerticalContentAlignmentCommand,
) -> NodeContainerEvent {
    NodeContainerEvent::NodeContainerVerticalContentAlignmentReversed(
        NodeContainerVerticalContentAlignmentReversed {
            header: command.context.header(container.id),
            vertical_content_alignment: container.vertical_content_alignment.reversed(),
        },
    )
}

/// Handle AddTerminalEquipmentReference
///
/// # Business Rules
/// - A terminal equipment is referenced at most once
/// - Rack mounting requires rack equipment that fits the free units
pub fn handle_add_terminal_equipment_reference(
    container: &NodeContainer,
    command: AddTerminalEquipmentReferenceCommand,
    specification: &TerminalEquipmentSpecification,
) -> Result<NodeContainerEvent, CommandError<AddTerminalEquipmentReferenceError>> {
    use AddTerminalEquipmentReferenceError::*;

    if container.holds(command.terminal_equipment_id) {
        return Err(AlreadyReferenced(command.terminal_equipment_id).into());
    }

    let rack_placement = match command.rack {
        None => None,
        Some(request) => {
            let rack = container.rack(request.rack_id).ok_or(RackNotFound(request.rack_id))?;
            if !specification.is_rack_equipment {
                return Err(NotRackEquipment.into());
            }
            let height = specification.height_in_rack_units;
            if !rack.fits(request.start_unit_position, height) {
                return Err(ExceedsRackHeight.into());
            }
            if !rack.is_free(request.start_unit_position, height, None) {
                return Err(RackSpaceOccupied(request.start_unit_position).into());
            }
            Some(RackPlacement {
                rack_id: rack.id,
                position: request.start_unit_position,
                height_in_units: height,
            })
        }
    };

    Ok(NodeContainerEvent::NodeContainerTerminalEquipmentAdded(
        NodeContainerTerminalEquipmentAdded {
            header: command.context.header(container.id),
            terminal_equipment_id: command.terminal_equipment_id,
            rack_placement,
        },
    ))
}

/// Handle ChangeSubrackMount
///
/// The requested start snaps clear of other occupants; the event carries the
/// snapped position.
pub fn handle_change_subrack_mount(
    container: &NodeContainer,
    command: ChangeSubrackMountCommand,
) -> Result<NodeContainerEvent, CommandError<ChangeSubrackMountError>> {
    use ChangeSubrackMountError::*;

    let te = command.terminal_equipment_id;
    let (current_rack, mount) = container
        .rack_of(te)
        .and_then(|rack| rack.mount(te).map(|mount| (rack, mount)))
        .ok_or(TerminalEquipmentNotInRack(te))?;
    let target = container.rack(command.rack_id).ok_or(RackNotFound(command.rack_id))?;

    let position = target
        .snap_position(command.start_unit_position, mount.height_in_units, Some(te))
        .ok_or(NoRoomInRack)?;
    if current_rack.id == target.id && mount.position == position {
        return Err(NoChange.into());
    }

    Ok(NodeContainerEvent::NodeContainerSubrackMountMoved(NodeContainerSubrackMountMoved {
        header: command.context.header(container.id),
        terminal_equipment_id: te,
        rack_id: target.id,
        position,
    }))
}

pub fn handle_remove_terminal_equipment_reference(
    container: &NodeContainer,
    command: RemoveTerminalEquipmentReferenceCommand,
) -> Result<NodeContainerEvent, CommandError<RemoveTerminalEquipmentReferenceError>> {
    if !container.holds(command.terminal_equipment_id) {
        return Err(
            RemoveTerminalEquipmentReferenceError::NotReferenced(command.terminal_equipment_id).into(),
        );
    }

    Ok(NodeContainerEvent::NodeContainerTerminalEquipmentReferenceRemoved(
        NodeContainerTerminalEquipmentReferenceRemoved {
            header: command.context.header(container.id),
            terminal_equipment_id: command.terminal_equipment_id,
        },
    ))
}

/// Handle RemoveNodeContainer
pub fn handle_remove_node_container(
    container: &NodeContainer,
    command: RemoveNodeContainerCommand,
    has_affixed_span_equipment: bool,
) -> Result<NodeContainerEvent, CommandError<RemoveNodeContainerError>> {
    use RemoveNodeContainerError::*;

    if has_affixed_span_equipment {
        return Err(SpanEquipmentAffixed.into());
    }
    if !container.terminal_equipment_ids().is_empty() {
        return Err(ContainsTerminalEquipment.into());
    }

    Ok(NodeContainerEvent::NodeContainerRemoved(NodeContainerRemoved {
        header: command.context.header(container.id),
        interest_id: container.interest_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RackSpecification;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn context() -> CommandContext {
        CommandContext::new(Utc::now(), Uuid::now_v7())
    }

    fn container_with_rack(height: u16) -> (NodeContainer, Uuid) {
        let rack_id = Uuid::now_v7();
        let container = NodeContainer {
            id: Uuid::now_v7(),
            specification_id: Uuid::now_v7(),
            route_node_id: Uuid::now_v7(),
            interest_id: Uuid::now_v7(),
            manufacturer_id: None,
            vertical_content_alignment: VerticalContentAlignment::Bottom,
            racks: vec![Rack {
                id: rack_id,
                name: "R1".into(),
                position: 1,
                specification_id: Uuid::now_v7(),
                height_in_units: height,
                subrack_mounts: vec![],
            }],
            terminal_equipment_reference_ids: vec![],
        };
        (container, rack_id)
    }

    fn line_card(height: u16) -> TerminalEquipmentSpecification {
        TerminalEquipmentSpecification {
            id: Uuid::now_v7(),
            category: "OLT".into(),
            name: "Line card".into(),
            short_name: "LC".into(),
            is_rack_equipment: true,
            height_in_rack_units: height,
            is_customer_termination: false,
            structure_templates: vec![],
            manufacturer_refs: vec![],
            deprecated: false,
        }
    }

    fn mount(container: &NodeContainer, rack_id: Uuid, start: u16, height: u16) -> (NodeContainer, Uuid) {
        let te = Uuid::now_v7();
        let event = handle_add_terminal_equipment_reference(
            container,
            AddTerminalEquipmentReferenceCommand {
                node_container_id: container.id,
                terminal_equipment_id: te,
                rack: Some(RackMountRequest {
                    rack_id,
                    start_unit_position: start,
                }),
                context: context(),
            },
            &line_card(height),
        )
        .unwrap();
        (evolve(Some(container), &event).unwrap(), te)
    }

    #[test]
    fn test_rack_space_must_be_free() {
        let (container, rack_id) = container_with_rack(42);
        let (container, _) = mount(&container, rack_id, 0, 4);

        let result = handle_add_terminal_equipment_reference(
            &container,
            AddTerminalEquipmentReferenceCommand {
                node_container_id: container.id,
                terminal_equipment_id: Uuid::now_v7(),
                rack: Some(RackMountRequest {
                    rack_id,
                    start_unit_position: 2,
                }),
                context: context(),
            },
            &line_card(2),
        );

        assert_eq!(
            result.unwrap_err().code(),
            Some(&AddTerminalEquipmentReferenceError::RackSpaceOccupied(2))
        );
    }

    #[test]
    fn test_mount_at_last_addressable_unit_exceeds_rack() {
        let (container, rack_id) = container_with_rack(42);

        let result = handle_add_terminal_equipment_reference(
            &container,
            AddTerminalEquipmentReferenceCommand {
                node_container_id: container.id,
                terminal_equipment_id: Uuid::now_v7(),
                rack: Some(RackMountRequest {
                    rack_id,
                    start_unit_position: u16::MAX,
                }),
                context: context(),
            },
            &line_card(2),
        );

        assert_eq!(
            result.unwrap_err().code(),
            Some(&AddTerminalEquipmentReferenceError::ExceedsRackHeight)
        );
    }

    #[test]
    fn test_move_to_last_addressable_unit_finds_no_room() {
        let (container, rack_id) = container_with_rack(42);
        let (container, _) = mount(&container, rack_id, 0, 4);
        let (container, moving) = mount(&container, rack_id, 10, 2);

        let result = handle_change_subrack_mount(
            &container,
            ChangeSubrackMountCommand {
                node_container_id: container.id,
                terminal_equipment_id: moving,
                rack_id,
                start_unit_position: u16::MAX,
                context: context(),
            },
        );

        assert_eq!(
            result.unwrap_err().code(),
            Some(&ChangeSubrackMountError::NoRoomInRack)
        );
    }

    #[test]
    fn test_change_subrack_mount_snaps_above_occupant() {
        // Arrange
        let (container, rack_id) = container_with_rack(42);
        let (container, _) = mount(&container, rack_id, 0, 4);
        let (container, moving) = mount(&container, rack_id, 10, 2);

        // Act
        let event = handle_change_subrack_mount(
            &container,
            ChangeSubrackMountCommand {
                node_container_id: container.id,
                terminal_equipment_id: moving,
                rack_id,
                start_unit_position: 2,
                context: context(),
            },
        )
        .unwrap();

        // Assert
        let NodeContainerEvent::NodeContainerSubrackMountMoved(moved) = &event else {
            panic!("expected subrack mount moved");
        };
        assert_eq!(moved.position, 4);
        let after = evolve(Some(&container), &event).unwrap();
        assert_eq!(after.rack(rack_id).unwrap().mount(moving).unwrap().position, 4);
    }

    #[test]
    fn test_rack_names_unique_ignoring_case() {
        let (container, _) = container_with_rack(42);
        let catalog = SpecificationCatalog::new();
        let rack_spec = Uuid::now_v7();
        catalog.add_rack_specification(RackSpecification {
            id: rack_spec,
            name: "19 inch".into(),
            short_name: "19\"".into(),
        });

        let result = handle_place_rack(
            &container,
            PlaceRackCommand {
                node_container_id: container.id,
                rack_id: Uuid::now_v7(),
                rack_specification_id: rack_spec,
                name: "r1".into(),
                height_in_units: 42,
                position: None,
                context: context(),
            },
            &catalog,
        );

        assert_eq!(
            result.unwrap_err().code(),
            Some(&PlaceRackError::RackNameAlreadyExists("r1".into()))
        );
    }

    #[test]
    fn test_container_holding_equipment_cannot_be_removed() {
        let (container, rack_id) = container_with_rack(42);
        let (container, _) = mount(&container, rack_id, 0, 1);

        let result = handle_remove_node_container(
            &container,
            RemoveNodeContainerCommand {
                node_container_id: container.id,
                context: context(),
            },
            false,
        );

        assert_eq!(
            result.unwrap_err().code(),
            Some(&RemoveNodeContainerError::ContainsTerminalEquipment)
        );
    }

    #[test]
    fn test_reverse_alignment_toggles() {
        let (container, _) = container_with_rack(42);

        let event = handle_reverse_vertical_content_alignment(
            &container,
            ReverseVerticalContentAlignmentCommand {
                node_container_id: container.id,
                context: context(),
            },
        );

        let after = evolve(Some(&container), &event).unwrap();
        assert_eq!(after.vertical_content_alignment, VerticalContentAlignment::Top);
    }
}
