// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for terminal equipment and node container commands
//!
//! Terminal equipment placement and removal touch two aggregates; these tests
//! check that both sides agree afterwards.

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use cim_utility_network::aggregate::*;
use cim_utility_network::domain::{
    AddressInfo, ConnectionDirection, NamingInfo, VerticalContentAlignment,
};
use cim_utility_network::graph::GraphElement;
use cim_utility_network::service::{ServiceError, UtilityNetworkService};

fn assert_rejected(error: ServiceError, expected: impl Into<UtilityNetworkError>) {
    let expected: UtilityNetworkError = expected.into();
    match error {
        ServiceError::Rejected(code) => assert_eq!(code, expected),
        other => panic!("expected a rejection, got {other:?}"),
    }
}

async fn place_rack(network: &TestNetwork, container: Uuid, name: &str) -> Uuid {
    let rack_id = Uuid::now_v7();
    network
        .service
        .place_rack(PlaceRackCommand {
            node_container_id: container,
            rack_id,
            rack_specification_id: parse_uuid(RACK_SPEC_ID),
            name: name.into(),
            height_in_units: 10,
            position: None,
            context: context(),
        })
        .await
        .unwrap();
    rack_id
}

async fn mount(network: &TestNetwork, container: Uuid, rack_id: Uuid, position: u16) -> Result<Uuid, ServiceError> {
    let mut command = network.place_terminal_command(container, RACK_EQUIPMENT_SPEC_ID, "ODF");
    command.rack = Some(RackMountRequest {
        rack_id,
        start_unit_position: position,
    });
    network.service.place_terminal_equipment(command).await
}

// ============================================================================
// Node containers
// ============================================================================

#[tokio::test]
async fn test_one_container_per_route_node() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;

    assert_eq!(network.projection().container_at_route_node(node(1)), Some(container));

    let error = network
        .service
        .place_node_container(PlaceNodeContainerCommand {
            node_container_id: Uuid::now_v7(),
            specification_id: parse_uuid(NODE_CONTAINER_SPEC_ID),
            interest_id: network.node_interest(1),
            manufacturer_id: None,
            context: context(),
        })
        .await
        .unwrap_err();

    assert_rejected(error, PlaceNodeContainerError::RouteNodeAlreadyHasContainer(node(1)));
}

#[tokio::test]
async fn test_container_needs_a_node_of_interest() {
    let network = TestNetwork::new();
    let walk = network.walk(&[1, 2]);

    let error = network
        .service
        .place_node_container(PlaceNodeContainerCommand {
            node_container_id: Uuid::now_v7(),
            specification_id: parse_uuid(NODE_CONTAINER_SPEC_ID),
            interest_id: walk,
            manufacturer_id: None,
            context: context(),
        })
        .await
        .unwrap_err();

    assert_rejected(error, PlaceNodeContainerError::InterestMustBeNodeOfInterest(walk));
}

#[tokio::test]
async fn test_reverse_vertical_content_alignment() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let reverse = || ReverseVerticalContentAlignmentCommand {
        node_container_id: container,
        context: context(),
    };

    network.service.reverse_vertical_content_alignment(reverse()).await.unwrap();
    assert_eq!(
        network.projection().node_container(container).unwrap().vertical_content_alignment,
        VerticalContentAlignment::Top
    );

    network.service.reverse_vertical_content_alignment(reverse()).await.unwrap();
    assert_eq!(
        network.projection().node_container(container).unwrap().vertical_content_alignment,
        VerticalContentAlignment::Bottom
    );
}

#[tokio::test]
async fn test_rack_names_are_unique_ignoring_case() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    place_rack(&network, container, "Rack A").await;

    let error = network
        .service
        .place_rack(PlaceRackCommand {
            node_container_id: container,
            rack_id: Uuid::now_v7(),
            rack_specification_id: parse_uuid(RACK_SPEC_ID),
            name: "rack a".into(),
            height_in_units: 10,
            position: None,
            context: context(),
        })
        .await
        .unwrap_err();

    assert_rejected(error, PlaceRackError::RackNameAlreadyExists("rack a".into()));
}

#[tokio::test]
async fn test_remove_container_releases_its_node_of_interest() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let interest_id = network.projection().node_container(container).unwrap().interest_id;

    network
        .service
        .remove_node_container(RemoveNodeContainerCommand {
            node_container_id: container,
            context: context(),
        })
        .await
        .unwrap();

    assert!(network.projection().node_container(container).is_none());
    assert_eq!(network.projection().container_at_route_node(node(1)), None);
    assert!(!network.route_network.has_interest(interest_id));
}

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
async fn test_place_terminal_equipment_registers_terminals_and_container_reference() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;

    let splitter = network
        .place_terminal_equipment(container, SPLITTER_SPEC_ID, "Splitter")
        .await;

    let terminals = network.terminal_ids(splitter);
    assert_eq!(terminals.len(), 1 + SPLITTER_OUTPUTS);
    for terminal in terminals {
        assert!(matches!(
            network.projection().graph().element(terminal),
            Some(GraphElement::DisconnectedTerminal(_))
        ));
    }
    let container = network.projection().node_container(container).unwrap();
    assert_eq!(container.terminal_equipment_reference_ids, vec![splitter]);
}

#[tokio::test]
async fn test_place_into_unknown_container_writes_nothing() {
    let network = TestNetwork::new();
    let missing = Uuid::now_v7();

    let error = network
        .service
        .place_terminal_equipment(network.place_terminal_command(missing, SPLICE_CLOSURE_SPEC_ID, "Closure"))
        .await
        .unwrap_err();

    assert!(matches!(error, ServiceError::NotFound { id, .. } if id == missing));
    assert!(network.service.event_store().is_empty());
    assert_eq!(network.projection().terminal_equipment_count(), 0);
}

#[tokio::test]
async fn test_rack_mounting() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let rack_id = place_rack(&network, container, "Rack A").await;

    let first = mount(&network, container, rack_id, 1).await.unwrap();

    let rack = network.projection().node_container(container).unwrap().racks[0].clone();
    assert_eq!(rack.subrack_mounts.len(), 1);
    assert_eq!(rack.subrack_mounts[0].terminal_equipment_id, first);
    assert_eq!(rack.subrack_mounts[0].height_in_units, RACK_EQUIPMENT_HEIGHT);

    // Units 1 and 2 are taken; the rejected equipment is not written either
    let error = mount(&network, container, rack_id, 2).await.unwrap_err();
    assert_rejected(error, AddTerminalEquipmentReferenceError::RackSpaceOccupied(2));
    assert_eq!(network.projection().terminal_equipment_count(), 1);

    let error = mount(&network, container, rack_id, 9).await.unwrap_err();
    assert_rejected(error, AddTerminalEquipmentReferenceError::ExceedsRackHeight);
}

#[tokio::test]
async fn test_loose_equipment_cannot_go_into_a_rack() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let rack_id = place_rack(&network, container, "Rack A").await;
    let mut command = network.place_terminal_command(container, SPLICE_CLOSURE_SPEC_ID, "Closure");
    command.rack = Some(RackMountRequest {
        rack_id,
        start_unit_position: 1,
    });

    let error = network.service.place_terminal_equipment(command).await.unwrap_err();

    assert_rejected(error, AddTerminalEquipmentReferenceError::NotRackEquipment);
}

#[tokio::test]
async fn test_change_subrack_mount() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let rack_id = place_rack(&network, container, "Rack A").await;
    let equipment = mount(&network, container, rack_id, 1).await.unwrap();
    let move_to = |start_unit_position| ChangeSubrackMountCommand {
        node_container_id: container,
        terminal_equipment_id: equipment,
        rack_id,
        start_unit_position,
        context: context(),
    };

    network.service.change_subrack_mount(move_to(5)).await.unwrap();

    let rack = network.projection().node_container(container).unwrap().racks[0].clone();
    assert_eq!(rack.mount(equipment).map(|m| m.position), Some(5));

    let error = network.service.change_subrack_mount(move_to(5)).await.unwrap_err();
    assert_rejected(error, ChangeSubrackMountError::NoChange);
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn test_update_properties_emits_one_event_per_change() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let equipment = network
        .place_terminal_equipment(container, SPLICE_CLOSURE_SPEC_ID, "Closure")
        .await;
    let address = AddressInfo {
        access_address_id: Some(Uuid::now_v7()),
        unit_address_id: None,
        remark: Some("basement".into()),
    };

    network
        .service
        .update_terminal_equipment_properties(UpdateTerminalEquipmentPropertiesCommand {
            terminal_equipment_id: equipment,
            naming: Some(NamingInfo::named("Closure 7")),
            address: Some(Some(address.clone())),
            lifecycle: None,
            manufacturer_id: None,
            specification_id: None,
            context: context(),
        })
        .await
        .unwrap();

    let updated = network.projection().terminal_equipment(equipment).unwrap();
    assert_eq!(updated.naming.name.as_deref(), Some("Closure 7"));
    assert_eq!(updated.address, Some(address));
    assert_eq!(network.projection().version(equipment), Some(3));
}

#[tokio::test]
async fn test_update_without_change_is_rejected() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let equipment = network
        .place_terminal_equipment(container, SPLICE_CLOSURE_SPEC_ID, "Closure")
        .await;

    let error = network
        .service
        .update_terminal_equipment_properties(UpdateTerminalEquipmentPropertiesCommand {
            terminal_equipment_id: equipment,
            naming: Some(NamingInfo::named("Closure")),
            address: None,
            lifecycle: None,
            manufacturer_id: None,
            specification_id: None,
            context: context(),
        })
        .await
        .unwrap_err();

    assert_rejected(error, UpdateTerminalEquipmentPropertiesError::NoChange);
}

#[tokio::test]
async fn test_specification_change_rebuilds_terminals() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let equipment = network
        .place_terminal_equipment(container, SPLICE_CLOSURE_SPEC_ID, "Closure")
        .await;
    let before = network.terminal_ids(equipment);

    network
        .service
        .update_terminal_equipment_properties(UpdateTerminalEquipmentPropertiesCommand {
            terminal_equipment_id: equipment,
            naming: None,
            address: None,
            lifecycle: None,
            manufacturer_id: None,
            specification_id: Some(parse_uuid(SPLITTER_SPEC_ID)),
            context: context(),
        })
        .await
        .unwrap();

    let after = network.terminal_ids(equipment);
    assert_eq!(after.len(), 1 + SPLITTER_OUTPUTS);
    for terminal in before {
        assert!(network.projection().graph().element(terminal).is_none());
    }
    for terminal in after {
        assert!(network.projection().graph().element(terminal).is_some());
    }
}

// ============================================================================
// Removal
// ============================================================================

#[tokio::test]
async fn test_remove_terminal_equipment_drops_container_reference() {
    let network = TestNetwork::new();
    let container = network.place_container(1).await;
    let equipment = network
        .place_terminal_equipment(container, SPLICE_CLOSURE_SPEC_ID, "Closure")
        .await;
    let terminals = network.terminal_ids(equipment);

    // A container holding equipment cannot go
    let error = network
        .service
        .remove_node_container(RemoveNodeContainerCommand {
            node_container_id: container,
            context: context(),
        })
        .await
        .unwrap_err();
    assert_rejected(error, RemoveNodeContainerError::ContainsTerminalEquipment);

    network
        .service
        .remove_terminal_equipment(RemoveTerminalEquipmentCommand {
            terminal_equipment_id: equipment,
            context: context(),
        })
        .await
        .unwrap();

    assert!(network.projection().terminal_equipment(equipment).is_none());
    assert!(network
        .projection()
        .node_container(container)
        .unwrap()
        .terminal_equipment_ids()
        .is_empty());
    for terminal in terminals {
        assert!(network.projection().graph().element(terminal).is_none());
    }
}

#[tokio::test]
async fn test_connected_terminal_equipment_cannot_be_removed() {
    let network = TestNetwork::new();
    let cable = network.place_cable(&[1, 2], "cable").await;
    let container = network.place_container(2).await;
    let equipment = network
        .place_terminal_equipment(container, SPLICE_CLOSURE_SPEC_ID, "Closure")
        .await;
    let fiber = network.segment_ids(cable, 1)[0];
    network
        .connect(cable, 2, fiber, network.terminal_ids(equipment)[0], ConnectionDirection::In)
        .await;

    let error = network
        .service
        .remove_terminal_equipment(RemoveTerminalEquipmentCommand {
            terminal_equipment_id: equipment,
            context: context(),
        })
        .await
        .unwrap_err();

    assert_rejected(error, RemoveTerminalEquipmentError::TerminalsConnected);
}
