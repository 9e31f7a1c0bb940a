// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectivity, trace and query tests
//!
//! Builds a small access network: a feeder cable into a 1:4 splitter whose
//! outputs feed drop cables to customer terminations.
//!
//! ```text
//! N1 ──feeder── N2 [splitter] ──drop──► N10 [CPE]
//!                             ──drop──► N11 [CPE]
//!                             ──drop──► N12 [CPE]
//!                             ──drop──► N13 [CPE]
//! ```

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use uuid::Uuid;

use cim_utility_network::aggregate::DisconnectSpanSegmentsCommand;
use cim_utility_network::domain::{ConnectionDirection, SpanSegmentToTerminalDisconnect};
use cim_utility_network::errors::{CollaboratorError, FatalError};
use cim_utility_network::event_store::EventStore;
use cim_utility_network::graph::GraphElement;
use cim_utility_network::projection::UtilityNetworkProjection;
use cim_utility_network::service::{
    GetEquipmentDetails, QueryError, UtilityNetworkQueries, UtilityNetworkService,
};

/// Fiber carrying signal in every cable
const FIBER: usize = 1;

struct AccessNetwork {
    network: TestNetwork,
    feeder: Uuid,
    container: Uuid,
    splitter: Uuid,
    drops: Vec<Uuid>,
    customers: Vec<Uuid>,
}

impl AccessNetwork {
    async fn build() -> Self {
        let network = TestNetwork::new();
        let feeder = network.place_cable(&[1, 2], "feeder").await;
        let container = network.place_container(2).await;
        let splitter = network
            .place_terminal_equipment(container, SPLITTER_SPEC_ID, "Splitter")
            .await;
        let splitter_terminals = network.terminal_ids(splitter);

        let feeder_fiber = network.segment_ids(feeder, FIBER)[0];
        network
            .connect(feeder, 2, feeder_fiber, splitter_terminals[0], ConnectionDirection::In)
            .await;

        let mut drops = Vec::new();
        let mut customers = Vec::new();
        for i in 0..SPLITTER_OUTPUTS as u16 {
            let customer_node = 10 + i;
            let customer = network
                .place_customer(customer_node, &format!("Vestergade {}", i + 1))
                .await;
            let drop = network
                .place_cable(&[2, customer_node], &format!("drop {}", i + 1))
                .await;
            let drop_fiber = network.segment_ids(drop, FIBER)[0];

            network
                .connect(
                    drop,
                    2,
                    drop_fiber,
                    splitter_terminals[1 + i as usize],
                    ConnectionDirection::Out,
                )
                .await;
            network
                .connect(
                    drop,
                    customer_node,
                    drop_fiber,
                    network.terminal_ids(customer)[0],
                    ConnectionDirection::In,
                )
                .await;

            drops.push(drop);
            customers.push(customer);
        }

        Self {
            network,
            feeder,
            container,
            splitter,
            drops,
            customers,
        }
    }

    fn fiber(&self, span_equipment_id: Uuid) -> Uuid {
        self.network.segment_ids(span_equipment_id, FIBER)[0]
    }
}

// ============================================================================
// Graph
// ============================================================================

#[tokio::test]
async fn test_connections_turn_segments_and_terminals_connected() {
    let access = AccessNetwork::build().await;
    let graph = access.network.projection().graph();

    assert!(matches!(
        graph.element(access.fiber(access.feeder)),
        Some(GraphElement::ConnectedSegment(_))
    ));
    assert!(matches!(
        graph.element(access.network.terminal_ids(access.splitter)[0]),
        Some(GraphElement::ConnectedTerminal(_))
    ));
    // The jacket is never connected
    let jacket = access.network.segment_ids(access.feeder, 0)[0];
    assert!(matches!(graph.element(jacket), Some(GraphElement::DisconnectedSegment(_))));
}

#[tokio::test]
async fn test_segment_ids_are_unique_across_the_network() {
    let access = AccessNetwork::build().await;
    let projection = access.network.projection();

    let mut seen = HashSet::new();
    for id in std::iter::once(access.feeder).chain(access.drops.iter().copied()) {
        for (_, _, segment) in access.network.span(id).segments() {
            assert!(seen.insert(segment.id), "segment {} appears twice", segment.id);
            assert!(projection.segment_exists(segment.id));
        }
    }
    assert_eq!(seen.len(), (1 + SPLITTER_OUTPUTS) * 3);
}

// ============================================================================
// Trace
// ============================================================================

#[tokio::test]
async fn test_trace_view_runs_from_feeder_to_customer() {
    let access = AccessNetwork::build().await;
    let splitter_terminals = access.network.terminal_ids(access.splitter);
    let drop_fiber = access.fiber(access.drops[0]);
    let customer_port = access.network.terminal_ids(access.customers[0])[0];

    let view = access
        .network
        .service
        .get_connectivity_trace_view(drop_fiber)
        .await
        .unwrap();

    let ids: Vec<Uuid> = view.hops.iter().map(|h| h.element_id).collect();
    assert_eq!(
        ids,
        vec![
            access.fiber(access.feeder),
            splitter_terminals[0],
            splitter_terminals[1],
            drop_fiber,
            customer_port,
        ]
    );
    assert_eq!(view.start_index, 3);

    let start = &view.hops[view.start_index];
    assert_eq!(start.equipment_name.as_deref(), Some("drop 1"));
    assert_eq!(start.route_node_names, vec!["N2".to_string(), "N10".to_string()]);

    let splitter_input = &view.hops[1];
    assert_eq!(splitter_input.part_name.as_deref(), Some("in"));
    assert_eq!(splitter_input.route_node_names, vec!["N2".to_string()]);
}

#[tokio::test]
async fn test_trace_of_disconnected_segment_is_only_itself() {
    let network = TestNetwork::new();
    let conduit = network.place_conduit(&[1, 2]).await;
    let segment = network.segment_ids(conduit, 0)[0];

    let trace = network.projection().graph().trace(segment).unwrap();
    assert!(trace.is_empty());

    let view = network.service.get_connectivity_trace_view(segment).await.unwrap();
    assert_eq!(view.hops.len(), 1);
    assert_eq!(view.start_index, 0);
    assert_eq!(view.hops[0].kind, "disconnected_segment");
}

#[tokio::test]
async fn test_trace_of_unknown_element_is_not_found() {
    let network = TestNetwork::new();
    let id = Uuid::now_v7();

    let error = network.service.get_connectivity_trace_view(id).await.unwrap_err();

    assert!(matches!(error, QueryError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn test_junction_at_route_node_joins_two_cables() {
    let network = TestNetwork::new();
    let west = network.place_cable(&[1, 2], "west").await;
    let east = network.place_cable(&[2, 3], "east").await;
    let west_fiber = network.segment_ids(west, FIBER)[0];
    let east_fiber = network.segment_ids(east, FIBER)[0];

    network.join_at(2, vec![west_fiber, east_fiber]).await;

    let view = network.service.get_connectivity_trace_view(west_fiber).await.unwrap();
    assert_eq!(view.start_index, 0);
    assert_eq!(view.hops.len(), 3);
    assert_eq!(view.hops[1].kind, "simple_terminal");
    assert_eq!(view.hops[1].route_node_names, vec!["N2".to_string()]);
    assert_eq!(view.hops[2].element_id, east_fiber);

    // Disconnecting one side leaves the west fiber alone again
    let junction = view.hops[1].element_id;
    network
        .service
        .disconnect_span_segments(DisconnectSpanSegmentsCommand {
            span_equipment_id: west,
            disconnects: vec![SpanSegmentToTerminalDisconnect {
                span_segment_id: west_fiber,
                terminal_id: junction,
            }],
            context: context(),
        })
        .await
        .unwrap();

    let view = network.service.get_connectivity_trace_view(west_fiber).await.unwrap();
    assert_eq!(view.hops.len(), 1);
    assert_eq!(network.span(west).segments().filter(|(_, _, s)| s.is_connected()).count(), 0);
}

#[tokio::test]
async fn test_trace_pinned_to_a_version_ignores_later_commits() {
    let network = TestNetwork::new();
    let west = network.place_cable(&[1, 2], "west").await;
    let east = network.place_cable(&[2, 3], "east").await;
    let west_fiber = network.segment_ids(west, FIBER)[0];
    let east_fiber = network.segment_ids(east, FIBER)[0];
    network.join_at(2, vec![west_fiber, east_fiber]).await;

    let graph = network.projection().graph();
    let pinned = graph.committed_version();
    let junction = graph.trace(west_fiber).unwrap().downstream_ids()[0];
    network
        .service
        .disconnect_span_segments(DisconnectSpanSegmentsCommand {
            span_equipment_id: west,
            disconnects: vec![SpanSegmentToTerminalDisconnect {
                span_segment_id: west_fiber,
                terminal_id: junction,
            }],
            context: context(),
        })
        .await
        .unwrap();

    assert!(graph.committed_version() > pinned);
    assert!(graph.trace(west_fiber).unwrap().is_empty());
    assert_eq!(
        graph.trace_at(west_fiber, pinned).unwrap().downstream_ids(),
        vec![junction, east_fiber]
    );
    assert_eq!(graph.advanced_trace_at(west_fiber, pinned).unwrap().ids().len(), 2);
}

#[tokio::test]
async fn test_query_fails_when_route_network_is_unavailable() {
    let access = AccessNetwork::build().await;
    access.network.route_network.set_unavailable(true);

    let error = access
        .network
        .service
        .get_connectivity_trace_view(access.fiber(access.feeder))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        QueryError::Collaborator(CollaboratorError::Unavailable { .. })
    ));
}

// ============================================================================
// Outage
// ============================================================================

#[tokio::test]
async fn test_feeder_outage_reaches_every_splitter_customer() {
    let access = AccessNetwork::build().await;

    let outage = access.network.service.get_outage_view(access.feeder).await.unwrap();

    assert_eq!(outage.customer_terminations.len(), SPLITTER_OUTPUTS);
    let reached: HashSet<Uuid> = outage
        .customer_terminations
        .iter()
        .map(|c| c.terminal_equipment_id)
        .collect();
    assert_eq!(reached, access.customers.iter().copied().collect::<HashSet<_>>());
    let addresses: HashSet<String> = outage
        .customer_terminations
        .iter()
        .filter_map(|c| c.address.clone())
        .collect();
    assert!(addresses.contains("Vestergade 1"));
    assert!(addresses.contains("Vestergade 4"));
}

#[tokio::test]
async fn test_splitter_outage_counts_each_customer_once() {
    let access = AccessNetwork::build().await;

    let outage = access.network.service.get_outage_view(access.splitter).await.unwrap();

    assert_eq!(outage.customer_terminations.len(), SPLITTER_OUTPUTS);
}

#[tokio::test]
async fn test_drop_outage_reaches_one_customer() {
    let access = AccessNetwork::build().await;

    let outage = access.network.service.get_outage_view(access.drops[2]).await.unwrap();

    assert_eq!(outage.customer_terminations.len(), 1);
    assert_eq!(outage.customer_terminations[0].terminal_equipment_id, access.customers[2]);
    assert_eq!(outage.customer_terminations[0].terminal_name, "port");
}

#[tokio::test]
async fn test_outage_of_unknown_id_is_not_found() {
    let network = TestNetwork::new();

    let error = network.service.get_outage_view(Uuid::now_v7()).await.unwrap_err();

    assert!(matches!(error, QueryError::NotFound(_)));
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_span_equipment_connectivity_view() {
    let access = AccessNetwork::build().await;

    let views = access
        .network
        .service
        .get_span_equipment_connectivity_view(vec![access.feeder])
        .await
        .unwrap();

    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.name.as_deref(), Some("feeder"));
    assert_eq!(view.segments.len(), 3);

    let fiber = &view.segments[FIBER];
    assert_eq!(fiber.from_route_node_name, "N1");
    assert_eq!(fiber.to_route_node_name, "N2");
    assert_eq!(fiber.from_terminal, None);
    let to = fiber.to_terminal.as_ref().unwrap();
    assert_eq!(to.terminal_equipment_id, Some(access.splitter));
    assert_eq!(to.terminal_name.as_deref(), Some("in"));
    assert_eq!(to.equipment_name.as_deref(), Some("Splitter"));
}

#[tokio::test]
async fn test_equipment_details_by_id_and_by_interest() {
    let access = AccessNetwork::build().await;
    let service = &access.network.service;

    let details = service
        .get_equipment_details(GetEquipmentDetails::by_equipment_ids(vec![
            access.feeder,
            access.splitter,
            access.container,
            Uuid::now_v7(),
        ]))
        .await
        .unwrap();
    assert_eq!(details.span_equipment.len(), 1);
    assert_eq!(details.terminal_equipment.len(), 1);
    assert_eq!(details.node_containers.len(), 1);

    let feeder_walk = access.network.span(access.feeder).walk_of_interest_id;
    let details = service
        .get_equipment_details(GetEquipmentDetails::by_interest_ids(vec![feeder_walk]))
        .await
        .unwrap();
    assert_eq!(details.span_equipment.len(), 1);
    assert_eq!(details.span_equipment[0].id, access.feeder);
    assert!(details.terminal_equipment.is_empty());
}

#[tokio::test]
async fn test_equipment_details_rejects_mixed_or_empty_filters() {
    let network = TestNetwork::new();

    let mixed = GetEquipmentDetails {
        equipment_ids: vec![Uuid::now_v7()],
        interest_ids: vec![Uuid::now_v7()],
    };
    let error = network.service.get_equipment_details(mixed).await.unwrap_err();
    assert!(matches!(error, QueryError::InvalidFilter(_)));

    let error = network
        .service
        .get_equipment_details(GetEquipmentDetails::default())
        .await
        .unwrap_err();
    assert!(matches!(error, QueryError::InvalidFilter(_)));
}

// ============================================================================
// Replay
// ============================================================================

#[tokio::test]
async fn test_replaying_the_log_rebuilds_the_same_projection() {
    let access = AccessNetwork::build().await;
    let events = access.network.service.event_store().read_all().await.unwrap();

    let rebuilt = UtilityNetworkProjection::new(16);
    rebuilt.replay(&events).unwrap();

    assert_eq!(rebuilt.snapshot(), access.network.projection().snapshot());
}

#[tokio::test]
async fn test_replaying_twice_is_fatal() {
    let access = AccessNetwork::build().await;
    let events = access.network.service.event_store().read_all().await.unwrap();
    let rebuilt = UtilityNetworkProjection::new(16);
    rebuilt.replay(&events).unwrap();

    let error = rebuilt.replay(&events).unwrap_err();

    assert!(matches!(error, FatalError::EventOutOfOrder { .. }));
}
