// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-utility-network
//!
//! Provides a specification catalog, in-memory route network and address
//! collaborators, and a service wired to an in-memory event store.
//!
//! # Design Principles
//! - Specification, manufacturer and route node ids are fixed constants
//! - Timestamps are fixed; only equipment-internal ids come from the handlers
//! - Helpers place equipment through the service, never by hand-built events
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use cim_utility_network::aggregate::{
    CommandContext, ConnectSpanSegmentsAtRouteNodeCommand, ConnectSpanSegmentsToTerminalsCommand,
    CutSpanSegmentsCommand, PlaceNodeContainerCommand, PlaceSpanEquipmentCommand,
    PlaceTerminalEquipmentCommand,
};
use cim_utility_network::domain::*;
use cim_utility_network::errors::CollaboratorError;
use cim_utility_network::event_store::InMemoryEventStore;
use cim_utility_network::projection::UtilityNetworkProjection;
use cim_utility_network::service::{EventSourcedUtilityNetworkService, UtilityNetworkService};

// Fixed catalog ids
pub const MANUFACTURER_ID: &str = "01934f4a-4000-7000-8000-000000004000";
pub const CONDUIT_SPEC_ID: &str = "01934f4a-5001-7000-8000-000000005001";
pub const OTHER_CONDUIT_SPEC_ID: &str = "01934f4a-5002-7000-8000-000000005002";
pub const CABLE_SPEC_ID: &str = "01934f4a-5003-7000-8000-000000005003";
pub const OUTER_CONDUIT_STRUCTURE_ID: &str = "01934f4a-5101-7000-8000-000000005101";
pub const INNER_CONDUIT_STRUCTURE_ID: &str = "01934f4a-5102-7000-8000-000000005102";
pub const FIBER_STRUCTURE_ID: &str = "01934f4a-5103-7000-8000-000000005103";
pub const SPLICE_TRAY_STRUCTURE_ID: &str = "01934f4a-6101-7000-8000-000000006101";
pub const SPLITTER_STRUCTURE_ID: &str = "01934f4a-6102-7000-8000-000000006102";
pub const CUSTOMER_PORT_STRUCTURE_ID: &str = "01934f4a-6103-7000-8000-000000006103";
pub const SPLICE_CLOSURE_SPEC_ID: &str = "01934f4a-6001-7000-8000-000000006001";
pub const SPLITTER_SPEC_ID: &str = "01934f4a-6002-7000-8000-000000006002";
pub const CUSTOMER_TERMINATION_SPEC_ID: &str = "01934f4a-6003-7000-8000-000000006003";
pub const RACK_EQUIPMENT_SPEC_ID: &str = "01934f4a-6004-7000-8000-000000006004";
pub const NODE_CONTAINER_SPEC_ID: &str = "01934f4a-7001-7000-8000-000000007001";
pub const RACK_SPEC_ID: &str = "01934f4a-7002-7000-8000-000000007002";

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// Outputs of the fixture splitter
pub const SPLITTER_OUTPUTS: usize = 4;

/// Rack units taken by the fixture rack equipment
pub const RACK_EQUIPMENT_HEIGHT: u16 = 2;

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn context() -> CommandContext {
    CommandContext::new(fixed_timestamp(), parse_uuid(CORRELATION_ID_1))
}

/// Route node `n`, named "N<n>" in the fake route network
pub fn node(n: u16) -> Uuid {
    Uuid::from_u128(0x01934f4a_3000_7000_8000_000000000000 + n as u128)
}

/// Route segment between route nodes `a` and `b`
pub fn route_segment(a: u16, b: u16) -> Uuid {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    Uuid::from_u128(0x01934f4a_3100_7000_8000_000000000000 + ((low as u128) << 16) + high as u128)
}

/// Alternating node/segment ids of a walk through the given route nodes
pub fn walk_elements(nodes: &[u16]) -> Vec<Uuid> {
    let mut elements = Vec::with_capacity(nodes.len() * 2);
    for (i, n) in nodes.iter().enumerate() {
        if i > 0 {
            elements.push(route_segment(nodes[i - 1], *n));
        }
        elements.push(node(*n));
    }
    elements
}

// ============================================================================
// Collaborator fakes
// ============================================================================

/// In-memory route network; clones share state
#[derive(Debug, Clone, Default)]
pub struct FakeRouteNetwork {
    interests: Arc<DashMap<Uuid, RouteNetworkInterest>>,
    names: Arc<DashMap<Uuid, String>>,
    unavailable: Arc<AtomicBool>,
}

impl FakeRouteNetwork {
    pub fn name_node(&self, n: u16) {
        self.names.insert(node(n), format!("N{}", n));
    }

    pub fn add_interest(&self, interest: RouteNetworkInterest) -> Uuid {
        let id = interest.id;
        self.interests.insert(id, interest);
        id
    }

    pub fn has_interest(&self, interest_id: Uuid) -> bool {
        self.interests.contains_key(&interest_id)
    }

    /// Make every call fail until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CollaboratorError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable {
                collaborator: "route network",
                message: "connection refused".into(),
            });
        }
        Ok(())
    }
}

impl RouteNetworkLookup for FakeRouteNetwork {
    fn interest(&self, interest_id: Uuid) -> Result<RouteNetworkInterest, CollaboratorError> {
        self.check()?;
        self.interests
            .get(&interest_id)
            .map(|i| i.clone())
            .ok_or(CollaboratorError::NotFound {
                collaborator: "route network",
                id: interest_id,
            })
    }

    fn route_node_name(&self, route_node_id: Uuid) -> Result<Option<String>, CollaboratorError> {
        self.check()?;
        Ok(self.names.get(&route_node_id).map(|n| n.clone()))
    }

    fn register_walk_of_interest(
        &self,
        interest_id: Uuid,
        route_network_element_ids: Vec<Uuid>,
    ) -> Result<RouteNetworkInterest, CollaboratorError> {
        self.check()?;
        let interest = RouteNetworkInterest::walk(interest_id, route_network_element_ids);
        self.interests.insert(interest_id, interest.clone());
        Ok(interest)
    }

    fn unregister_interest(&self, interest_id: Uuid) -> Result<(), CollaboratorError> {
        self.check()?;
        self.interests.remove(&interest_id);
        Ok(())
    }
}

/// In-memory address book
#[derive(Debug, Clone, Default)]
pub struct FakeAddresses {
    display: Arc<DashMap<Uuid, String>>,
}

impl FakeAddresses {
    pub fn add(&self, address_id: Uuid, display: impl Into<String>) {
        self.display.insert(address_id, display.into());
    }
}

impl AddressLookup for FakeAddresses {
    fn address_display(&self, address_id: Uuid) -> Result<Option<String>, CollaboratorError> {
        Ok(self.display.get(&address_id).map(|d| d.clone()))
    }
}

// ============================================================================
// Catalog
// ============================================================================

fn terminals(names: impl IntoIterator<Item = String>) -> Vec<TerminalTemplate> {
    names
        .into_iter()
        .map(|name| TerminalTemplate::new(name, TerminalDirection::Bidirectional))
        .collect()
}

fn terminal_equipment_spec(
    id: &str,
    name: &str,
    structure_id: &str,
    is_customer_termination: bool,
    is_rack_equipment: bool,
) -> TerminalEquipmentSpecification {
    TerminalEquipmentSpecification {
        id: parse_uuid(id),
        category: "Terminal equipment".into(),
        name: name.into(),
        short_name: name.into(),
        is_rack_equipment,
        height_in_rack_units: if is_rack_equipment { RACK_EQUIPMENT_HEIGHT } else { 0 },
        is_customer_termination,
        structure_templates: vec![TerminalStructureTemplate {
            terminal_structure_specification_id: parse_uuid(structure_id),
            position: 1,
        }],
        manufacturer_refs: vec![parse_uuid(MANUFACTURER_ID)],
        deprecated: false,
    }
}

/// Catalog with conduits, a cable, a splice closure, a 1:4 splitter, a
/// customer termination, rack equipment, a container and a rack
pub fn catalog() -> SpecificationCatalog {
    let catalog = SpecificationCatalog::new();

    catalog.add_manufacturer(Manufacturer {
        id: parse_uuid(MANUFACTURER_ID),
        name: "Emtelle".into(),
    });

    for (id, name) in [
        (OUTER_CONDUIT_STRUCTURE_ID, "Ø40"),
        (INNER_CONDUIT_STRUCTURE_ID, "Ø10"),
        (FIBER_STRUCTURE_ID, "Fiber"),
    ] {
        catalog.add_span_structure_specification(SpanStructureSpecification {
            id: parse_uuid(id),
            category: "Structure".into(),
            name: name.into(),
            color: "Orange".into(),
            inner_diameter: None,
            outer_diameter: None,
        });
    }

    let conduit_template = SpanStructureTemplate::new(parse_uuid(OUTER_CONDUIT_STRUCTURE_ID), 1, 1)
        .with_child(SpanStructureTemplate::new(parse_uuid(INNER_CONDUIT_STRUCTURE_ID), 2, 1))
        .with_child(SpanStructureTemplate::new(parse_uuid(INNER_CONDUIT_STRUCTURE_ID), 2, 2));

    for (id, name) in [(CONDUIT_SPEC_ID, "Ø40 2x10"), (OTHER_CONDUIT_SPEC_ID, "Ø50 2x10")] {
        catalog.add_span_equipment_specification(SpanEquipmentSpecification {
            id: parse_uuid(id),
            category: "Conduit".into(),
            name: name.into(),
            version: "1".into(),
            root_template: conduit_template.clone(),
            manufacturer_refs: vec![parse_uuid(MANUFACTURER_ID)],
            is_cable: false,
            deprecated: false,
        });
    }

    catalog.add_span_equipment_specification(SpanEquipmentSpecification {
        id: parse_uuid(CABLE_SPEC_ID),
        category: "Cable".into(),
        name: "2 fiber".into(),
        version: "1".into(),
        root_template: SpanStructureTemplate::new(parse_uuid(OUTER_CONDUIT_STRUCTURE_ID), 1, 1)
            .with_child(SpanStructureTemplate::new(parse_uuid(FIBER_STRUCTURE_ID), 2, 1))
            .with_child(SpanStructureTemplate::new(parse_uuid(FIBER_STRUCTURE_ID), 2, 2)),
        manufacturer_refs: Vec::new(),
        is_cable: true,
        deprecated: false,
    });

    catalog.add_terminal_structure_specification(TerminalStructureSpecification {
        id: parse_uuid(SPLICE_TRAY_STRUCTURE_ID),
        category: "Tray".into(),
        name: "12 pin tray".into(),
        short_name: "T12".into(),
        terminal_templates: terminals((1..=12).map(|i| i.to_string())),
    });

    let mut splitter_terminals =
        vec![TerminalTemplate::new("in", TerminalDirection::Inbound).with_internal_node("split")];
    splitter_terminals.extend((1..=SPLITTER_OUTPUTS).map(|i| {
        TerminalTemplate::new(format!("out-{}", i), TerminalDirection::Outbound).with_internal_node("split")
    }));
    catalog.add_terminal_structure_specification(TerminalStructureSpecification {
        id: parse_uuid(SPLITTER_STRUCTURE_ID),
        category: "Splitter".into(),
        name: "1:4 splitter".into(),
        short_name: "1:4".into(),
        terminal_templates: splitter_terminals,
    });

    catalog.add_terminal_structure_specification(TerminalStructureSpecification {
        id: parse_uuid(CUSTOMER_PORT_STRUCTURE_ID),
        category: "Port".into(),
        name: "Customer port".into(),
        short_name: "P".into(),
        terminal_templates: terminals(["port".to_string()]),
    });

    catalog.add_terminal_equipment_specification(terminal_equipment_spec(
        SPLICE_CLOSURE_SPEC_ID,
        "Splice closure",
        SPLICE_TRAY_STRUCTURE_ID,
        false,
        false,
    ));
    catalog.add_terminal_equipment_specification(terminal_equipment_spec(
        SPLITTER_SPEC_ID,
        "Splitter 1:4",
        SPLITTER_STRUCTURE_ID,
        false,
        false,
    ));
    catalog.add_terminal_equipment_specification(terminal_equipment_spec(
        CUSTOMER_TERMINATION_SPEC_ID,
        "Customer termination",
        CUSTOMER_PORT_STRUCTURE_ID,
        true,
        false,
    ));
    catalog.add_terminal_equipment_specification(terminal_equipment_spec(
        RACK_EQUIPMENT_SPEC_ID,
        "ODF panel",
        SPLICE_TRAY_STRUCTURE_ID,
        false,
        true,
    ));

    catalog.add_node_container_specification(NodeContainerSpecification {
        id: parse_uuid(NODE_CONTAINER_SPEC_ID),
        category: "Cabinet".into(),
        name: "Street cabinet".into(),
        manufacturer_refs: Vec::new(),
    });
    catalog.add_rack_specification(RackSpecification {
        id: parse_uuid(RACK_SPEC_ID),
        name: "19 inch rack".into(),
        short_name: "19\"".into(),
    });

    catalog
}

// ============================================================================
// Service harness
// ============================================================================

pub type TestService = EventSourcedUtilityNetworkService<InMemoryEventStore, FakeRouteNetwork, FakeAddresses>;

pub struct TestNetwork {
    pub service: TestService,
    pub route_network: FakeRouteNetwork,
    pub addresses: FakeAddresses,
    pub catalog: SpecificationCatalog,
}

impl TestNetwork {
    /// Empty network with route nodes 1..=20 named
    pub fn new() -> Self {
        let route_network = FakeRouteNetwork::default();
        for n in 1..=20 {
            route_network.name_node(n);
        }
        let addresses = FakeAddresses::default();
        let catalog = catalog();
        let service = EventSourcedUtilityNetworkService::new(
            InMemoryEventStore::new(),
            Arc::new(UtilityNetworkProjection::new(16)),
            Arc::new(catalog.clone()),
            route_network.clone(),
            addresses.clone(),
        );
        Self {
            service,
            route_network,
            addresses,
            catalog,
        }
    }

    pub fn projection(&self) -> &Arc<UtilityNetworkProjection> {
        self.service.projection()
    }

    /// Register a walk of interest through the given route nodes
    pub fn walk(&self, nodes: &[u16]) -> Uuid {
        self.route_network
            .add_interest(RouteNetworkInterest::walk(Uuid::now_v7(), walk_elements(nodes)))
    }

    /// Register a node of interest at route node `n`
    pub fn node_interest(&self, n: u16) -> Uuid {
        self.route_network
            .add_interest(RouteNetworkInterest::node(Uuid::now_v7(), node(n)))
    }

    pub fn place_span_command(&self, spec_id: &str, nodes: &[u16], name: &str) -> PlaceSpanEquipmentCommand {
        PlaceSpanEquipmentCommand {
            span_equipment_id: Uuid::now_v7(),
            specification_id: parse_uuid(spec_id),
            interest_id: self.walk(nodes),
            naming: NamingInfo::named(name),
            marking: None,
            manufacturer_id: None,
            utility_network_hops: Vec::new(),
            context: context(),
        }
    }

    pub async fn place_span(&self, spec_id: &str, nodes: &[u16], name: &str) -> Uuid {
        self.service
            .place_span_equipment(self.place_span_command(spec_id, nodes, name))
            .await
            .expect("span equipment placement failed")
    }

    pub async fn place_conduit(&self, nodes: &[u16]) -> Uuid {
        self.place_span(CONDUIT_SPEC_ID, nodes, "conduit").await
    }

    pub async fn place_cable(&self, nodes: &[u16], name: &str) -> Uuid {
        self.place_span(CABLE_SPEC_ID, nodes, name).await
    }

    pub async fn place_container(&self, n: u16) -> Uuid {
        self.service
            .place_node_container(PlaceNodeContainerCommand {
                node_container_id: Uuid::now_v7(),
                specification_id: parse_uuid(NODE_CONTAINER_SPEC_ID),
                interest_id: self.node_interest(n),
                manufacturer_id: None,
                context: context(),
            })
            .await
            .expect("node container placement failed")
    }

    pub fn place_terminal_command(
        &self,
        container_id: Uuid,
        spec_id: &str,
        name: &str,
    ) -> PlaceTerminalEquipmentCommand {
        PlaceTerminalEquipmentCommand {
            terminal_equipment_id: Uuid::now_v7(),
            specification_id: parse_uuid(spec_id),
            node_container_id: container_id,
            naming: NamingInfo::named(name),
            lifecycle: LifecycleInfo::default(),
            address: None,
            manufacturer_id: None,
            rack: None,
            context: context(),
        }
    }

    pub async fn place_terminal_equipment(&self, container_id: Uuid, spec_id: &str, name: &str) -> Uuid {
        self.service
            .place_terminal_equipment(self.place_terminal_command(container_id, spec_id, name))
            .await
            .expect("terminal equipment placement failed")
    }

    /// Customer termination at its own container, with a resolvable address
    pub async fn place_customer(&self, n: u16, address: &str) -> Uuid {
        let container = self.place_container(n).await;
        let address_id = Uuid::now_v7();
        self.addresses.add(address_id, address);
        let mut command = self.place_terminal_command(container, CUSTOMER_TERMINATION_SPEC_ID, &format!("CPE {}", n));
        command.address = Some(AddressInfo {
            access_address_id: Some(address_id),
            unit_address_id: None,
            remark: None,
        });
        self.service
            .place_terminal_equipment(command)
            .await
            .expect("customer termination placement failed")
    }

    /// Terminal ids of a terminal equipment in structure order
    pub fn terminal_ids(&self, terminal_equipment_id: Uuid) -> Vec<Uuid> {
        self.projection()
            .terminal_equipment(terminal_equipment_id)
            .expect("terminal equipment not projected")
            .terminals()
            .map(|(_, _, t)| t.id)
            .collect()
    }

    pub fn span(&self, span_equipment_id: Uuid) -> Arc<SpanEquipment> {
        self.projection()
            .span_equipment(span_equipment_id)
            .expect("span equipment not projected")
    }

    /// Segment ids of one structure, in order
    pub fn segment_ids(&self, span_equipment_id: Uuid, structure_index: usize) -> Vec<Uuid> {
        self.span(span_equipment_id).span_structures[structure_index]
            .span_segments
            .iter()
            .map(|s| s.id)
            .collect()
    }

    pub async fn cut(&self, span_equipment_id: Uuid, n: u16) {
        self.service
            .cut_span_segments(CutSpanSegmentsCommand {
                span_equipment_id,
                route_node_id: node(n),
                span_segment_ids: Vec::new(),
                context: context(),
            })
            .await
            .expect("cut failed")
    }

    /// Connect one segment end to a terminal at route node `n`
    pub async fn connect(
        &self,
        span_equipment_id: Uuid,
        n: u16,
        span_segment_id: Uuid,
        terminal_id: Uuid,
        direction: ConnectionDirection,
    ) {
        self.service
            .connect_span_segments_to_terminals(ConnectSpanSegmentsToTerminalsCommand {
                span_equipment_id,
                route_node_id: node(n),
                connects: vec![SpanSegmentToTerminalConnect {
                    span_segment_id,
                    terminal_id,
                    direction,
                }],
                context: context(),
            })
            .await
            .expect("connect failed")
    }

    pub async fn join_at(&self, n: u16, span_segment_ids: Vec<Uuid>) {
        self.service
            .connect_span_segments_at_route_node(ConnectSpanSegmentsAtRouteNodeCommand {
                route_node_id: node(n),
                span_segment_ids,
                context: context(),
            })
            .await
            .expect("junction connect failed")
    }
}
