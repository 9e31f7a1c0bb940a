// Copyright (c) 2025 - Cowboy AI, Inc.
//! Utility Network Domain Models
//!
//! Immutable structural models of the equipment tracked by the network, the
//! specification catalog they are built from and the collaborator interfaces
//! the core consumes.
//!
//! # Equipment
//!
//! - [`SpanEquipment`] - conduits and cables following a route walk
//! - [`TerminalEquipment`] - splice closures, splitters, line cards
//! - [`NodeContainer`] - cabinets, manholes and buildings holding racks
//!
//! # Collaborators
//!
//! - [`RouteNetworkLookup`] - route network interests and node names
//! - [`AddressLookup`] - address display strings

pub mod info;
pub mod node_container;
pub mod route_network;
pub mod span_equipment;
pub mod specification;
pub mod terminal_equipment;

pub use info::{AddressInfo, DeploymentState, LifecycleInfo, MarkingInfo, NamingInfo};
pub use node_container::{
    NodeContainer, Rack, RackPlacement, SubrackMount, VerticalContentAlignment,
};
pub use route_network::{AddressLookup, InterestKind, RouteNetworkInterest, RouteNetworkLookup};
pub use span_equipment::{
    build_span_structures, merge_span_equipment, ConnectionDirection, MergedSpanEquipment,
    NodeContainerSide, SegmentEnd, SpanEquipment, SpanEquipmentNodeContainerAffix, SpanSegment,
    SpanSegmentCut, SpanSegmentToTerminalConnect, SpanSegmentToTerminalDisconnect, SpanStructure,
    UtilityNetworkHop,
};
pub use specification::{
    Manufacturer, NodeContainerSpecification, RackSpecification, SpanEquipmentSpecification,
    SpanStructureSpecification, SpanStructureTemplate, SpecificationCatalog,
    TerminalEquipmentSpecification, TerminalStructureSpecification, TerminalStructureTemplate,
    TerminalTemplate,
};
pub use terminal_equipment::{
    build_terminal_structures, Terminal, TerminalDirection, TerminalEquipment, TerminalStructure,
};
