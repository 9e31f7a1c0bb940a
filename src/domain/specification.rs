// Copyright (c) 2025 - Cowboy AI, Inc.
//! Specification Catalog
//!
//! Equipment is always created from a specification template. Catalog CRUD
//! lives outside this crate; the catalog here is the read model the aggregates
//! validate against. It is populated by the host before commands or replay run.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::terminal_equipment::TerminalDirection;

/// Manufacturer of equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: Uuid,
    pub name: String,
}

/// Template node of a span equipment structure tree
///
/// The root template is the outer conduit or cable jacket; children are inner
/// conduits, tubes or fibers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStructureTemplate {
    pub span_structure_specification_id: Uuid,
    pub level: u8,
    pub position: u16,
    pub child_templates: Vec<SpanStructureTemplate>,
}

impl SpanStructureTemplate {
    /// Leaf template
    pub fn new(span_structure_specification_id: Uuid, level: u8, position: u16) -> Self {
        Self {
            span_structure_specification_id,
            level,
            position,
            child_templates: Vec::new(),
        }
    }

    /// Add a child template
    pub fn with_child(mut self, child: SpanStructureTemplate) -> Self {
        self.child_templates.push(child);
        self
    }

    /// Total number of templates in this subtree
    pub fn count(&self) -> usize {
        1 + self
            .child_templates
            .iter()
            .map(SpanStructureTemplate::count)
            .sum::<usize>()
    }
}

/// Conduit/cable specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentSpecification {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub version: String,
    pub root_template: SpanStructureTemplate,
    pub manufacturer_refs: Vec<Uuid>,
    pub is_cable: bool,
    pub deprecated: bool,
}

/// Specification of one span structure (an inner conduit, a tube, a fiber)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStructureSpecification {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub color: String,
    pub inner_diameter: Option<u32>,
    pub outer_diameter: Option<u32>,
}

/// Template of one terminal within a terminal structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalTemplate {
    pub name: String,
    pub direction: TerminalDirection,
    /// Terminals naming the same internal node are wired together inside the equipment
    pub internal_connectivity_node: Option<String>,
}

impl TerminalTemplate {
    pub fn new(name: impl Into<String>, direction: TerminalDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            internal_connectivity_node: None,
        }
    }

    pub fn with_internal_node(mut self, node_name: impl Into<String>) -> Self {
        self.internal_connectivity_node = Some(node_name.into());
        self
    }
}

/// Splice tray, splitter, line card ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStructureSpecification {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub short_name: String,
    pub terminal_templates: Vec<TerminalTemplate>,
}

/// Placement of a structure specification within a terminal equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStructureTemplate {
    pub terminal_structure_specification_id: Uuid,
    pub position: u16,
}

/// Terminal equipment specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentSpecification {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub short_name: String,
    pub is_rack_equipment: bool,
    pub height_in_rack_units: u16,
    /// Traces stop at customer terminations
    pub is_customer_termination: bool,
    pub structure_templates: Vec<TerminalStructureTemplate>,
    pub manufacturer_refs: Vec<Uuid>,
    pub deprecated: bool,
}

/// Node container (cabinet, manhole, building) specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainerSpecification {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub manufacturer_refs: Vec<Uuid>,
}

/// Rack specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackSpecification {
    pub id: Uuid,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Default)]
struct CatalogData {
    manufacturers: HashMap<Uuid, Arc<Manufacturer>>,
    span_equipment: HashMap<Uuid, Arc<SpanEquipmentSpecification>>,
    span_structures: HashMap<Uuid, Arc<SpanStructureSpecification>>,
    terminal_equipment: HashMap<Uuid, Arc<TerminalEquipmentSpecification>>,
    terminal_structures: HashMap<Uuid, Arc<TerminalStructureSpecification>>,
    node_containers: HashMap<Uuid, Arc<NodeContainerSpecification>>,
    racks: HashMap<Uuid, Arc<RackSpecification>>,
}

/// Shared, read-mostly specification catalog
///
/// Cloning is cheap; all clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct SpecificationCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl SpecificationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_manufacturer(&self, manufacturer: Manufacturer) {
        self.data
            .write()
            .manufacturers
            .insert(manufacturer.id, Arc::new(manufacturer));
    }

    pub fn add_span_equipment_specification(&self, spec: SpanEquipmentSpecification) {
        self.data.write().span_equipment.insert(spec.id, Arc::new(spec));
    }

    pub fn add_span_structure_specification(&self, spec: SpanStructureSpecification) {
        self.data.write().span_structures.insert(spec.id, Arc::new(spec));
    }

    pub fn add_terminal_equipment_specification(&self, spec: TerminalEquipmentSpecification) {
        self.data
            .write()
            .terminal_equipment
            .insert(spec.id, Arc::new(spec));
    }

    pub fn add_terminal_structure_specification(&self, spec: TerminalStructureSpecification) {
        self.data
            .write()
            .terminal_structures
            .insert(spec.id, Arc::new(spec));
    }

    pub fn add_node_container_specification(&self, spec: NodeContainerSpecification) {
        self.data.write().node_containers.insert(spec.id, Arc::new(spec));
    }

    pub fn add_rack_specification(&self, spec: RackSpecification) {
        self.data.write().racks.insert(spec.id, Arc::new(spec));
    }

    pub fn manufacturer(&self, id: Uuid) -> Option<Arc<Manufacturer>> {
        self.data.read().manufacturers.get(&id).cloned()
    }

    pub fn span_equipment_specification(&self, id: Uuid) -> Option<Arc<SpanEquipmentSpecification>> {
        self.data.read().span_equipment.get(&id).cloned()
    }

    pub fn span_structure_specification(&self, id: Uuid) -> Option<Arc<SpanStructureSpecification>> {
        self.data.read().span_structures.get(&id).cloned()
    }

    pub fn terminal_equipment_specification(
        &self,
        id: Uuid,
    ) -> Option<Arc<TerminalEquipmentSpecification>> {
        self.data.read().terminal_equipment.get(&id).cloned()
    }

    pub fn terminal_structure_specification(
        &self,
        id: Uuid,
    ) -> Option<Arc<TerminalStructureSpecification>> {
        self.data.read().terminal_structures.get(&id).cloned()
    }

    pub fn node_container_specification(&self, id: Uuid) -> Option<Arc<NodeContainerSpecification>> {
        self.data.read().node_containers.get(&id).cloned()
    }

    pub fn rack_specification(&self, id: Uuid) -> Option<Arc<RackSpecification>> {
        self.data.read().racks.get(&id).cloned()
    }
}
