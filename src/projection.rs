// Copyright (c) 2025 - Cowboy AI, Inc.
//! Utility Network Projection
//!
//! The materialized state every command and query reads: three equipment
//! indexes, a few secondary lookups and the connectivity graph. It is derived
//! from the event log only, once by replay at startup and then incrementally
//! as events are appended.
//!
//! # Application order
//!
//! ```text
//! StoredEvent ──> version check ──> evolve(record) ──> graph commit ──> CAS index ──> secondary indexes
//! ```
//!
//! Events must arrive in per-aggregate sequence. A gap, a replayed event or an
//! index holding something other than the record the event was evolved from
//! is a [`FatalError`]: the projection no longer matches the log.
//!
//! # Example
//!
//! ```rust,ignore
//! let projection = UtilityNetworkProjection::from_config(&config);
//! projection.replay(&store.read_all().await?)?;
//!
//! let trace = projection.graph().advanced_trace(terminal_id);
//! ```

pub mod index;

pub use index::EquipmentIndex;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::aggregate::{node_container, span_equipment, terminal_equipment};
use crate::config::UtilityNetworkConfig;
use crate::domain::{NodeContainer, SpanEquipment, TerminalEquipment};
use crate::errors::FatalError;
use crate::event_store::StoredEvent;
use crate::events::{NodeContainerEvent, SpanEquipmentEvent, TerminalEquipmentEvent, UtilityNetworkEvent};
use crate::graph::{GraphElement, UtilityGraph};

const SPAN_EQUIPMENT: &str = "span_equipment";
const TERMINAL_EQUIPMENT: &str = "terminal_equipment";
const NODE_CONTAINER: &str = "node_container";

/// Projection Adapter trait
///
/// Something that consumes the event log in order. The host feeds it every
/// stored event; implementations must apply them in sequence and report
/// anything they cannot apply.
#[async_trait]
pub trait ProjectionAdapter: Send + Sync {
    /// The event type this projection handles
    type Event: Send + Sync;

    /// Error type for projection operations
    type Error: std::error::Error + Send + Sync;

    /// Project one event
    async fn project(&self, event: Self::Event) -> Result<(), Self::Error>;

    /// Get the name of this projection adapter
    fn name(&self) -> &str;
}

/// Owner of a route network interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EquipmentRef {
    SpanEquipment(Uuid),
    NodeContainer(Uuid),
}

/// Materialized utility network state
#[derive(Debug)]
pub struct UtilityNetworkProjection {
    span_equipment: EquipmentIndex<SpanEquipment>,
    terminal_equipment: EquipmentIndex<TerminalEquipment>,
    node_containers: EquipmentIndex<NodeContainer>,
    graph: UtilityGraph,
    /// Last applied sequence per aggregate
    versions: DashMap<Uuid, u64>,
    interests: DashMap<Uuid, EquipmentRef>,
    containers_by_route_node: DashMap<Uuid, Uuid>,
    /// Node container → span equipment affixed to it
    affixed: DashMap<Uuid, Vec<Uuid>>,
    /// Parent span equipment → span equipment routed through it
    children: DashMap<Uuid, Vec<Uuid>>,
}

/// Deterministic, comparable copy of the whole projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSnapshot {
    pub span_equipment: BTreeMap<Uuid, SpanEquipment>,
    pub terminal_equipment: BTreeMap<Uuid, TerminalEquipment>,
    pub node_containers: BTreeMap<Uuid, NodeContainer>,
    pub versions: BTreeMap<Uuid, u64>,
    pub graph_elements: BTreeMap<Uuid, GraphElement>,
}

impl UtilityNetworkProjection {
    /// Empty projection keeping `graph_version_retention` old graph versions
    pub fn new(graph_version_retention: u64) -> Self {
        Self {
            span_equipment: EquipmentIndex::new(SPAN_EQUIPMENT),
            terminal_equipment: EquipmentIndex::new(TERMINAL_EQUIPMENT),
            node_containers: EquipmentIndex::new(NODE_CONTAINER),
            graph: UtilityGraph::new(graph_version_retention),
            versions: DashMap::new(),
            interests: DashMap::new(),
            containers_by_route_node: DashMap::new(),
            affixed: DashMap::new(),
            children: DashMap::new(),
        }
    }

    pub fn from_config(config: &UtilityNetworkConfig) -> Self {
        Self::new(config.graph_version_retention)
    }

    pub fn graph(&self) -> &UtilityGraph {
        &self.graph
    }

    pub fn span_equipment(&self, id: Uuid) -> Option<Arc<SpanEquipment>> {
        self.span_equipment.get(id)
    }

    pub fn terminal_equipment(&self, id: Uuid) -> Option<Arc<TerminalEquipment>> {
        self.terminal_equipment.get(id)
    }

    pub fn node_container(&self, id: Uuid) -> Option<Arc<NodeContainer>> {
        self.node_containers.get(id)
    }

    pub fn span_equipment_count(&self) -> usize {
        self.span_equipment.len()
    }

    pub fn terminal_equipment_count(&self) -> usize {
        self.terminal_equipment.len()
    }

    pub fn node_container_count(&self) -> usize {
        self.node_containers.len()
    }

    /// Last sequence applied for an aggregate
    pub fn version(&self, aggregate_id: Uuid) -> Option<u64> {
        self.versions.get(&aggregate_id).map(|v| *v)
    }

    /// Equipment owning a route network interest
    pub fn equipment_by_interest(&self, interest_id: Uuid) -> Option<EquipmentRef> {
        self.interests.get(&interest_id).map(|r| *r)
    }

    /// Node container standing at a route node
    pub fn container_at_route_node(&self, route_node_id: Uuid) -> Option<Uuid> {
        self.containers_by_route_node.get(&route_node_id).map(|c| *c)
    }

    pub fn child_span_equipment(&self, parent_id: Uuid) -> Vec<Uuid> {
        self.children
            .get(&parent_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn has_child_span_equipment(&self, parent_id: Uuid) -> bool {
        self.children.get(&parent_id).map_or(false, |c| !c.is_empty())
    }

    pub fn affixed_span_equipment(&self, node_container_id: Uuid) -> Vec<Uuid> {
        self.affixed
            .get(&node_container_id)
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn has_affixed_span_equipment(&self, node_container_id: Uuid) -> bool {
        self.affixed.get(&node_container_id).map_or(false, |a| !a.is_empty())
    }

    /// Whether the id is a span segment in the graph right now
    pub fn segment_exists(&self, span_segment_id: Uuid) -> bool {
        self.graph
            .element(span_segment_id)
            .map_or(false, |e| e.is_segment())
    }

    /// Apply a stored event
    pub fn apply_stored(&self, stored: &StoredEvent<UtilityNetworkEvent>) -> Result<(), FatalError> {
        self.apply(stored.sequence, &stored.data)
    }

    /// Apply a log in order
    pub fn replay(&self, events: &[StoredEvent<UtilityNetworkEvent>]) -> Result<(), FatalError> {
        for stored in events {
            self.apply_stored(stored)?;
        }
        debug!(
            events = events.len(),
            graph_version = self.graph.committed_version(),
            "Projection replayed"
        );
        Ok(())
    }

    /// Apply one event carrying the aggregate version `sequence`
    pub fn apply(&self, sequence: u64, event: &UtilityNetworkEvent) -> Result<(), FatalError> {
        let aggregate_id = event.aggregate_id();
        let expected = self.version(aggregate_id).unwrap_or(0) + 1;
        if sequence != expected {
            return Err(FatalError::EventOutOfOrder {
                aggregate_id,
                expected,
                actual: sequence,
            });
        }

        match event {
            UtilityNetworkEvent::SpanEquipment(e) => self.apply_span_equipment(e)?,
            UtilityNetworkEvent::TerminalEquipment(e) => self.apply_terminal_equipment(e)?,
            UtilityNetworkEvent::NodeContainer(e) => self.apply_node_container(e)?,
        }

        self.versions.insert(aggregate_id, sequence);
        debug!(
            %aggregate_id,
            sequence,
            event_type = event.event_type_name(),
            "Event applied"
        );
        Ok(())
    }

    fn apply_span_equipment(&self, event: &SpanEquipmentEvent) -> Result<(), FatalError> {
        use SpanEquipmentEvent::*;

        let id = event.aggregate_id();
        let missing = |id| FatalError::EquipmentMissing { kind: SPAN_EQUIPMENT, id };

        if let SpanEquipmentPlaced(e) = event {
            if self.span_equipment.contains(id) {
                return Err(FatalError::ConcurrencyMismatch { kind: SPAN_EQUIPMENT, id });
            }
            let placed = Arc::new(e.span_equipment.clone());
            let parents = self.parents_of(&placed)?;
            self.graph.register_span_equipment(&placed)?;
            self.span_equipment.compare_and_swap(id, None, Some(Arc::clone(&placed)))?;
            self.reindex_span_equipment(id, None, Some(&placed));
            for parent in parents {
                push_unique(&self.children, parent, id);
            }
            return Ok(());
        }

        let before = self.span_equipment.get(id).ok_or_else(|| missing(id))?;
        let after = span_equipment::evolve(Some(&*before), event).map(Arc::new);
        let next = || after.as_ref().ok_or_else(|| missing(id));

        match event {
            SpanEquipmentPlaced(_) => {}
            SpanSegmentsCut(e) => {
                self.graph.apply_cut(&before, next()?, &e.cuts)?;
            }
            SpanSegmentsConnectedToTerminals(e) => {
                self.graph.apply_connect(&before, next()?, &e.connects)?;
            }
            SpanSegmentsConnectedToSimpleTerminals(e) => {
                self.graph
                    .apply_connect_at_route_node(&before, next()?, e.route_node_id, &e.connects)?;
            }
            SpanSegmentsDisconnectedFromTerminals(_) => {
                self.graph.apply_disconnect(&before, next()?)?;
            }
            SpanEquipmentAffixedToContainer(_)
            | SpanEquipmentDetachedFromContainer(_)
            | SpanEquipmentMoved(_)
            | SpanStructureRemoved(_) => {
                self.graph.update_span_equipment(&before, next()?)?;
            }
            SpanEquipmentMerged(e) => {
                let absorbed = self
                    .span_equipment
                    .get(e.merged_span_equipment_id)
                    .ok_or_else(|| missing(e.merged_span_equipment_id))?;
                self.graph.apply_merge(&before, next()?, &absorbed)?;
            }
            // the survivor's Merged event already took over the segments
            SpanEquipmentMergedInto(_) => {}
            SpanEquipmentRemoved(_) => {
                self.graph.remove_span_equipment(&before)?;
            }
        }

        self.span_equipment
            .compare_and_swap(id, Some(&before), after.clone())?;
        self.reindex_span_equipment(id, Some(&before), after.as_deref());

        match event {
            SpanEquipmentMerged(e) => self.transfer_children(e.merged_span_equipment_id, id),
            SpanEquipmentMergedInto(_) | SpanEquipmentRemoved(_) => self.forget_child(id),
            _ => {}
        }
        Ok(())
    }

    fn apply_terminal_equipment(&self, event: &TerminalEquipmentEvent) -> Result<(), FatalError> {
        use TerminalEquipmentEvent::*;

        let id = event.aggregate_id();

        if let TerminalEquipmentPlaced(e) = event {
            if self.terminal_equipment.contains(id) {
                return Err(FatalError::ConcurrencyMismatch { kind: TERMINAL_EQUIPMENT, id });
            }
            let placed = Arc::new(e.terminal_equipment.clone());
            self.graph.register_terminal_equipment(&placed)?;
            return self
                .terminal_equipment
                .compare_and_swap(id, None, Some(placed));
        }

        let before = self
            .terminal_equipment
            .get(id)
            .ok_or(FatalError::EquipmentMissing { kind: TERMINAL_EQUIPMENT, id })?;
        let after = terminal_equipment::evolve(Some(&*before), event).map(Arc::new);

        match &after {
            Some(after) => self.graph.update_terminal_equipment(&before, after)?,
            None => self.graph.remove_terminal_equipment(&before)?,
        };

        self.terminal_equipment.compare_and_swap(id, Some(&before), after)
    }

    fn apply_node_container(&self, event: &NodeContainerEvent) -> Result<(), FatalError> {
        let id = event.aggregate_id();
        let before = self.node_containers.get(id);

        if before.is_none() && !matches!(event, NodeContainerEvent::NodeContainerPlaced(_)) {
            return Err(FatalError::EquipmentMissing { kind: NODE_CONTAINER, id });
        }
        let after = node_container::evolve(before.as_deref(), event).map(Arc::new);

        self.node_containers
            .compare_and_swap(id, before.as_ref(), after.clone())?;

        if let Some(before) = &before {
            self.interests
                .remove_if(&before.interest_id, |_, r| *r == EquipmentRef::NodeContainer(id));
            self.containers_by_route_node
                .remove_if(&before.route_node_id, |_, c| *c == id);
        }
        if let Some(after) = &after {
            self.interests
                .insert(after.interest_id, EquipmentRef::NodeContainer(id));
            self.containers_by_route_node.insert(after.route_node_id, id);
        }
        Ok(())
    }

    /// Span equipment owning the hop parent segments
    fn parents_of(&self, span_equipment: &SpanEquipment) -> Result<Vec<Uuid>, FatalError> {
        let mut parents = Vec::new();
        for segment_id in span_equipment
            .utility_network_hops
            .iter()
            .flat_map(|hop| hop.parent_span_segment_ids.iter())
        {
            let parent = self
                .graph
                .element(*segment_id)
                .filter(GraphElement::is_segment)
                .and_then(|e| e.equipment_id())
                .ok_or(FatalError::GraphElementNotFound(*segment_id))?;
            if parent != span_equipment.id && !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        Ok(parents)
    }

    /// Bring the interest and affix lookups in line with the new record
    fn reindex_span_equipment(&self, id: Uuid, before: Option<&SpanEquipment>, after: Option<&SpanEquipment>) {
        let walk = |e: Option<&SpanEquipment>| e.map(|e| e.walk_of_interest_id);
        if walk(before) != walk(after) {
            if let Some(old) = walk(before) {
                self.interests
                    .remove_if(&old, |_, r| *r == EquipmentRef::SpanEquipment(id));
            }
            if let Some(new) = walk(after) {
                self.interests.insert(new, EquipmentRef::SpanEquipment(id));
            }
        }

        let containers = |e: Option<&SpanEquipment>| -> HashSet<Uuid> {
            e.map(|e| e.node_container_affixes.iter().map(|a| a.node_container_id).collect())
                .unwrap_or_default()
        };
        let (old, new) = (containers(before), containers(after));
        for container_id in old.difference(&new) {
            if let Some(mut affixed) = self.affixed.get_mut(container_id) {
                affixed.retain(|s| *s != id);
            }
            self.affixed.remove_if(container_id, |_, a| a.is_empty());
        }
        for container_id in new.difference(&old) {
            push_unique(&self.affixed, *container_id, id);
        }
    }

    /// Children of an absorbed equipment now run through the survivor
    fn transfer_children(&self, absorbed: Uuid, survivor: Uuid) {
        if let Some((_, moved)) = self.children.remove(&absorbed) {
            for child in moved {
                push_unique(&self.children, survivor, child);
            }
        }
        for mut entry in self.children.iter_mut() {
            if entry.contains(&absorbed) {
                entry.retain(|c| *c != absorbed);
                if !entry.contains(&survivor) {
                    entry.push(survivor);
                }
            }
        }
    }

    fn forget_child(&self, id: Uuid) {
        self.children.remove(&id);
        for mut entry in self.children.iter_mut() {
            entry.retain(|c| *c != id);
        }
        self.children.retain(|_, c| !c.is_empty());
    }

    /// Copy every record, version and graph element into ordered maps
    pub fn snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            span_equipment: self
                .span_equipment
                .values()
                .into_iter()
                .map(|e| (e.id, (*e).clone()))
                .collect(),
            terminal_equipment: self
                .terminal_equipment
                .values()
                .into_iter()
                .map(|e| (e.id, (*e).clone()))
                .collect(),
            node_containers: self
                .node_containers
                .values()
                .into_iter()
                .map(|e| (e.id, (*e).clone()))
                .collect(),
            versions: self.versions.iter().map(|v| (*v.key(), *v.value())).collect(),
            graph_elements: self.graph.elements().into_iter().map(|e| (e.id(), e)).collect(),
        }
    }
}

fn push_unique(map: &DashMap<Uuid, Vec<Uuid>>, key: Uuid, value: Uuid) {
    let mut entry = map.entry(key).or_default();
    if !entry.contains(&value) {
        entry.push(value);
    }
}

#[async_trait]
impl ProjectionAdapter for UtilityNetworkProjection {
    type Event = StoredEvent<UtilityNetworkEvent>;
    type Error = FatalError;

    async fn project(&self, event: Self::Event) -> Result<(), Self::Error> {
        self.apply_stored(&event)
    }

    fn name(&self) -> &str {
        "utility-network-projection"
    }
}
