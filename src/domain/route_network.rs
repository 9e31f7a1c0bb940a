// Copyright (c) 2025 - Cowboy AI, Inc.
//! Route network and address collaborators
//!
//! Route network topology and address lookup are owned by other services. The
//! core only consumes them through these synchronous traits; command and query
//! handlers call them, the graph engine never does.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CollaboratorError;

/// Kind of route network interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterestKind {
    /// A walk along route nodes and route segments
    WalkOfInterest,
    /// A single route node
    NodeOfInterest,
}

/// Registered interest in a part of the route network
///
/// For a walk, `route_network_element_ids` alternates node, segment, node, ...
/// starting and ending with a route node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNetworkInterest {
    pub id: Uuid,
    pub kind: InterestKind,
    pub route_network_element_ids: Vec<Uuid>,
}

impl RouteNetworkInterest {
    /// Walk interest over alternating node/segment ids
    pub fn walk(id: Uuid, route_network_element_ids: Vec<Uuid>) -> Self {
        Self {
            id,
            kind: InterestKind::WalkOfInterest,
            route_network_element_ids,
        }
    }

    /// Node interest
    pub fn node(id: Uuid, route_node_id: Uuid) -> Self {
        Self {
            id,
            kind: InterestKind::NodeOfInterest,
            route_network_element_ids: vec![route_node_id],
        }
    }

    /// Route node ids in walk order
    pub fn node_ids(&self) -> Vec<Uuid> {
        match self.kind {
            InterestKind::NodeOfInterest => self.route_network_element_ids.clone(),
            InterestKind::WalkOfInterest => self
                .route_network_element_ids
                .iter()
                .step_by(2)
                .copied()
                .collect(),
        }
    }

    /// Route segment ids in walk order
    pub fn segment_ids(&self) -> Vec<Uuid> {
        match self.kind {
            InterestKind::NodeOfInterest => Vec::new(),
            InterestKind::WalkOfInterest => self
                .route_network_element_ids
                .iter()
                .skip(1)
                .step_by(2)
                .copied()
                .collect(),
        }
    }

    /// A walk is well formed when it alternates node/segment and covers at least one segment
    pub fn is_valid_walk(&self) -> bool {
        self.kind == InterestKind::WalkOfInterest
            && self.route_network_element_ids.len() >= 3
            && self.route_network_element_ids.len() % 2 == 1
    }

    /// Elements of this walk followed by `other`, joined at a shared end node
    ///
    /// Either walk is reversed as needed so that this one ends and `other`
    /// starts at `route_node_id`. `None` when it is not an end of both.
    pub fn joined_at(&self, other: &RouteNetworkInterest, route_node_id: Uuid) -> Option<Vec<Uuid>> {
        let mut left = self.route_network_element_ids.clone();
        let mut right = other.route_network_element_ids.clone();

        if left.first() == Some(&route_node_id) {
            left.reverse();
        }
        if right.last() == Some(&route_node_id) {
            right.reverse();
        }
        if left.last() != Some(&route_node_id) || right.first() != Some(&route_node_id) {
            return None;
        }

        left.extend(right.into_iter().skip(1));
        Some(left)
    }
}

/// Resolves route network interests and node names
pub trait RouteNetworkLookup: Send + Sync {
    /// Resolve an interest to its ordered route network elements
    fn interest(&self, interest_id: Uuid) -> Result<RouteNetworkInterest, CollaboratorError>;

    /// Display name of a route node, if it has one
    fn route_node_name(&self, route_node_id: Uuid) -> Result<Option<String>, CollaboratorError>;

    /// Register a walk interest over alternating node/segment ids
    fn register_walk_of_interest(
        &self,
        interest_id: Uuid,
        route_network_element_ids: Vec<Uuid>,
    ) -> Result<RouteNetworkInterest, CollaboratorError>;

    /// Release an interest that no longer has an owner
    fn unregister_interest(&self, interest_id: Uuid) -> Result<(), CollaboratorError>;
}

/// Resolves address ids to display strings
pub trait AddressLookup: Send + Sync {
    fn address_display(&self, address_id: Uuid) -> Result<Option<String>, CollaboratorError>;
}
