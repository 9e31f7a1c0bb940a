// Copyright (c) 2025 - Cowboy AI, Inc.
//! Descriptive value objects shared by equipment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name and free-text description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingInfo {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NamingInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }
}

/// Printed marking on a conduit or cable jacket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingInfo {
    pub marking_text: Option<String>,
    pub marking_color: Option<String>,
}

/// Deployment state of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentState {
    InService,
    OutOfService,
    Planned,
}

/// Lifecycle information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleInfo {
    pub deployment_state: Option<DeploymentState>,
    pub installation_date: Option<DateTime<Utc>>,
    pub removal_date: Option<DateTime<Utc>>,
}

/// Address references, resolved to display text by the address collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub access_address_id: Option<Uuid>,
    pub unit_address_id: Option<Uuid>,
    pub remark: Option<String>,
}

impl AddressInfo {
    /// Most specific address id available
    pub fn primary_address_id(&self) -> Option<Uuid> {
        self.unit_address_id.or(self.access_address_id)
    }
}
