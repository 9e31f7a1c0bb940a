// Copyright (c) 2025 - Cowboy AI, Inc.
//! Terminal Equipment Domain Events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventHeader;
use crate::domain::{AddressInfo, LifecycleInfo, NamingInfo, TerminalEquipment, TerminalStructure};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalEquipmentEvent {
    TerminalEquipmentPlaced(TerminalEquipmentPlaced),
    TerminalEquipmentNamingInfoChanged(TerminalEquipmentNamingInfoChanged),
    TerminalEquipmentAddressInfoChanged(TerminalEquipmentAddressInfoChanged),
    TerminalEquipmentLifecycleInfoChanged(TerminalEquipmentLifecycleInfoChanged),
    TerminalEquipmentManufacturerChanged(TerminalEquipmentManufacturerChanged),
    /// Structures are rebuilt from the new specification
    TerminalEquipmentSpecificationChanged(TerminalEquipmentSpecificationChanged),
    TerminalEquipmentRemoved(TerminalEquipmentRemoved),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentPlaced {
    pub header: EventHeader,
    pub terminal_equipment: TerminalEquipment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentNamingInfoChanged {
    pub header: EventHeader,
    pub naming: NamingInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentAddressInfoChanged {
    pub header: EventHeader,
    pub address: Option<AddressInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentLifecycleInfoChanged {
    pub header: EventHeader,
    pub lifecycle: LifecycleInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentManufacturerChanged {
    pub header: EventHeader,
    pub manufacturer_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentSpecificationChanged {
    pub header: EventHeader,
    pub specification_id: Uuid,
    pub is_customer_termination: bool,
    pub terminal_structures: Vec<TerminalStructure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipmentRemoved {
    pub header: EventHeader,
}

impl TerminalEquipmentEvent {
    pub fn header(&self) -> &EventHeader {
        use TerminalEquipmentEvent::*;
        match self {
            TerminalEquipmentPlaced(e) => &e.header,
            TerminalEquipmentNamingInfoChanged(e) => &e.header,
            TerminalEquipmentAddressInfoChanged(e) => &e.header,
            TerminalEquipmentLifecycleInfoChanged(e) => &e.header,
            TerminalEquipmentManufacturerChanged(e) => &e.header,
            TerminalEquipmentSpecificationChanged(e) => &e.header,
            TerminalEquipmentRemoved(e) => &e.header,
        }
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.header().aggregate_id
    }

    pub fn event_type_name(&self) -> &'static str {
        use TerminalEquipmentEvent::*;
        match self {
            TerminalEquipmentPlaced(_) => "TerminalEquipmentPlaced",
            TerminalEquipmentNamingInfoChanged(_) => "TerminalEquipmentNamingInfoChanged",
            TerminalEquipmentAddressInfoChanged(_) => "TerminalEquipmentAddressInfoChanged",
            TerminalEquipmentLifecycleInfoChanged(_) => "TerminalEquipmentLifecycleInfoChanged",
            TerminalEquipmentManufacturerChanged(_) => "TerminalEquipmentManufacturerChanged",
            TerminalEquipmentSpecificationChanged(_) => "TerminalEquipmentSpecificationChanged",
            TerminalEquipmentRemoved(_) => "TerminalEquipmentRemoved",
        }
    }
}
