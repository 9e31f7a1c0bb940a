// Copyright (c) 2025 - Cowboy AI, Inc.
//! TerminalEquipment Aggregate
//!
//! Splice closures, splitters and line cards. Placement materializes the
//! terminal structures from the specification; property updates are split
//! into one event per changed property.

use std::sync::Arc;
use uuid::Uuid;

use super::commands::*;
use super::errors::*;
use super::manufacturer_allowed;
use crate::domain::{
    build_terminal_structures, AddressInfo, LifecycleInfo, NamingInfo, SpecificationCatalog,
    TerminalEquipment,
};
use crate::errors::{CommandError, FatalError};
use crate::events::*;
use crate::graph::UtilityGraph;

/// Terminal equipment state reconstructed from its events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalEquipmentState {
    pub id: Uuid,
    pub terminal_equipment: Option<Arc<TerminalEquipment>>,
    pub version: u64,
}

impl TerminalEquipmentState {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            terminal_equipment: None,
            version: 0,
        }
    }

    pub fn from_events(id: Uuid, events: &[TerminalEquipmentEvent]) -> Self {
        events.iter().fold(Self::new(id), apply_event)
    }

    pub fn exists(&self) -> bool {
        self.version > 0
    }
}

/// Next terminal equipment record after an event
pub fn evolve(
    current: Option<&TerminalEquipment>,
    event: &TerminalEquipmentEvent,
) -> Option<TerminalEquipment> {
    use TerminalEquipmentEvent::*;

    if let TerminalEquipmentPlaced(e) = event {
        return Some(e.terminal_equipment.clone());
    }
    let current = current?;

    match event {
        TerminalEquipmentPlaced(_) => None,
        TerminalEquipmentNamingInfoChanged(e) => Some(TerminalEquipment {
            naming: e.naming.clone(),
            ..current.clone()
        }),
        TerminalEquipmentAddressInfoChanged(e) => Some(TerminalEquipment {
            address: e.address.clone(),
            ..current.clone()
        }),
        TerminalEquipmentLifecycleInfoChanged(e) => Some(TerminalEquipment {
            lifecycle: e.lifecycle.clone(),
            ..current.clone()
        }),
        TerminalEquipmentManufacturerChanged(e) => Some(TerminalEquipment {
            manufacturer_id: e.manufacturer_id,
            ..current.clone()
        }),
        TerminalEquipmentSpecificationChanged(e) => Some(TerminalEquipment {
            specification_id: e.specification_id,
            is_customer_termination: e.is_customer_termination,
            terminal_structures: e.terminal_structures.clone(),
            ..current.clone()
        }),
        TerminalEquipmentRemoved(_) => None,
    }
}

/// Apply event to state (pure function)
pub fn apply_event(state: TerminalEquipmentState, event: &TerminalEquipmentEvent) -> TerminalEquipmentState {
    TerminalEquipmentState {
        id: state.id,
        terminal_equipment: evolve(state.terminal_equipment.as_deref(), event).map(Arc::new),
        version: state.version + 1,
    }
}

/// Handle PlaceTerminalEquipment
///
/// # Business Rules
/// - Terminal equipment and node container ids must be non-nil
/// - The id must never have been used
/// - Specification must exist; manufacturer must be one it allows
///
/// Rack mounting is validated and recorded by the node container.
pub fn handle_place_terminal_equipment(
    state: &TerminalEquipmentState,
    command: PlaceTerminalEquipmentCommand,
    catalog: &SpecificationCatalog,
) -> Result<TerminalEquipmentEvent, CommandError<PlaceTerminalEquipmentError>> {
    use PlaceTerminalEquipmentError::*;

    if command.terminal_equipment_id.is_nil() {
        return Err(InvalidTerminalEquipmentId.into());
    }
    if command.node_container_id.is_nil() {
        return Err(InvalidNodeContainerId.into());
    }
    if state.exists() {
        return Err(AlreadyExists(command.terminal_equipment_id).into());
    }

    let specification = catalog
        .terminal_equipment_specification(command.specification_id)
        .ok_or(UnknownSpecification(command.specification_id))?;

    manufacturer_allowed(&specification.manufacturer_refs, command.manufacturer_id)
        .map_err(ManufacturerNotAllowed)?;

    let terminal_structures = build_terminal_structures(&specification, catalog)?;

    Ok(TerminalEquipmentEvent::TerminalEquipmentPlaced(TerminalEquipmentPlaced {
        header: command.context.header(command.terminal_equipment_id),
        terminal_equipment: TerminalEquipment {
            id: command.terminal_equipment_id,
            specification_id: specification.id,
            node_container_id: command.node_container_id,
            naming: command.naming,
            manufacturer_id: command.manufacturer_id,
            lifecycle: command.lifecycle,
            address: command.address,
            is_customer_termination: specification.is_customer_termination,
            terminal_structures,
        },
    }))
}

pub fn handle_change_naming_info(
    equipment: &TerminalEquipment,
    naming: NamingInfo,
    context: &CommandContext,
) -> Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    if equipment.naming == naming {
        return Err(UpdateTerminalEquipmentPropertiesError::NamingInfoUnchanged.into());
    }
    Ok(TerminalEquipmentEvent::TerminalEquipmentNamingInfoChanged(
        TerminalEquipmentNamingInfoChanged {
            header: context.header(equipment.id),
            naming,
        },
    ))
}

pub fn handle_change_address_info(
    equipment: &TerminalEquipment,
    address: Option<AddressInfo>,
    context: &CommandContext,
) -> Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    if equipment.address == address {
        return Err(UpdateTerminalEquipmentPropertiesError::AddressInfoUnchanged.into());
    }
    Ok(TerminalEquipmentEvent::TerminalEquipmentAddressInfoChanged(
        TerminalEquipmentAddressInfoChanged {
            header: context.header(equipment.id),
            address,
        },
    ))
}

pub fn handle_change_lifecycle_info(
    equipment: &TerminalEquipment,
    lifecycle: LifecycleInfo,
    context: &CommandContext,
) -> Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    if equipment.lifecycle == lifecycle {
        return Err(UpdateTerminalEquipmentPropertiesError::LifecycleInfoUnchanged.into());
    }
    Ok(TerminalEquipmentEvent::TerminalEquipmentLifecycleInfoChanged(
        TerminalEquipmentLifecycleInfoChanged {
            header: context.header(equipment.id),
            lifecycle,
        },
    ))
}

/// Change manufacturer, checked against the given specification's allow list
pub fn handle_change_manufacturer(
    equipment: &TerminalEquipment,
    manufacturer_id: Option<Uuid>,
    manufacturer_refs: &[Uuid],
    context: &CommandContext,
) -> Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    use UpdateTerminalEquipmentPropertiesError::*;

    if equipment.manufacturer_id == manufacturer_id {
        return Err(ManufacturerUnchanged.into());
    }
    manufacturer_allowed(manufacturer_refs, manufacturer_id).map_err(ManufacturerNotAllowed)?;

    Ok(TerminalEquipmentEvent::TerminalEquipmentManufacturerChanged(
        TerminalEquipmentManufacturerChanged {
            header: context.header(equipment.id),
            manufacturer_id,
        },
    ))
}

/// Change specification and rebuild every terminal structure
///
/// Not allowed while any terminal carries a segment connection: the old
/// terminal ids would disappear from under the connection.
pub fn handle_change_specification(
    equipment: &TerminalEquipment,
    specification_id: Uuid,
    catalog: &SpecificationCatalog,
    graph: &UtilityGraph,
    context: &CommandContext,
) -> Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    use UpdateTerminalEquipmentPropertiesError::*;

    if equipment.specification_id == specification_id {
        return Err(SpecificationUnchanged.into());
    }
    let specification = catalog
        .terminal_equipment_specification(specification_id)
        .ok_or(UnknownSpecification(specification_id))?;
    if graph.has_connected_terminals(equipment) {
        return Err(TerminalsConnected.into());
    }

    Ok(TerminalEquipmentEvent::TerminalEquipmentSpecificationChanged(
        TerminalEquipmentSpecificationChanged {
            header: context.header(equipment.id),
            specification_id,
            is_customer_termination: specification.is_customer_termination,
            terminal_structures: build_terminal_structures(&specification, catalog)?,
        },
    ))
}

fn skip_unchanged(
    result: Result<TerminalEquipmentEvent, CommandError<UpdateTerminalEquipmentPropertiesError>>,
    events: &mut Vec<TerminalEquipmentEvent>,
) -> Result<(), CommandError<UpdateTerminalEquipmentPropertiesError>> {
    use UpdateTerminalEquipmentPropertiesError::*;

    match result {
        Ok(event) => {
            events.push(event);
            Ok(())
        }
        Err(CommandError::Rejected(
            NamingInfoUnchanged
            | AddressInfoUnchanged
            | LifecycleInfoUnchanged
            | ManufacturerUnchanged
            | SpecificationUnchanged,
        )) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Handle UpdateTerminalEquipmentProperties
///
/// Produces one event per property that actually changes. Specification goes
/// first so a new manufacturer is checked against the new specification.
pub fn handle_update_properties(
    equipment: &TerminalEquipment,
    command: UpdateTerminalEquipmentPropertiesCommand,
    catalog: &SpecificationCatalog,
    graph: &UtilityGraph,
) -> Result<Vec<TerminalEquipmentEvent>, CommandError<UpdateTerminalEquipmentPropertiesError>> {
    let context = command.context;
    let mut events = Vec::new();

    if let Some(specification_id) = command.specification_id {
        skip_unchanged(
            handle_change_specification(equipment, specification_id, catalog, graph, &context),
            &mut events,
        )?;
    }

    if let Some(manufacturer_id) = command.manufacturer_id {
        let target = command.specification_id.unwrap_or(equipment.specification_id);
        let specification = catalog
            .terminal_equipment_specification(target)
            .ok_or(FatalError::SpecificationMissing(target))?;
        skip_unchanged(
            handle_change_manufacturer(
                equipment,
                manufacturer_id,
                &specification.manufacturer_refs,
                &context,
            ),
            &mut events,
        )?;
    }

    if let Some(naming) = command.naming {
        skip_unchanged(handle_change_naming_info(equipment, naming, &context), &mut events)?;
    }
    if let Some(address) = command.address {
        skip_unchanged(handle_change_address_info(equipment, address, &context), &mut events)?;
    }
    if let Some(lifecycle) = command.lifecycle {
        skip_unchanged(handle_change_lifecycle_info(equipment, lifecycle, &context), &mut events)?;
    }

    if events.is_empty() {
        return Err(UpdateTerminalEquipmentPropertiesError::NoChange.into());
    }
    Ok(events)
}

/// Handle RemoveTerminalEquipment
pub fn handle_remove_terminal_equipment(
    equipment: &TerminalEquipment,
    command: RemoveTerminalEquipmentCommand,
    graph: &UtilityGraph,
) -> Result<TerminalEquipmentEvent, CommandError<RemoveTerminalEquipmentError>> {
    if graph.has_connected_terminals(equipment) {
        return Err(RemoveTerminalEquipmentError::TerminalsConnected.into());
    }

    Ok(TerminalEquipmentEvent::TerminalEquipmentRemoved(TerminalEquipmentRemoved {
        header: command.context.header(equipment.id),
    }))
}
