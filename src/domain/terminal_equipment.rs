// Copyright (c) 2025 - Cowboy AI, Inc.
//! Terminal Equipment Structural Model
//!
//! A terminal equipment (splice closure, splitter, line card) is a set of
//! terminal structures, each holding terminals. Terminals that share an
//! internal connectivity node are wired together inside the equipment; the
//! connectivity graph only materializes that wiring once one of them is
//! connected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::info::{AddressInfo, LifecycleInfo, NamingInfo};
use super::specification::{SpecificationCatalog, TerminalEquipmentSpecification};
use crate::errors::FatalError;

/// Signal direction of a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalDirection {
    /// Signal enters the equipment here
    Inbound,
    /// Signal leaves the equipment here
    Outbound,
    /// Either way; used by splice pins and patch ports
    Bidirectional,
}

/// One connection point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: Uuid,
    pub name: String,
    pub direction: TerminalDirection,
    pub internal_connectivity_node_id: Option<Uuid>,
}

/// A tray, card or splitter module holding terminals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStructure {
    pub id: Uuid,
    pub specification_id: Uuid,
    pub position: u16,
    pub deleted: bool,
    pub terminals: Vec<Terminal>,
}

/// Terminal equipment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEquipment {
    pub id: Uuid,
    pub specification_id: Uuid,
    pub node_container_id: Uuid,
    pub naming: NamingInfo,
    pub manufacturer_id: Option<Uuid>,
    pub lifecycle: LifecycleInfo,
    pub address: Option<AddressInfo>,
    pub is_customer_termination: bool,
    pub terminal_structures: Vec<TerminalStructure>,
}

impl TerminalEquipment {
    /// Locate a terminal by id, returning structure and terminal indices
    pub fn terminal(&self, terminal_id: Uuid) -> Option<(usize, usize, &Terminal)> {
        self.terminal_structures
            .iter()
            .enumerate()
            .find_map(|(structure_index, structure)| {
                structure
                    .terminals
                    .iter()
                    .position(|t| t.id == terminal_id)
                    .map(|terminal_index| {
                        (
                            structure_index,
                            terminal_index,
                            &structure.terminals[terminal_index],
                        )
                    })
            })
    }

    /// Every terminal with its structure and terminal index
    pub fn terminals(&self) -> impl Iterator<Item = (usize, usize, &Terminal)> {
        self.terminal_structures
            .iter()
            .enumerate()
            .flat_map(|(si, structure)| {
                structure
                    .terminals
                    .iter()
                    .enumerate()
                    .map(move |(ti, terminal)| (si, ti, terminal))
            })
    }

    /// Terminals wired to the given internal connectivity node
    pub fn terminals_sharing_node(
        &self,
        internal_connectivity_node_id: Uuid,
    ) -> Vec<(usize, usize, &Terminal)> {
        self.terminals()
            .filter(|(_, _, t)| t.internal_connectivity_node_id == Some(internal_connectivity_node_id))
            .collect()
    }

    /// Display name, falling back to the id
    pub fn display_name(&self) -> String {
        self.naming
            .name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Materialize terminal structures from a specification
///
/// One internal connectivity node id is allocated per distinct node name within
/// each structure. A directional terminal without an internal node means the
/// specification itself is broken, which is fatal.
pub fn build_terminal_structures(
    specification: &TerminalEquipmentSpecification,
    catalog: &SpecificationCatalog,
) -> Result<Vec<TerminalStructure>, FatalError> {
    let mut structures = Vec::with_capacity(specification.structure_templates.len());

    for template in &specification.structure_templates {
        let structure_spec = catalog
            .terminal_structure_specification(template.terminal_structure_specification_id)
            .ok_or(FatalError::SpecificationMissing(
                template.terminal_structure_specification_id,
            ))?;

        let mut node_ids: HashMap<&str, Uuid> = HashMap::new();
        let mut terminals = Vec::with_capacity(structure_spec.terminal_templates.len());

        for terminal_template in &structure_spec.terminal_templates {
            let internal_connectivity_node_id = terminal_template
                .internal_connectivity_node
                .as_deref()
                .map(|name| *node_ids.entry(name).or_insert_with(Uuid::now_v7));

            if terminal_template.direction != TerminalDirection::Bidirectional
                && internal_connectivity_node_id.is_none()
            {
                return Err(FatalError::SpecificationCorrupt {
                    id: structure_spec.id,
                    reason: format!(
                        "terminal '{}' is {:?} but has no internal connectivity node",
                        terminal_template.name, terminal_template.direction
                    ),
                });
            }

            terminals.push(Terminal {
                id: Uuid::now_v7(),
                name: terminal_template.name.clone(),
                direction: terminal_template.direction,
                internal_connectivity_node_id,
            });
        }

        structures.push(TerminalStructure {
            id: Uuid::now_v7(),
            specification_id: structure_spec.id,
            position: template.position,
            deleted: false,
            terminals,
        });
    }

    Ok(structures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::specification::{
        TerminalStructureSpecification, TerminalStructureTemplate, TerminalTemplate,
    };

    fn splitter_catalog(with_internal_node: bool) -> (SpecificationCatalog, TerminalEquipmentSpecification) {
        let catalog = SpecificationCatalog::new();
        let structure_id = Uuid::now_v7();

        let input = TerminalTemplate::new("in", TerminalDirection::Inbound);
        let input = if with_internal_node {
            input.with_internal_node("splitter")
        } else {
            input
        };

        catalog.add_terminal_structure_specification(TerminalStructureSpecification {
            id: structure_id,
            category: "Splitter".into(),
            name: "1:2 splitter".into(),
            short_name: "1:2".into(),
            terminal_templates: vec![
                input,
                TerminalTemplate::new("out-1", TerminalDirection::Outbound)
                    .with_internal_node("splitter"),
                TerminalTemplate::new("out-2", TerminalDirection::Outbound)
                    .with_internal_node("splitter"),
            ],
        });

        let spec = TerminalEquipmentSpecification {
            id: Uuid::now_v7(),
            category: "Splitter".into(),
            name: "Splitter shelf".into(),
            short_name: "SPL".into(),
            is_rack_equipment: false,
            height_in_rack_units: 0,
            is_customer_termination: false,
            structure_templates: vec![
                TerminalStructureTemplate {
                    terminal_structure_specification_id: structure_id,
                    position: 1,
                },
                TerminalStructureTemplate {
                    terminal_structure_specification_id: structure_id,
                    position: 2,
                },
            ],
            manufacturer_refs: vec![],
            deprecated: false,
        };

        (catalog, spec)
    }

    #[test]
    fn test_internal_node_allocated_per_structure() {
        let (catalog, spec) = splitter_catalog(true);

        let structures = build_terminal_structures(&spec, &catalog).unwrap();

        assert_eq!(structures.len(), 2);
        let first = structures[0].terminals[0].internal_connectivity_node_id.unwrap();
        let second = structures[1].terminals[0].internal_connectivity_node_id.unwrap();
        assert_ne!(first, second);
        assert!(structures[0]
            .terminals
            .iter()
            .all(|t| t.internal_connectivity_node_id == Some(first)));
    }

    #[test]
    fn test_directional_terminal_without_node_is_corrupt() {
        let (catalog, spec) = splitter_catalog(false);

        let result = build_terminal_structures(&spec, &catalog);

        assert!(matches!(result, Err(FatalError::SpecificationCorrupt { .. })));
    }

    #[test]
    fn test_missing_structure_specification_is_fatal() {
        let (_, spec) = splitter_catalog(true);

        let result = build_terminal_structures(&spec, &SpecificationCatalog::new());

        assert!(matches!(result, Err(FatalError::SpecificationMissing(_))));
    }
}
