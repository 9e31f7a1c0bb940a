// Copyright (c) 2025 - Cowboy AI, Inc.
//! Node Container Model
//!
//! A node container (cabinet, manhole, building) sits at one route node and
//! holds terminal equipment, either loose or mounted in racks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order in which rack content is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalContentAlignment {
    Bottom,
    Top,
}

impl VerticalContentAlignment {
    pub fn reversed(self) -> Self {
        match self {
            VerticalContentAlignment::Bottom => VerticalContentAlignment::Top,
            VerticalContentAlignment::Top => VerticalContentAlignment::Bottom,
        }
    }
}

/// Terminal equipment occupying rack units `position..position + height_in_units`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubrackMount {
    pub terminal_equipment_id: Uuid,
    pub position: u16,
    pub height_in_units: u16,
}

impl SubrackMount {
    /// First unit above the mount; `None` past the last addressable unit
    pub fn end(&self) -> Option<u16> {
        self.position.checked_add(self.height_in_units)
    }

    /// A range that cannot be addressed overlaps everything
    fn overlaps(&self, start: u16, height: u16) -> bool {
        match (self.end(), start.checked_add(height)) {
            (Some(end), Some(stop)) => start < end && self.position < stop,
            _ => true,
        }
    }
}

/// Where in which rack a terminal equipment goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackPlacement {
    pub rack_id: Uuid,
    pub position: u16,
    pub height_in_units: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: Uuid,
    pub name: String,
    pub position: u16,
    pub specification_id: Uuid,
    pub height_in_units: u16,
    pub subrack_mounts: Vec<SubrackMount>,
}

impl Rack {
    pub fn mount(&self, terminal_equipment_id: Uuid) -> Option<&SubrackMount> {
        self.subrack_mounts
            .iter()
            .find(|m| m.terminal_equipment_id == terminal_equipment_id)
    }

    /// Whether `start..start + height` is free, ignoring one occupant
    pub fn is_free(&self, start: u16, height: u16, ignoring: Option<Uuid>) -> bool {
        self.fits(start, height)
            && self
                .subrack_mounts
                .iter()
                .filter(|m| Some(m.terminal_equipment_id) != ignoring)
                .all(|m| !m.overlaps(start, height))
    }

    /// Whether `start..start + height` lies inside the rack
    pub fn fits(&self, start: u16, height: u16) -> bool {
        start
            .checked_add(height)
            .map_or(false, |stop| stop <= self.height_in_units)
    }

    /// Move a requested start position clear of every occupant
    ///
    /// A start inside an occupant moves to that occupant's end; a start below
    /// an occupant that still overlaps moves down to just below it. Returns
    /// `None` when no position within the rack fits.
    pub fn snap_position(&self, start: u16, height: u16, ignoring: Option<Uuid>) -> Option<u16> {
        start.checked_add(height)?;
        let occupants: Vec<&SubrackMount> = self
            .subrack_mounts
            .iter()
            .filter(|m| Some(m.terminal_equipment_id) != ignoring)
            .collect();

        let mut position = start;
        for _ in 0..=occupants.len() * 2 {
            let Some(blocker) = occupants.iter().find(|m| m.overlaps(position, height)) else {
                return self.fits(position, height).then_some(position);
            };
            position = if position >= blocker.position {
                blocker.end()?
            } else {
                blocker.position.checked_sub(height)?
            };
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContainer {
    pub id: Uuid,
    pub specification_id: Uuid,
    pub route_node_id: Uuid,
    pub interest_id: Uuid,
    pub manufacturer_id: Option<Uuid>,
    pub vertical_content_alignment: VerticalContentAlignment,
    pub racks: Vec<Rack>,
    /// Terminal equipment placed outside any rack
    pub terminal_equipment_reference_ids: Vec<Uuid>,
}

impl NodeContainer {
    pub fn rack(&self, rack_id: Uuid) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == rack_id)
    }

    /// Position the next rack gets when none is requested
    pub fn next_rack_position(&self) -> u16 {
        self.racks.iter().map(|r| r.position).max().map_or(1, |p| p.saturating_add(1))
    }

    /// Rack holding the given terminal equipment, if any
    pub fn rack_of(&self, terminal_equipment_id: Uuid) -> Option<&Rack> {
        self.racks
            .iter()
            .find(|r| r.mount(terminal_equipment_id).is_some())
    }

    /// Whether the container references the terminal equipment at all
    pub fn holds(&self, terminal_equipment_id: Uuid) -> bool {
        self.terminal_equipment_reference_ids
            .contains(&terminal_equipment_id)
            || self.rack_of(terminal_equipment_id).is_some()
    }

    /// Every referenced terminal equipment, loose first, then rack by rack
    pub fn terminal_equipment_ids(&self) -> Vec<Uuid> {
        let mut ids = self.terminal_equipment_reference_ids.clone();
        for rack in &self.racks {
            ids.extend(rack.subrack_mounts.iter().map(|m| m.terminal_equipment_id));
        }
        ids
    }

    pub fn with_rack(&self, rack: Rack) -> NodeContainer {
        let mut next = self.clone();
        next.racks.push(rack);
        next
    }

    pub fn with_alignment_reversed(&self) -> NodeContainer {
        NodeContainer {
            vertical_content_alignment: self.vertical_content_alignment.reversed(),
            ..self.clone()
        }
    }

    /// Copy with a loose reference or a rack mount added
    pub fn with_terminal_equipment(
        &self,
        terminal_equipment_id: Uuid,
        placement: Option<RackPlacement>,
    ) -> NodeContainer {
        let mut next = self.clone();
        match placement {
            Some(placement) => {
                if let Some(rack) = next.racks.iter_mut().find(|r| r.id == placement.rack_id) {
                    rack.subrack_mounts.push(SubrackMount {
                        terminal_equipment_id,
                        position: placement.position,
                        height_in_units: placement.height_in_units,
                    });
                    rack.subrack_mounts.sort_by_key(|m| m.position);
                }
            }
            None => next.terminal_equipment_reference_ids.push(terminal_equipment_id),
        }
        next
    }

    /// Copy with every reference to the terminal equipment dropped
    pub fn without_terminal_equipment(&self, terminal_equipment_id: Uuid) -> NodeContainer {
        let mut next = self.clone();
        next.terminal_equipment_reference_ids
            .retain(|id| *id != terminal_equipment_id);
        for rack in &mut next.racks {
            rack.subrack_mounts
                .retain(|m| m.terminal_equipment_id != terminal_equipment_id);
        }
        next
    }

    /// Copy with a rack mount relocated, possibly into another rack
    pub fn with_subrack_mount_moved(
        &self,
        terminal_equipment_id: Uuid,
        rack_id: Uuid,
        position: u16,
    ) -> NodeContainer {
        let height_in_units = self
            .rack_of(terminal_equipment_id)
            .and_then(|r| r.mount(terminal_equipment_id))
            .map_or(0, |m| m.height_in_units);
        self.without_terminal_equipment(terminal_equipment_id)
            .with_terminal_equipment(
                terminal_equipment_id,
                Some(RackPlacement {
                    rack_id,
                    position,
                    height_in_units,
                }),
            )
    }
}
