// Copyright (c) 2025 - Cowboy AI, Inc.
//! Span Equipment Structural Model
//!
//! A span equipment (conduit or cable) follows a walk through the route network.
//! The route nodes it cares about are its *nodes of interest*; segments refer to
//! them by index. Only the two ends are nodes of interest at placement, cuts add
//! more.
//!
//! All transformations here return a new value and leave `self` untouched, so a
//! record shared through an `Arc` is never modified under a reader.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::info::{MarkingInfo, NamingInfo};
use super::specification::SpanStructureTemplate;

/// Logical side of a node container a span equipment end enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeContainerSide {
    North,
    East,
    South,
    West,
}

/// Binding of a span equipment end to a node container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipmentNodeContainerAffix {
    pub node_container_id: Uuid,
    pub node_of_interest_index: u16,
    pub side: NodeContainerSide,
}

/// Part of a cable route running inside parent conduit segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityNetworkHop {
    pub from_node_id: Uuid,
    pub to_node_id: Uuid,
    pub parent_span_segment_ids: Vec<Uuid>,
}

/// Which way signal flows between a terminal and a segment
///
/// `Out` means out of the terminal into the segment: the terminal becomes the
/// segment's from-terminal. `In` means the segment flows into the terminal: it
/// becomes the to-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionDirection {
    In,
    Out,
}

/// End of a span segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentEnd {
    From,
    To,
}

impl From<ConnectionDirection> for SegmentEnd {
    fn from(direction: ConnectionDirection) -> Self {
        match direction {
            ConnectionDirection::Out => SegmentEnd::From,
            ConnectionDirection::In => SegmentEnd::To,
        }
    }
}

/// Piece of a span structure between two nodes of interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegment {
    pub id: Uuid,
    pub from_node_of_interest_index: u16,
    pub to_node_of_interest_index: u16,
    pub from_terminal_id: Option<Uuid>,
    pub to_terminal_id: Option<Uuid>,
}

impl SpanSegment {
    pub fn new(id: Uuid, from: u16, to: u16) -> Self {
        Self {
            id,
            from_node_of_interest_index: from,
            to_node_of_interest_index: to,
            from_terminal_id: None,
            to_terminal_id: None,
        }
    }

    /// Connected at either end
    pub fn is_connected(&self) -> bool {
        self.from_terminal_id.is_some() || self.to_terminal_id.is_some()
    }

    pub fn terminal_at(&self, end: SegmentEnd) -> Option<Uuid> {
        match end {
            SegmentEnd::From => self.from_terminal_id,
            SegmentEnd::To => self.to_terminal_id,
        }
    }

    pub fn index_at(&self, end: SegmentEnd) -> u16 {
        match end {
            SegmentEnd::From => self.from_node_of_interest_index,
            SegmentEnd::To => self.to_node_of_interest_index,
        }
    }

    /// Same segment walked the other way
    pub fn reversed(&self) -> Self {
        Self {
            id: self.id,
            from_node_of_interest_index: self.to_node_of_interest_index,
            to_node_of_interest_index: self.from_node_of_interest_index,
            from_terminal_id: self.to_terminal_id,
            to_terminal_id: self.from_terminal_id,
        }
    }
}

/// Outer conduit, inner conduit, tube or fiber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStructure {
    pub id: Uuid,
    pub specification_id: Uuid,
    pub level: u8,
    pub position: u16,
    pub parent_position: u16,
    pub deleted: bool,
    pub span_segments: Vec<SpanSegment>,
}

/// Replacement of one segment by two at a cut point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentCut {
    pub old_span_segment_id: Uuid,
    pub new_span_segment_id_1: Uuid,
    pub new_span_segment_id_2: Uuid,
}

/// Connection of one segment end to a terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentToTerminalConnect {
    pub span_segment_id: Uuid,
    pub terminal_id: Uuid,
    pub direction: ConnectionDirection,
}

/// Removal of a segment to terminal connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSegmentToTerminalDisconnect {
    pub span_segment_id: Uuid,
    pub terminal_id: Uuid,
}

/// Span equipment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEquipment {
    pub id: Uuid,
    pub specification_id: Uuid,
    pub walk_of_interest_id: Uuid,
    pub node_of_interest_ids: Vec<Uuid>,
    pub span_structures: Vec<SpanStructure>,
    pub naming: NamingInfo,
    pub marking: Option<MarkingInfo>,
    pub manufacturer_id: Option<Uuid>,
    pub is_cable: bool,
    pub node_container_affixes: Vec<SpanEquipmentNodeContainerAffix>,
    pub utility_network_hops: Vec<UtilityNetworkHop>,
}

impl SpanEquipment {
    /// Index of the node of interest at the A end
    pub fn a_end_index(&self) -> u16 {
        self.span_structures
            .first()
            .and_then(|s| s.span_segments.first())
            .map(|s| s.from_node_of_interest_index)
            .unwrap_or(0)
    }

    /// Index of the node of interest at the Z end
    pub fn z_end_index(&self) -> u16 {
        self.span_structures
            .first()
            .and_then(|s| s.span_segments.last())
            .map(|s| s.to_node_of_interest_index)
            .unwrap_or(0)
    }

    pub fn a_end_node_id(&self) -> Option<Uuid> {
        self.node_id_at(self.a_end_index())
    }

    pub fn z_end_node_id(&self) -> Option<Uuid> {
        self.node_id_at(self.z_end_index())
    }

    pub fn node_id_at(&self, index: u16) -> Option<Uuid> {
        self.node_of_interest_ids.get(index as usize).copied()
    }

    pub fn node_index_of(&self, route_node_id: Uuid) -> Option<u16> {
        self.node_of_interest_ids
            .iter()
            .position(|id| *id == route_node_id)
            .map(|i| i as u16)
    }

    /// Whether the route node is one of the two ends
    pub fn is_end(&self, route_node_id: Uuid) -> bool {
        self.a_end_node_id() == Some(route_node_id) || self.z_end_node_id() == Some(route_node_id)
    }

    /// Locate a segment by id, returning structure and segment indices
    pub fn segment(&self, span_segment_id: Uuid) -> Option<(usize, usize, &SpanSegment)> {
        self.span_structures
            .iter()
            .enumerate()
            .find_map(|(si, structure)| {
                structure
                    .span_segments
                    .iter()
                    .position(|s| s.id == span_segment_id)
                    .map(|gi| (si, gi, &structure.span_segments[gi]))
            })
    }

    pub fn structure(&self, span_structure_id: Uuid) -> Option<(usize, &SpanStructure)> {
        self.span_structures
            .iter()
            .enumerate()
            .find(|(_, s)| s.id == span_structure_id)
    }

    /// Every segment with its structure and segment index
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize, &SpanSegment)> {
        self.span_structures
            .iter()
            .enumerate()
            .flat_map(|(si, structure)| {
                structure
                    .span_segments
                    .iter()
                    .enumerate()
                    .map(move |(gi, segment)| (si, gi, segment))
            })
    }

    /// Any segment connected to a terminal
    pub fn has_connections(&self) -> bool {
        self.segments().any(|(_, _, s)| s.is_connected())
    }

    /// Segments with a terminal connection at the given node of interest
    pub fn connections_at(&self, node_of_interest_index: u16) -> Vec<&SpanSegment> {
        self.segments()
            .filter(|(_, _, s)| {
                (s.from_node_of_interest_index == node_of_interest_index && s.from_terminal_id.is_some())
                    || (s.to_node_of_interest_index == node_of_interest_index
                        && s.to_terminal_id.is_some())
            })
            .map(|(_, _, s)| s)
            .collect()
    }

    /// Whether any intermediate node of interest splits a segment there
    pub fn is_cut_at(&self, node_of_interest_index: u16) -> bool {
        self.segments()
            .any(|(_, _, s)| s.from_node_of_interest_index == node_of_interest_index)
            && self
                .segments()
                .any(|(_, _, s)| s.to_node_of_interest_index == node_of_interest_index)
    }

    pub fn affix_at(&self, node_of_interest_index: u16) -> Option<&SpanEquipmentNodeContainerAffix> {
        self.node_container_affixes
            .iter()
            .find(|a| a.node_of_interest_index == node_of_interest_index)
    }

    /// Copy with a cut applied
    ///
    /// When `is_new_node_of_interest` the node is inserted at `index` and every
    /// existing reference at or after `index` moves up by one. Each cut then
    /// replaces its old segment with two segments meeting at `index`; the outer
    /// terminal connections are kept on the outer ends.
    pub fn with_cut(
        &self,
        node_of_interest_id: Uuid,
        index: u16,
        is_new_node_of_interest: bool,
        cuts: &[SpanSegmentCut],
    ) -> SpanEquipment {
        let mut next = self.clone();

        if is_new_node_of_interest {
            next.node_of_interest_ids
                .insert(index as usize, node_of_interest_id);

            let shift = |i: &mut u16| {
                if *i >= index {
                    *i += 1;
                }
            };
            for structure in &mut next.span_structures {
                for segment in &mut structure.span_segments {
                    shift(&mut segment.from_node_of_interest_index);
                    shift(&mut segment.to_node_of_interest_index);
                }
            }
            for affix in &mut next.node_container_affixes {
                shift(&mut affix.node_of_interest_index);
            }
        }

        for cut in cuts {
            for structure in &mut next.span_structures {
                let Some(pos) = structure
                    .span_segments
                    .iter()
                    .position(|s| s.id == cut.old_span_segment_id)
                else {
                    continue;
                };

                let old = structure.span_segments[pos].clone();
                let first = SpanSegment {
                    id: cut.new_span_segment_id_1,
                    from_node_of_interest_index: old.from_node_of_interest_index,
                    to_node_of_interest_index: index,
                    from_terminal_id: old.from_terminal_id,
                    to_terminal_id: None,
                };
                let second = SpanSegment {
                    id: cut.new_span_segment_id_2,
                    from_node_of_interest_index: index,
                    to_node_of_interest_index: old.to_node_of_interest_index,
                    from_terminal_id: None,
                    to_terminal_id: old.to_terminal_id,
                };
                structure.span_segments.splice(pos..=pos, [first, second]);
            }
        }

        next
    }

    /// Copy with terminal connections recorded
    pub fn with_connects(&self, connects: &[SpanSegmentToTerminalConnect]) -> SpanEquipment {
        let mut next = self.clone();
        for connect in connects {
            for structure in &mut next.span_structures {
                for segment in &mut structure.span_segments {
                    if segment.id != connect.span_segment_id {
                        continue;
                    }
                    match SegmentEnd::from(connect.direction) {
                        SegmentEnd::From => segment.from_terminal_id = Some(connect.terminal_id),
                        SegmentEnd::To => segment.to_terminal_id = Some(connect.terminal_id),
                    }
                }
            }
        }
        next
    }

    /// Copy with terminal connections cleared
    pub fn with_disconnects(&self, disconnects: &[SpanSegmentToTerminalDisconnect]) -> SpanEquipment {
        let mut next = self.clone();
        for disconnect in disconnects {
            for structure in &mut next.span_structures {
                for segment in &mut structure.span_segments {
                    if segment.id != disconnect.span_segment_id {
                        continue;
                    }
                    if segment.from_terminal_id == Some(disconnect.terminal_id) {
                        segment.from_terminal_id = None;
                    }
                    if segment.to_terminal_id == Some(disconnect.terminal_id) {
                        segment.to_terminal_id = None;
                    }
                }
            }
        }
        next
    }

    pub fn with_affix(&self, affix: SpanEquipmentNodeContainerAffix) -> SpanEquipment {
        let mut next = self.clone();
        next.node_container_affixes.push(affix);
        next
    }

    pub fn without_affix(&self, node_container_id: Uuid) -> SpanEquipment {
        let mut next = self.clone();
        next.node_container_affixes
            .retain(|a| a.node_container_id != node_container_id);
        next
    }

    pub fn with_structure_deleted(&self, span_structure_id: Uuid) -> SpanEquipment {
        let mut next = self.clone();
        for structure in &mut next.span_structures {
            if structure.id == span_structure_id {
                structure.deleted = true;
            }
        }
        next
    }

    /// Copy following a new walk; the two ends are replaced, indices stay put
    pub fn with_walk(&self, walk_of_interest_id: Uuid, a_end_node_id: Uuid, z_end_node_id: Uuid) -> SpanEquipment {
        let mut next = self.clone();
        next.walk_of_interest_id = walk_of_interest_id;
        let (a, z) = (self.a_end_index() as usize, self.z_end_index() as usize);
        if let Some(slot) = next.node_of_interest_ids.get_mut(a) {
            *slot = a_end_node_id;
        }
        if let Some(slot) = next.node_of_interest_ids.get_mut(z) {
            *slot = z_end_node_id;
        }
        next
    }
}

/// Build the structure tree of a new span equipment
///
/// Depth first, root first. Every structure gets one segment spanning the
/// full range `0..last_index`.
pub fn build_span_structures(root: &SpanStructureTemplate, last_index: u16) -> Vec<SpanStructure> {
    fn visit(
        template: &SpanStructureTemplate,
        parent_position: u16,
        last_index: u16,
        out: &mut Vec<SpanStructure>,
    ) {
        out.push(SpanStructure {
            id: Uuid::now_v7(),
            specification_id: template.span_structure_specification_id,
            level: template.level,
            position: template.position,
            parent_position,
            deleted: false,
            span_segments: vec![SpanSegment::new(Uuid::now_v7(), 0, last_index)],
        });
        for child in &template.child_templates {
            visit(child, template.position, last_index, out);
        }
    }

    let mut out = Vec::with_capacity(root.count());
    visit(root, 0, last_index, &mut out);
    out
}

/// Result of joining two span equipments at a shared end node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSpanEquipment {
    pub node_of_interest_ids: Vec<Uuid>,
    pub span_structures: Vec<SpanStructure>,
    pub node_container_affixes: Vec<SpanEquipmentNodeContainerAffix>,
}

fn oriented(segments: &[SpanSegment], reverse: bool) -> Vec<SpanSegment> {
    if reverse {
        segments.iter().rev().map(SpanSegment::reversed).collect()
    } else {
        segments.to_vec()
    }
}

/// Join `other` onto `this` at `merge_node_id`
///
/// `this` is oriented so the merge node is its Z end and `other` so it is its
/// A end. Node lists are concatenated with the merge node kept once; for every
/// structure the last segment of `this` and the first of `other` fuse into one
/// segment keeping the id from `this`. Returns `None` when the structures
/// differ in count or the merge node is not an end of both.
pub fn merge_span_equipment(
    this: &SpanEquipment,
    other: &SpanEquipment,
    merge_node_id: Uuid,
) -> Option<MergedSpanEquipment> {
    if this.span_structures.len() != other.span_structures.len()
        || !this.is_end(merge_node_id)
        || !other.is_end(merge_node_id)
    {
        return None;
    }

    let reverse_this = this.a_end_node_id() == Some(merge_node_id);
    let reverse_other = other.z_end_node_id() == Some(merge_node_id);

    let mut node_of_interest_ids = this.node_of_interest_ids.clone();
    let merge_index = this.node_index_of(merge_node_id)?;

    let mut remap: HashMap<u16, u16> = HashMap::new();
    for (i, node_id) in other.node_of_interest_ids.iter().enumerate() {
        let target = if *node_id == merge_node_id {
            merge_index
        } else {
            node_of_interest_ids.push(*node_id);
            (node_of_interest_ids.len() - 1) as u16
        };
        remap.insert(i as u16, target);
    }
    let map = |i: u16| remap.get(&i).copied().unwrap_or(i);

    let mut span_structures = Vec::with_capacity(this.span_structures.len());
    for (mine, theirs) in this.span_structures.iter().zip(&other.span_structures) {
        let mut left = oriented(&mine.span_segments, reverse_this);
        let right: Vec<SpanSegment> = oriented(&theirs.span_segments, reverse_other)
            .into_iter()
            .map(|s| SpanSegment {
                from_node_of_interest_index: map(s.from_node_of_interest_index),
                to_node_of_interest_index: map(s.to_node_of_interest_index),
                ..s
            })
            .collect();

        let (Some(last), Some(first)) = (left.pop(), right.first()) else {
            return None;
        };
        left.push(SpanSegment {
            id: last.id,
            from_node_of_interest_index: last.from_node_of_interest_index,
            to_node_of_interest_index: first.to_node_of_interest_index,
            from_terminal_id: last.from_terminal_id,
            to_terminal_id: first.to_terminal_id,
        });
        left.extend(right.into_iter().skip(1));

        span_structures.push(SpanStructure {
            deleted: mine.deleted || theirs.deleted,
            span_segments: left,
            ..mine.clone()
        });
    }

    let mut node_container_affixes = this.node_container_affixes.clone();
    node_container_affixes.extend(other.node_container_affixes.iter().map(|a| {
        SpanEquipmentNodeContainerAffix {
            node_of_interest_index: map(a.node_of_interest_index),
            ..a.clone()
        }
    }));

    Some(MergedSpanEquipment {
        node_of_interest_ids,
        span_structures,
        node_container_affixes,
    })
}
