// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rejection Codes
//!
//! One closed enum per operation. Handlers return them wrapped in
//! [`CommandError`]; callers match on the code, never on the message.

use thiserror::Error;
use uuid::Uuid;

use crate::errors::rejection_codes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceSpanEquipmentError {
    #[error("span equipment id must not be empty")]
    InvalidSpanEquipmentId,
    #[error("span equipment {0} already exists")]
    SpanEquipmentAlreadyExists(Uuid),
    #[error("interest {0} must be a walk of interest")]
    InterestMustBeWalkOfInterest(Uuid),
    #[error("walk of interest {0} is not a valid walk")]
    InvalidWalk(Uuid),
    #[error("unknown span equipment specification {0}")]
    UnknownSpecification(Uuid),
    #[error("manufacturer {0} is not allowed by the specification")]
    ManufacturerNotAllowed(Uuid),
    #[error("hop parent span segment {0} is unknown")]
    UnknownHopParentSegment(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutSpanSegmentsError {
    #[error("route node {0} is not on the span equipment's walk")]
    NodeNotOnWalk(Uuid),
    #[error("cannot cut at end node {0}")]
    CannotCutAtEnd(Uuid),
    #[error("span segment {0} not found")]
    SpanSegmentNotFound(Uuid),
    #[error("span segment {0} does not pass the cut node")]
    SpanSegmentDoesNotPassNode(Uuid),
    #[error("no span segments to cut")]
    NoSegmentsToCut,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectSpanSegmentsError {
    #[error("span segment {0} not found")]
    SpanSegmentNotFound(Uuid),
    #[error("span segment {0} does not end at the route node")]
    SpanSegmentNotEndingAtRouteNode(Uuid),
    #[error("span segment {0} is already connected at that end")]
    SpanSegmentEndAlreadyConnected(Uuid),
    #[error("terminal {0} not found")]
    TerminalNotFound(Uuid),
    #[error("nothing to connect")]
    NoConnects,
    #[error("segments must belong to exactly two span equipments")]
    ExpectedTwoSpanEquipment,
    #[error("both span equipments must contribute the same number of segments")]
    SegmentCountMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectSpanSegmentsError {
    #[error("span segment {0} not found")]
    SpanSegmentNotFound(Uuid),
    #[error("span segment {span_segment_id} is not connected to terminal {terminal_id}")]
    SpanSegmentNotConnectedToTerminal { span_segment_id: Uuid, terminal_id: Uuid },
    #[error("nothing to disconnect")]
    NoDisconnects,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffixSpanEquipmentError {
    #[error("route node {0} of the container is not a node of interest of the span equipment")]
    RouteNodeNotNodeOfInterest(Uuid),
    #[error("already affixed to node container {0}")]
    AlreadyAffixed(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetachSpanEquipmentError {
    #[error("not affixed to node container {0}")]
    NotAffixed(Uuid),
    #[error("segments are connected to terminals at the affix point")]
    TerminalConnectionsAtAffixPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeSpanEquipmentError {
    #[error("cannot merge a span equipment with itself")]
    SameSpanEquipment,
    #[error("span equipments have different specifications")]
    SpecificationMismatch,
    #[error("span equipment ends are not colocated at route node {0}")]
    EndsNotColocated(Uuid),
    #[error("an end at the merge point is affixed to node container {0}")]
    EndAffixedToNodeContainer(Uuid),
    #[error("segments are connected to terminals at the merge point")]
    SegmentsConnectedAtMergePoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveSpanEquipmentError {
    #[error("walk of interest {0} is not a valid walk")]
    InvalidWalk(Uuid),
    #[error("span equipment already follows walk {0}")]
    NoChange(Uuid),
    #[error("cut node {0} is not on the new walk")]
    CutNodeNotOnNewWalk(Uuid),
    #[error("cut nodes are out of order on the new walk")]
    CutNodesOutOfOrder,
    #[error("end at route node {0} has connected segments and cannot move")]
    ConnectedEndCannotMove(Uuid),
    #[error("end at route node {0} is affixed to a node container and cannot move")]
    AffixedEndCannotMove(Uuid),
    #[error("span equipment carries child span equipment")]
    HasChildSpanEquipment,
    #[error("span equipment is routed through a parent and moves with it")]
    IsRoutedThroughParent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveSpanStructureError {
    #[error("span structure {0} not found")]
    SpanStructureNotFound(Uuid),
    #[error("span structure {0} is already removed")]
    AlreadyRemoved(Uuid),
    #[error("span structure has segments connected to terminals")]
    SpanSegmentsConnected,
    #[error("span equipment carries child span equipment")]
    HasChildSpanEquipment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveSpanEquipmentError {
    #[error("span equipment has segments connected to terminals")]
    HasConnectedSegments,
    #[error("span equipment is affixed to node container {0}")]
    AffixedToNodeContainer(Uuid),
    #[error("span equipment carries child span equipment")]
    HasChildSpanEquipment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceTerminalEquipmentError {
    #[error("terminal equipment id must not be empty")]
    InvalidTerminalEquipmentId,
    #[error("node container id must not be empty")]
    InvalidNodeContainerId,
    #[error("terminal equipment {0} already exists")]
    AlreadyExists(Uuid),
    #[error("unknown terminal equipment specification {0}")]
    UnknownSpecification(Uuid),
    #[error("manufacturer {0} is not allowed by the specification")]
    ManufacturerNotAllowed(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateTerminalEquipmentPropertiesError {
    #[error("no property changed")]
    NoChange,
    #[error("naming info is unchanged")]
    NamingInfoUnchanged,
    #[error("address info is unchanged")]
    AddressInfoUnchanged,
    #[error("lifecycle info is unchanged")]
    LifecycleInfoUnchanged,
    #[error("manufacturer is unchanged")]
    ManufacturerUnchanged,
    #[error("specification is unchanged")]
    SpecificationUnchanged,
    #[error("unknown terminal equipment specification {0}")]
    UnknownSpecification(Uuid),
    #[error("manufacturer {0} is not allowed by the specification")]
    ManufacturerNotAllowed(Uuid),
    #[error("terminals are connected; specification cannot change")]
    TerminalsConnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveTerminalEquipmentError {
    #[error("terminals are connected")]
    TerminalsConnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceNodeContainerError {
    #[error("node container id must not be empty")]
    InvalidNodeContainerId,
    #[error("node container {0} already exists")]
    AlreadyExists(Uuid),
    #[error("interest {0} must be a node of interest")]
    InterestMustBeNodeOfInterest(Uuid),
    #[error("route node {0} already has a node container")]
    RouteNodeAlreadyHasContainer(Uuid),
    #[error("unknown node container specification {0}")]
    UnknownSpecification(Uuid),
    #[error("manufacturer {0} is not allowed by the specification")]
    ManufacturerNotAllowed(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceRackError {
    #[error("rack name must not be empty")]
    InvalidRackName,
    #[error("rack name '{0}' already exists in the container")]
    RackNameAlreadyExists(String),
    #[error("rack position {0} is already taken")]
    RackPositionAlreadyTaken(u16),
    #[error("unknown rack specification {0}")]
    UnknownRackSpecification(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddTerminalEquipmentReferenceError {
    #[error("terminal equipment {0} is already referenced")]
    AlreadyReferenced(Uuid),
    #[error("rack {0} not found")]
    RackNotFound(Uuid),
    #[error("terminal equipment is not rack equipment")]
    NotRackEquipment,
    #[error("rack units from {0} are occupied")]
    RackSpaceOccupied(u16),
    #[error("equipment does not fit in the rack height")]
    ExceedsRackHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeSubrackMountError {
    #[error("terminal equipment {0} is not mounted in a rack")]
    TerminalEquipmentNotInRack(Uuid),
    #[error("rack {0} not found")]
    RackNotFound(Uuid),
    #[error("no room in rack for the equipment")]
    NoRoomInRack,
    #[error("mount position is unchanged")]
    NoChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveTerminalEquipmentReferenceError {
    #[error("terminal equipment {0} is not referenced")]
    NotReferenced(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveNodeContainerError {
    #[error("span equipment is affixed to the container")]
    SpanEquipmentAffixed,
    #[error("the container still holds terminal equipment")]
    ContainsTerminalEquipment,
}

rejection_codes!(
    PlaceSpanEquipmentError,
    CutSpanSegmentsError,
    ConnectSpanSegmentsError,
    DisconnectSpanSegmentsError,
    AffixSpanEquipmentError,
    DetachSpanEquipmentError,
    MergeSpanEquipmentError,
    MoveSpanEquipmentError,
    RemoveSpanStructureError,
    RemoveSpanEquipmentError,
    PlaceTerminalEquipmentError,
    UpdateTerminalEquipmentPropertiesError,
    RemoveTerminalEquipmentError,
    PlaceNodeContainerError,
    PlaceRackError,
    AddTerminalEquipmentReferenceError,
    ChangeSubrackMountError,
    RemoveTerminalEquipmentReferenceError,
    RemoveNodeContainerError,
);

/// Every rejection code of every operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UtilityNetworkError {
    #[error(transparent)]
    PlaceSpanEquipment(#[from] PlaceSpanEquipmentError),
    #[error(transparent)]
    CutSpanSegments(#[from] CutSpanSegmentsError),
    #[error(transparent)]
    ConnectSpanSegments(#[from] ConnectSpanSegmentsError),
    #[error(transparent)]
    DisconnectSpanSegments(#[from] DisconnectSpanSegmentsError),
    #[error(transparent)]
    AffixSpanEquipment(#[from] AffixSpanEquipmentError),
    #[error(transparent)]
    DetachSpanEquipment(#[from] DetachSpanEquipmentError),
    #[error(transparent)]
    MergeSpanEquipment(#[from] MergeSpanEquipmentError),
    #[error(transparent)]
    MoveSpanEquipment(#[from] MoveSpanEquipmentError),
    #[error(transparent)]
    RemoveSpanStructure(#[from] RemoveSpanStructureError),
    #[error(transparent)]
    RemoveSpanEquipment(#[from] RemoveSpanEquipmentError),
    #[error(transparent)]
    PlaceTerminalEquipment(#[from] PlaceTerminalEquipmentError),
    #[error(transparent)]
    UpdateTerminalEquipmentProperties(#[from] UpdateTerminalEquipmentPropertiesError),
    #[error(transparent)]
    RemoveTerminalEquipment(#[from] RemoveTerminalEquipmentError),
    #[error(transparent)]
    PlaceNodeContainer(#[from] PlaceNodeContainerError),
    #[error(transparent)]
    PlaceRack(#[from] PlaceRackError),
    #[error(transparent)]
    AddTerminalEquipmentReference(#[from] AddTerminalEquipmentReferenceError),
    #[error(transparent)]
    ChangeSubrackMount(#[from] ChangeSubrackMountError),
    #[error(transparent)]
    RemoveTerminalEquipmentReference(#[from] RemoveTerminalEquipmentReferenceError),
    #[error(transparent)]
    RemoveNodeContainer(#[from] RemoveNodeContainerError),
}
