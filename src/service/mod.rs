// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for the Utility Network
//!
//! Orchestrates the pure aggregate handlers, the event store, the projection
//! and the route network and address collaborators.
//!
//! # Architecture
//!
//! ```text
//! Client Request
//!     ↓
//! Service Layer (this module)
//!     ↓
//! Command Handler → Aggregate → Event
//!     ↓
//! Event Store (append, expected version)
//!     ↓
//! Projection (indexes + connectivity graph)
//!     ↑
//! Queries (views, traces)
//! ```
//!
//! # Transaction Semantics
//!
//! Each command is one transaction per aggregate:
//! 1. Load the aggregate's events and fold them into state
//! 2. Handle the command (pure function)
//! 3. Append with the folded version as expected version
//! 4. Apply the stored events to the projection
//!
//! Commands touching two aggregates run the second aggregate's step only after
//! the first committed. If that step fails nothing is rolled back: the error
//! is [`FatalError::CrossAggregateStepFailed`] and the host must stop.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = EventSourcedUtilityNetworkService::new(
//!     InMemoryEventStore::new(),
//!     Arc::new(UtilityNetworkProjection::new(16)),
//!     catalog,
//!     route_network,
//!     addresses,
//! );
//!
//! let id = service.place_span_equipment(command).await?;
//! let trace = service.get_connectivity_trace_view(segment_id).await?;
//! ```

pub mod commands;
pub mod queries;
pub mod views;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;
use uuid::Uuid;

use crate::aggregate::*;
use crate::domain::{AddressLookup, RouteNetworkLookup, SpecificationCatalog};
use crate::errors::{CollaboratorError, CommandError, FatalError, InfrastructureError};
use crate::event_store::EventStore;
use crate::projection::UtilityNetworkProjection;

pub use views::*;

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Query result type
pub type QueryResult<T> = Result<T, QueryError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The command was rejected with an operation specific code
    #[error("Command rejected: {0}")]
    Rejected(#[from] UtilityNetworkError),

    /// The command addresses an aggregate that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    /// Event store error
    #[error("Event store error: {0}")]
    EventStore(#[from] InfrastructureError),

    /// Route network or address lookup failed
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The projection can no longer be trusted; the host must stop
    #[error("Fatal: {0}")]
    Fatal(FatalError),
}

impl ServiceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Fatal(_))
    }

    /// The rejection code, if the command was rejected
    pub fn rejection(&self) -> Option<&UtilityNetworkError> {
        match self {
            ServiceError::Rejected(code) => Some(code),
            _ => None,
        }
    }
}

impl From<FatalError> for ServiceError {
    fn from(fatal: FatalError) -> Self {
        error!(error = %fatal, "Fatal utility network error");
        ServiceError::Fatal(fatal)
    }
}

impl<C> From<CommandError<C>> for ServiceError
where
    C: std::error::Error + Into<UtilityNetworkError> + 'static,
{
    fn from(error: CommandError<C>) -> Self {
        match error {
            CommandError::Rejected(code) => ServiceError::Rejected(code.into()),
            CommandError::Fatal(fatal) => fatal.into(),
        }
    }
}

/// Query errors
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Filters were combined in a way the query does not support
    #[error("Invalid filter: {0}")]
    InvalidFilter(&'static str),

    /// No equipment or graph element has the id
    #[error("Not found: {0}")]
    NotFound(Uuid),

    /// Route network or address lookup failed
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The projection no longer matches its log; callers must halt
    #[error("Fatal error: {0}")]
    Fatal(FatalError),
}

impl From<FatalError> for QueryError {
    fn from(fatal: FatalError) -> Self {
        error!(error = %fatal, "Fatal utility network error during query");
        QueryError::Fatal(fatal)
    }
}

/// Command surface of the utility network
#[async_trait]
pub trait UtilityNetworkService: Send + Sync {
    /// Place span equipment along a walk of interest; returns its id
    async fn place_span_equipment(&self, command: PlaceSpanEquipmentCommand) -> ServiceResult<Uuid>;

    async fn cut_span_segments(&self, command: CutSpanSegmentsCommand) -> ServiceResult<()>;

    async fn connect_span_segments_to_terminals(
        &self,
        command: ConnectSpanSegmentsToTerminalsCommand,
    ) -> ServiceResult<()>;

    /// Join segments of two span equipments through junction terminals
    async fn connect_span_segments_at_route_node(
        &self,
        command: ConnectSpanSegmentsAtRouteNodeCommand,
    ) -> ServiceResult<()>;

    async fn disconnect_span_segments(&self, command: DisconnectSpanSegmentsCommand) -> ServiceResult<()>;

    async fn affix_span_equipment_to_node_container(
        &self,
        command: AffixSpanEquipmentToNodeContainerCommand,
    ) -> ServiceResult<()>;

    async fn detach_span_equipment_from_node_container(
        &self,
        command: DetachSpanEquipmentFromNodeContainerCommand,
    ) -> ServiceResult<()>;

    async fn merge_span_equipment(&self, command: MergeSpanEquipmentCommand) -> ServiceResult<()>;

    async fn move_span_equipment(&self, command: MoveSpanEquipmentCommand) -> ServiceResult<()>;

    async fn remove_span_structure(&self, command: RemoveSpanStructureCommand) -> ServiceResult<()>;

    async fn remove_span_equipment(&self, command: RemoveSpanEquipmentCommand) -> ServiceResult<()>;

    /// Place terminal equipment in a node container; returns its id
    async fn place_terminal_equipment(&self, command: PlaceTerminalEquipmentCommand) -> ServiceResult<Uuid>;

    async fn update_terminal_equipment_properties(
        &self,
        command: UpdateTerminalEquipmentPropertiesCommand,
    ) -> ServiceResult<()>;

    async fn remove_terminal_equipment(&self, command: RemoveTerminalEquipmentCommand) -> ServiceResult<()>;

    /// Place a node container at a node of interest; returns its id
    async fn place_node_container(&self, command: PlaceNodeContainerCommand) -> ServiceResult<Uuid>;

    async fn place_rack(&self, command: PlaceRackCommand) -> ServiceResult<()>;

    async fn reverse_vertical_content_alignment(
        &self,
        command: ReverseVerticalContentAlignmentCommand,
    ) -> ServiceResult<()>;

    async fn change_subrack_mount(&self, command: ChangeSubrackMountCommand) -> ServiceResult<()>;

    async fn remove_node_container(&self, command: RemoveNodeContainerCommand) -> ServiceResult<()>;
}

/// Query surface of the utility network
#[async_trait]
pub trait UtilityNetworkQueries: Send + Sync {
    /// Equipment by id or by route network interest id, never both
    async fn get_equipment_details(&self, query: GetEquipmentDetails) -> QueryResult<EquipmentDetails>;

    /// Single path trace through a terminal or span segment
    async fn get_connectivity_trace_view(&self, element_id: Uuid) -> QueryResult<ConnectivityTraceView>;

    async fn get_span_equipment_connectivity_view(
        &self,
        span_equipment_ids: Vec<Uuid>,
    ) -> QueryResult<Vec<SpanEquipmentConnectivityView>>;

    /// Customer terminations reached from span equipment, terminal
    /// equipment or a single graph element
    async fn get_outage_view(&self, id: Uuid) -> QueryResult<OutageView>;
}

/// Event-sourced implementation of both surfaces
///
/// Commands run one at a time; queries read the projection concurrently.
pub struct EventSourcedUtilityNetworkService<S, R, A> {
    event_store: S,
    projection: Arc<UtilityNetworkProjection>,
    catalog: Arc<SpecificationCatalog>,
    route_network: R,
    addresses: A,
    writer: Mutex<()>,
}

impl<S, R, A> EventSourcedUtilityNetworkService<S, R, A>
where
    S: EventStore,
    R: RouteNetworkLookup,
    A: AddressLookup,
{
    pub fn new(
        event_store: S,
        projection: Arc<UtilityNetworkProjection>,
        catalog: Arc<SpecificationCatalog>,
        route_network: R,
        addresses: A,
    ) -> Self {
        Self {
            event_store,
            projection,
            catalog,
            route_network,
            addresses,
            writer: Mutex::new(()),
        }
    }

    pub fn projection(&self) -> &Arc<UtilityNetworkProjection> {
        &self.projection
    }

    pub fn event_store(&self) -> &S {
        &self.event_store
    }

    /// Replay the whole log into the projection; returns the event count
    ///
    /// Only valid on an empty projection.
    pub async fn rebuild_projection(&self) -> ServiceResult<usize> {
        let _writer = self.writer.lock().await;
        let events = self.event_store.read_all().await?;
        self.projection.replay(&events)?;
        Ok(events.len())
    }
}
