// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event-sourced connectivity model for fiber and conduit utility networks
//!
//! Span equipment (conduits and cables), terminal equipment (closures,
//! splitters, customer terminations) and node containers are aggregates whose
//! events are appended to an [`event_store::EventStore`]. The
//! [`projection::UtilityNetworkProjection`] folds the log into lookup indexes
//! and a versioned connectivity [`graph::UtilityGraph`] that the
//! [`service`] layer traces and queries.

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod graph;
pub mod projection;
pub mod service;

// Re-export commonly used types
pub use config::UtilityNetworkConfig;
pub use errors::{CollaboratorError, FatalError, InfrastructureError, InfrastructureResult};
pub use event_store::{EventStore, InMemoryEventStore, StoredEvent};
pub use events::UtilityNetworkEvent;
pub use graph::{GraphElement, UtilityGraph};
pub use projection::{ProjectionAdapter, ProjectionSnapshot, UtilityNetworkProjection};
pub use service::{
    EventSourcedUtilityNetworkService, QueryError, ServiceError, UtilityNetworkQueries, UtilityNetworkService,
};
