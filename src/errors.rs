// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the utility network
//!
//! Errors fall into three tiers:
//!
//! 1. **Rejections** - input validation and domain rule failures. Each
//!    operation owns a closed enum of codes (see [`crate::aggregate::errors`]),
//!    wrapped in [`CommandError::Rejected`].
//! 2. **Infrastructure failures** - event store and collaborator I/O
//!    ([`InfrastructureError`], [`CollaboratorError`]).
//! 3. **Corruption** - [`FatalError`]. The projection no longer matches the
//!    event log; processing must halt and an operator must be paged.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in infrastructure operations
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Expected version did not match the stored version
    #[error("Concurrency error: {0}")]
    ConcurrencyError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

#[cfg(feature = "nats")]
impl From<async_nats::Error> for InfrastructureError {
    fn from(err: async_nats::Error) -> Self {
        InfrastructureError::NatsConnection(err.to_string())
    }
}

/// Failure reported by an external collaborator (route network, address lookup)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The collaborator does not know the requested id
    #[error("{collaborator}: {id} not found")]
    NotFound {
        /// Collaborator name
        collaborator: &'static str,
        /// Requested id
        id: Uuid,
    },

    /// The collaborator could not answer
    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        /// Collaborator name
        collaborator: &'static str,
        /// Failure detail
        message: String,
    },
}

/// Invariant violation: the projection can no longer be trusted
///
/// Never returned for bad input. Seeing one of these means events were applied
/// out of order, applied twice, or the log references state that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// Compare-and-swap on an equipment index saw an unexpected previous value
    #[error("concurrency mismatch on {kind} {id}: index does not hold the expected previous value")]
    ConcurrencyMismatch {
        /// Index name
        kind: &'static str,
        /// Equipment id
        id: Uuid,
    },

    /// Event sequence does not follow the last applied version
    #[error("event for aggregate {aggregate_id} out of order: expected version {expected}, got {actual}")]
    EventOutOfOrder {
        /// Aggregate id
        aggregate_id: Uuid,
        /// Next version the projection expected
        expected: u64,
        /// Version carried by the event
        actual: u64,
    },

    /// An id was registered into the graph twice
    #[error("graph element {0} already exists")]
    DuplicateGraphElement(Uuid),

    /// A graph element that must exist is missing
    #[error("graph element {0} not found")]
    GraphElementNotFound(Uuid),

    /// A graph element has a different shape than the equipment says it should
    #[error("graph element {id} is inconsistent: {reason}")]
    GraphElementInconsistent {
        /// Element id
        id: Uuid,
        /// What did not match
        reason: String,
    },

    /// A specification referenced by live state has vanished from the catalog
    #[error("specification {0} referenced by live state is missing")]
    SpecificationMissing(Uuid),

    /// A specification is malformed
    #[error("specification {id} is corrupt: {reason}")]
    SpecificationCorrupt {
        /// Specification id
        id: Uuid,
        /// What is wrong with it
        reason: String,
    },

    /// Equipment referenced by an event is not in the projection
    #[error("{kind} {id} referenced by an event is not in the projection")]
    EquipmentMissing {
        /// Index name
        kind: &'static str,
        /// Equipment id
        id: Uuid,
    },

    /// Second step of a two-aggregate command failed after the first committed
    #[error("second step of a cross-aggregate command failed: {0}")]
    CrossAggregateStepFailed(String),
}

/// Outcome of an aggregate handler that did not produce an event
///
/// `C` is the closed set of rejection codes of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError<C>
where
    C: std::error::Error + 'static,
{
    /// Validation or domain rule rejection
    #[error(transparent)]
    Rejected(C),

    /// Corruption detected while validating
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl<C> CommandError<C>
where
    C: std::error::Error + 'static,
{
    /// The rejection code, if this is not a fatal error
    pub fn code(&self) -> Option<&C> {
        match self {
            CommandError::Rejected(code) => Some(code),
            CommandError::Fatal(_) => None,
        }
    }

    /// Whether processing must halt
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Fatal(_))
    }
}

/// Lets handlers write `return Err(SomeCode::Variant.into())`
macro_rules! rejection_codes {
    ($($code:ty),+ $(,)?) => {
        $(
            impl From<$code> for $crate::errors::CommandError<$code> {
                fn from(code: $code) -> Self {
                    $crate::errors::CommandError::Rejected(code)
                }
            }
        )+
    };
}

pub(crate) use rejection_codes;
