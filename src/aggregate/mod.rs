// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Aggregates
//!
//! Three aggregates own the utility network's state: span equipment, terminal
//! equipment and node containers. Each follows the same pattern:
//! - Handlers are pure functions: Record → Command → Result<Event, CommandError>
//! - State is reconstructed by folding events: [Event] → State
//! - Anything a handler needs from outside its aggregate is passed in
//!
//! # Event Sourcing Pattern
//!
//! ```text
//! Command → Aggregate → Events → Event Store → Projection
//!    ↓          ↓          ↓
//! Intent   Validation  Facts
//! ```
//!
//! # Fold Pattern
//!
//! ```rust,ignore
//! let state = SpanEquipmentState::from_events(id, &events);
//! let equipment = state.span_equipment.as_deref().ok_or(NotFound)?;
//!
//! let event = span_equipment::handle_cut_span_segments(equipment, command, &walk)?;
//! event_store.append(id, vec![event.into()], Some(state.version)).await?;
//! ```
//!
//! # Design Principles
//!
//! ## 1. Command-Event Separation
//! - Commands express intent and can be rejected with a code
//! - Events express facts and are never rejected on apply
//!
//! ## 2. Pure Event Application
//! - `apply_event(State, &Event) → State`
//! - No validation in event application (already happened)
//!
//! ## 3. Time as Parameter
//! - Handlers never read the clock
//! - Timestamp and correlation id arrive in [`CommandContext`]

pub mod commands;
pub mod errors;
pub mod node_container;
pub mod span_equipment;
pub mod terminal_equipment;

pub use commands::*;
pub use errors::*;
pub use node_container::NodeContainerState;
pub use span_equipment::{MergeOutcome, SpanEquipmentState};
pub use terminal_equipment::TerminalEquipmentState;

/// Check an optional manufacturer against a specification's allow list
///
/// An empty list allows no manufacturer at all. Returns the offending id.
pub(crate) fn manufacturer_allowed(
    manufacturer_refs: &[uuid::Uuid],
    manufacturer_id: Option<uuid::Uuid>,
) -> Result<(), uuid::Uuid> {
    match manufacturer_id {
        Some(id) if !manufacturer_refs.contains(&id) => Err(id),
        _ => Ok(()),
    }
}
