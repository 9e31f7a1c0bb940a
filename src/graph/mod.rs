// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectivity graph and trace engine

mod elements;
mod trace;
mod utility_graph;
mod versioned;

pub use elements::*;
pub use trace::{AdvancedTraceResult, TraceDirection, TraceResult};
pub use utility_graph::UtilityGraph;
pub use versioned::{Transaction, VersionedIndex};
