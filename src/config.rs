// Copyright (c) 2025 - Cowboy AI, Inc.
//! Runtime configuration
//!
//! Loaded from the environment by the binary; libraries and tests construct it
//! directly or through [`UtilityNetworkConfig::from_lookup`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Default number of committed graph versions kept for pinned readers
pub const DEFAULT_GRAPH_VERSION_RETENTION: u64 = 16;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityNetworkConfig {
    /// How many committed graph versions stay readable after newer commits
    pub graph_version_retention: u64,

    /// Where events are persisted
    pub event_store: EventStoreConfig,
}

impl Default for UtilityNetworkConfig {
    fn default() -> Self {
        Self {
            graph_version_retention: DEFAULT_GRAPH_VERSION_RETENTION,
            event_store: EventStoreConfig::InMemory,
        }
    }
}

impl UtilityNetworkConfig {
    /// Load configuration from environment variables
    ///
    /// - `UTILITY_NETWORK_GRAPH_RETENTION` - graph versions kept (default 16)
    /// - `NATS_URL` - switches the event store to JetStream when set
    /// - `NATS_STREAM` - JetStream stream name
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let graph_version_retention = match lookup("UTILITY_NETWORK_GRAPH_RETENTION") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                InfrastructureError::Configuration(format!(
                    "UTILITY_NETWORK_GRAPH_RETENTION must be an unsigned integer: {}",
                    e
                ))
            })?,
            None => DEFAULT_GRAPH_VERSION_RETENTION,
        };

        let event_store = match lookup("NATS_URL") {
            Some(url) => {
                let mut jetstream = JetStreamConfig::default();
                if let Some(stream_name) = lookup("NATS_STREAM") {
                    jetstream.stream_name = stream_name;
                }
                EventStoreConfig::Nats { url, jetstream }
            }
            None => EventStoreConfig::InMemory,
        };

        Ok(Self {
            graph_version_retention,
            event_store,
        })
    }
}

/// Event store backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum EventStoreConfig {
    /// Process-local store, lost on restart
    InMemory,

    /// NATS JetStream
    Nats {
        /// Server URL, e.g. `nats://localhost:4222`
        url: String,
        /// Stream settings
        jetstream: JetStreamConfig,
    },
}

/// Configuration for the JetStream event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JetStreamConfig {
    /// Stream name for utility network events
    pub stream_name: String,

    /// Subjects this stream will capture
    pub subjects: Vec<String>,

    /// Maximum age of messages (zero keeps them forever)
    pub max_age: Duration,

    /// Storage type (File or Memory)
    pub storage: StorageType,

    /// Number of replicas (for clustered NATS)
    pub replicas: usize,
}

impl Default for JetStreamConfig {
    fn default() -> Self {
        Self {
            stream_name: "UTILITY_NETWORK_EVENTS".to_string(),
            subjects: vec!["utility_network.>".to_string()],
            // The log is the source of truth; never expire it
            max_age: Duration::ZERO,
            storage: StorageType::File,
            replicas: 1,
        }
    }
}

/// Storage type for JetStream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    /// File-based storage (persistent across restarts)
    File,
    /// Memory-based storage (faster, but lost on restart)
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = UtilityNetworkConfig::default();
        assert_eq!(config.graph_version_retention, DEFAULT_GRAPH_VERSION_RETENTION);
        assert_eq!(config.event_store, EventStoreConfig::InMemory);
    }

    #[test]
    fn test_nats_url_selects_jetstream() {
        let config = UtilityNetworkConfig::from_lookup(lookup_from(&[
            ("NATS_URL", "nats://localhost:4222"),
            ("NATS_STREAM", "FIBER"),
        ]))
        .unwrap();

        match config.event_store {
            EventStoreConfig::Nats { url, jetstream } => {
                assert_eq!(url, "nats://localhost:4222");
                assert_eq!(jetstream.stream_name, "FIBER");
                assert_eq!(jetstream.subjects, vec!["utility_network.>"]);
            }
            other => panic!("expected NATS backend, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_retention_rejected() {
        let result = UtilityNetworkConfig::from_lookup(lookup_from(&[(
            "UTILITY_NETWORK_GRAPH_RETENTION",
            "many",
        )]));
        assert!(matches!(result, Err(InfrastructureError::Configuration(_))));
    }
}
