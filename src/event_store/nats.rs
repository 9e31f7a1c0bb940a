// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream Event Store Implementation
//!
//! Persists utility network events in one JetStream stream. Subjects follow
//! `utility_network.<aggregate_type>.<aggregate_id>.<event_type>`, so one
//! aggregate's stream is a single subject filter.

use async_nats::jetstream::{self, stream::Stream};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{EventStore, StoredEvent};
use crate::config::{JetStreamConfig, StorageType};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::events::UtilityNetworkEvent;

const SUBJECT_PREFIX: &str = "utility_network";
const BATCH_SIZE: usize = 10_000;

/// NATS JetStream-backed event store
///
/// # Example
///
/// ```rust,no_run
/// use cim_utility_network::config::JetStreamConfig;
/// use cim_utility_network::event_store::NatsEventStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = NatsEventStore::connect("nats://localhost:4222", JetStreamConfig::default()).await?;
///     Ok(())
/// }
/// ```
pub struct NatsEventStore {
    jetstream: jetstream::Context,
    stream: Stream,
}

/// Create or update the utility network events stream
pub async fn create_utility_network_stream(
    jetstream: &jetstream::Context,
    config: &JetStreamConfig,
) -> InfrastructureResult<Stream> {
    let storage = match config.storage {
        StorageType::File => jetstream::stream::StorageType::File,
        StorageType::Memory => jetstream::stream::StorageType::Memory,
    };

    let stream_config = jetstream::stream::Config {
        name: config.stream_name.clone(),
        subjects: config.subjects.clone(),
        max_age: config.max_age,
        storage,
        num_replicas: config.replicas,
        ..Default::default()
    };

    jetstream
        .get_or_create_stream(stream_config)
        .await
        .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))
}

impl NatsEventStore {
    /// Connect to NATS and create or open the event stream
    pub async fn connect(nats_url: &str, config: JetStreamConfig) -> InfrastructureResult<Self> {
        let client = async_nats::connect(nats_url)
            .await
            .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

        let jetstream = jetstream::new(client);
        let stream = create_utility_network_stream(&jetstream, &config).await?;
        info!(url = nats_url, stream = %config.stream_name, "Connected to JetStream event store");

        Ok(Self { jetstream, stream })
    }

    /// Format: utility_network.<aggregate_type>.<aggregate_id>.<event_type>
    fn build_subject(event: &UtilityNetworkEvent) -> String {
        format!(
            "{}.{}.{}.{}",
            SUBJECT_PREFIX,
            event.aggregate_type_name(),
            event.aggregate_id(),
            event.event_type_name().to_lowercase()
        )
    }

    /// Format: utility_network.*.<aggregate_id>.>
    fn aggregate_subject_filter(aggregate_id: Uuid) -> String {
        format!("{}.*.{}.>", SUBJECT_PREFIX, aggregate_id)
    }

    /// Drain every message matching the filter, ordered by stream position
    async fn fetch(
        &self,
        filter_subject: String,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let consumer = self
            .stream
            .create_consumer(jetstream::consumer::pull::Config {
                filter_subject,
                ..Default::default()
            })
            .await
            .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

        let mut events = Vec::new();

        loop {
            let messages_result = consumer
                .fetch()
                .max_messages(BATCH_SIZE)
                .expires(Duration::from_secs(2))
                .messages()
                .await;

            // A timeout means the stream is drained
            let mut messages = match messages_result {
                Ok(msgs) => msgs,
                Err(e) => {
                    let err_msg = e.to_string().to_lowercase();
                    if err_msg.contains("timeout") || err_msg.contains("timed out") || err_msg.contains("no messages") {
                        break;
                    }
                    return Err(InfrastructureError::NatsConnection(e.to_string()));
                }
            };

            let mut batch_count = 0;

            while let Some(message) = messages.next().await {
                let msg = message.map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

                let mut stored: StoredEvent<UtilityNetworkEvent> = serde_json::from_slice(&msg.payload)
                    .map_err(|e| InfrastructureError::Deserialization(e.to_string()))?;
                if let Ok(info) = msg.info() {
                    stored.position = info.stream_sequence;
                }
                events.push(stored);

                msg.ack()
                    .await
                    .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

                batch_count += 1;
            }

            if batch_count < BATCH_SIZE {
                break;
            }
        }

        events.sort_by_key(|e| e.position);
        Ok(events)
    }
}

#[async_trait]
impl EventStore for NatsEventStore {
    async fn append(
        &self,
        aggregate_id: Uuid,
        events: Vec<UtilityNetworkEvent>,
        expected_version: Option<u64>,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let current = self.get_version(aggregate_id).await?.unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(InfrastructureError::ConcurrencyError(format!(
                    "Expected version {} of {}, but current version is {}",
                    expected, aggregate_id, current
                )));
            }
        }

        let mut stored_events = Vec::with_capacity(events.len());
        let mut sequence = current;

        for event in events {
            sequence += 1;
            let subject = Self::build_subject(&event);
            let mut stored = StoredEvent::wrap(event, sequence, 0);

            let payload = serde_json::to_vec(&stored)?;

            let ack = self
                .jetstream
                .publish(subject, payload.into())
                .await
                .map_err(|e| InfrastructureError::NatsPublish(e.to_string()))?
                .await
                .map_err(|e| InfrastructureError::NatsPublish(e.to_string()))?;

            stored.position = ack.sequence;
            stored_events.push(stored);
        }

        debug!(%aggregate_id, version = sequence, "Events published");
        Ok(stored_events)
    }

    async fn read_events(
        &self,
        aggregate_id: Uuid,
    ) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        let mut events = self.fetch(Self::aggregate_subject_filter(aggregate_id)).await?;
        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    async fn read_all(&self) -> InfrastructureResult<Vec<StoredEvent<UtilityNetworkEvent>>> {
        self.fetch(format!("{}.>", SUBJECT_PREFIX)).await
    }

    async fn get_version(&self, aggregate_id: Uuid) -> InfrastructureResult<Option<u64>> {
        let events = self.read_events(aggregate_id).await?;
        Ok(events.iter().map(|e| e.sequence).max())
    }
}
