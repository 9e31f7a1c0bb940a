// Copyright (c) 2025 - Cowboy AI, Inc.
//! Utility Network Projector
//!
//! Rebuilds the utility network projection from the JetStream event log and
//! keeps it current by polling for newly appended events.
//!
//! Run with: cargo run --bin network-projector --features nats
//!
//! Prerequisites:
//! 1. NATS server with JetStream enabled (NATS_URL, default: localhost:4222)
//! 2. Optional: NATS_STREAM, UTILITY_NETWORK_GRAPH_RETENTION, PROJECTOR_POLL_SECS

use anyhow::{bail, Context, Result};
use cim_utility_network::{
    config::{EventStoreConfig, UtilityNetworkConfig},
    event_store::{EventStore, NatsEventStore},
    projection::{ProjectionAdapter, UtilityNetworkProjection},
};
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_NATS_URL: &str = "localhost:4222";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting utility network projector");

    let mut config = UtilityNetworkConfig::from_env().context("Failed to load configuration")?;
    if config.event_store == EventStoreConfig::InMemory {
        config.event_store = EventStoreConfig::Nats {
            url: DEFAULT_NATS_URL.to_string(),
            jetstream: Default::default(),
        };
    }
    let EventStoreConfig::Nats { url, jetstream } = config.event_store.clone() else {
        bail!("projector requires a NATS event store");
    };

    let poll_interval = std::env::var("PROJECTOR_POLL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(5));

    info!(url = %url, stream = %jetstream.stream_name, retention = config.graph_version_retention, "Configuration loaded");

    let store = NatsEventStore::connect(&url, jetstream)
        .await
        .context("Failed to connect to the event store")?;
    let projection = UtilityNetworkProjection::from_config(&config);

    let mut position = 0u64;
    let mut ticker = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }

        let events = store.read_all().await.context("Failed to read the event log")?;
        let mut projected = 0usize;
        for event in events.into_iter().filter(move |e| e.position > position) {
            let event_position = event.position;
            debug!(event_id = %event.event_id, event_type = %event.event_type, "Projecting event");
            if let Err(e) = projection.project(event).await {
                // The projection is no longer consistent with the log
                error!(error = %e, position = event_position, adapter = projection.name(), "Projection failed");
                return Err(e).context("Projection failed");
            }
            position = event_position;
            projected += 1;
        }

        if projected > 0 {
            info!(
                projected,
                position,
                span_equipment = projection.span_equipment_count(),
                terminal_equipment = projection.terminal_equipment_count(),
                node_containers = projection.node_container_count(),
                graph_elements = projection.graph().element_count(),
                "Projection caught up"
            );
        }
    }

    Ok(())
}
