// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Segment Coverage and Replay
//!
//! Cuts may arrive in any order and always append their node of interest,
//! so segment indexes are not positional. These properties map every index
//! back to its place on the walk before checking coverage.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::fixtures::*;
use cim_utility_network::domain::SpanEquipment;
use cim_utility_network::event_store::EventStore;
use cim_utility_network::projection::UtilityNetworkProjection;

const FIBER: usize = 1;

// ============================================================================
// Strategies
// ============================================================================

/// Walk length and a shuffled subset of its interior nodes to cut at
fn walk_and_cuts() -> impl Strategy<Value = (u16, Vec<u16>)> {
    (3u16..=8)
        .prop_flat_map(|len| {
            let interior: Vec<u16> = (2..len).collect();
            let max = interior.len();
            (Just(len), Just(interior).prop_shuffle(), 0..=max)
        })
        .prop_map(|(len, mut interior, count)| {
            interior.truncate(count);
            (len, interior)
        })
}

// ============================================================================
// Helpers
// ============================================================================

/// Segment spans of one structure as walk positions, sorted
fn walk_spans(equipment: &SpanEquipment, structure_index: usize, walk_len: u16) -> Vec<(u16, u16)> {
    let positions: HashMap<Uuid, u16> = (1..=walk_len).map(|n| (node(n), n)).collect();
    let position = |index: u16| {
        equipment
            .node_id_at(index)
            .and_then(|id| positions.get(&id).copied())
            .expect("node of interest off the walk")
    };

    let mut spans: Vec<(u16, u16)> = equipment.span_structures[structure_index]
        .span_segments
        .iter()
        .map(|s| {
            let (a, b) = (
                position(s.from_node_of_interest_index),
                position(s.to_node_of_interest_index),
            );
            (a.min(b), a.max(b))
        })
        .collect();
    spans.sort();
    spans
}

fn cut_all(network: &TestNetwork, span_equipment_id: Uuid, cuts: &[u16]) {
    tokio_test::block_on(async {
        for n in cuts {
            network.cut(span_equipment_id, *n).await;
        }
    });
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: Cuts keep every structure covered end to end
    ///
    /// After any cut order, each structure's segments tile the walk with
    /// no gap and no overlap, one more segment than there were cuts.
    #[test]
    fn prop_cuts_keep_segments_contiguous((len, cuts) in walk_and_cuts()) {
        let network = TestNetwork::new();
        let nodes: Vec<u16> = (1..=len).collect();
        let cable = tokio_test::block_on(network.place_cable(&nodes, "cable"));

        cut_all(&network, cable, &cuts);

        let equipment = network.span(cable);
        prop_assert_eq!(equipment.node_of_interest_ids.len(), 2 + cuts.len());
        for structure_index in 0..equipment.span_structures.len() {
            let spans = walk_spans(&equipment, structure_index, len);
            prop_assert_eq!(spans.len(), cuts.len() + 1);
            prop_assert_eq!(spans[0].0, 1);
            prop_assert_eq!(spans[spans.len() - 1].1, len);
            for pair in spans.windows(2) {
                prop_assert_eq!(pair[0].1, pair[1].0, "gap or overlap in {:?}", spans);
            }
        }
    }

    /// Property: Every live segment is in the graph exactly once
    #[test]
    fn prop_cut_segments_are_registered((len, cuts) in walk_and_cuts()) {
        let network = TestNetwork::new();
        let nodes: Vec<u16> = (1..=len).collect();
        let cable = tokio_test::block_on(network.place_cable(&nodes, "cable"));

        cut_all(&network, cable, &cuts);

        let equipment = network.span(cable);
        let ids: Vec<Uuid> = equipment.segments().map(|(_, _, s)| s.id).collect();
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), unique.len());
        for id in &ids {
            prop_assert!(network.projection().segment_exists(*id));
        }
        prop_assert_eq!(network.projection().graph().element_count(), ids.len());
    }

    /// Property: Replaying the log rebuilds the live projection
    ///
    /// Segment ids come from the handlers, so a rebuilt projection must
    /// take them from the events rather than generate its own.
    #[test]
    fn prop_replay_matches_live_projection((len, cuts) in walk_and_cuts()) {
        let network = TestNetwork::new();
        let nodes: Vec<u16> = (1..=len).collect();
        let feeder = tokio_test::block_on(network.place_cable(&nodes, "feeder"));
        let onward = tokio_test::block_on(network.place_cable(&[len, len + 1], "onward"));

        cut_all(&network, feeder, &cuts);

        let equipment = network.span(feeder);
        let last_fiber = equipment.span_structures[FIBER]
            .span_segments
            .iter()
            .find(|s| equipment.node_id_at(s.to_node_of_interest_index) == Some(node(len)))
            .map(|s| s.id)
            .expect("no fiber segment ends at the z end");
        let onward_fiber = network.segment_ids(onward, FIBER)[0];
        tokio_test::block_on(network.join_at(len, vec![last_fiber, onward_fiber]));

        let events = tokio_test::block_on(network.service.event_store().read_all())
            .expect("read_all failed");
        let rebuilt = UtilityNetworkProjection::new(16);
        rebuilt.replay(&events).expect("replay failed");

        prop_assert_eq!(rebuilt.snapshot(), network.projection().snapshot());
    }
}
