//! ノード選択の性質テスト
//!
//! ランダムなスナップショットに対して、選択結果と集計結果が
//! 素朴な全件走査の結果と一致することを確認する。

use edge_router::balancer::{list_containers, select_nodes};
use edge_router::common::types::{ContainerInfo, NodeRecord};
use edge_router::Snapshot;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const CONTAINER_IDS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone)]
struct NodeShape {
    available: bool,
    containers: Vec<usize>,
    pending: Vec<(usize, i64)>,
}

fn node_shape() -> impl Strategy<Value = NodeShape> {
    (
        any::<bool>(),
        prop::collection::vec(0..CONTAINER_IDS.len(), 0..5),
        prop::collection::vec((0..CONTAINER_IDS.len(), 0i64..20), 0..4),
    )
        .prop_map(|(available, containers, pending)| NodeShape {
            available,
            containers,
            pending,
        })
}

fn build_snapshot(shapes: &[NodeShape]) -> Snapshot {
    let records = shapes.iter().enumerate().map(|(i, shape)| {
        let containers = shape
            .containers
            .iter()
            .map(|&c| ContainerInfo::new(CONTAINER_IDS[c]))
            .collect();
        let pending: BTreeMap<String, i64> = shape
            .pending
            .iter()
            .map(|&(c, n)| (CONTAINER_IDS[c].to_string(), n))
            .collect();
        let record = NodeRecord::available(containers, pending);
        let record = if shape.available {
            record
        } else {
            record.into_unavailable()
        };
        (format!("10.0.0.{i}:4000"), record)
    });
    Snapshot::from_records(1, records)
}

fn required_set(indices: &[usize]) -> BTreeSet<String> {
    indices
        .iter()
        .map(|&c| CONTAINER_IDS[c].to_string())
        .collect()
}

proptest! {
    #[test]
    fn selection_matches_full_scan(
        shapes in prop::collection::vec(node_shape(), 0..12),
        required in prop::collection::vec(0..CONTAINER_IDS.len(), 0..3),
        limit in 0usize..6,
        offset in 0usize..14,
    ) {
        let snapshot = build_snapshot(&shapes);
        let required = required_set(&required);
        let selected = select_nodes(&snapshot, &required, limit, offset);

        prop_assert!(selected.len() <= limit);

        let mut expected: Vec<(i64, String)> = snapshot
            .nodes()
            .iter()
            .filter(|(_, record)| record.is_available() && required.is_subset(record.container_ids()))
            .map(|(host, record)| (record.pending_total(), host.clone()))
            .collect();
        expected.sort();
        let expected: Vec<String> = expected
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, host)| host)
            .collect();

        prop_assert_eq!(selected, expected);
    }

    #[test]
    fn selected_nodes_run_every_required_container(
        shapes in prop::collection::vec(node_shape(), 1..12),
        required in prop::collection::vec(0..CONTAINER_IDS.len(), 1..3),
    ) {
        let snapshot = build_snapshot(&shapes);
        let required = required_set(&required);

        for host in select_nodes(&snapshot, &required, usize::MAX, 0) {
            let record = snapshot.get(&host).expect("selected node is in snapshot");
            prop_assert!(record.is_available());
            prop_assert!(record.runs_all(&required));
        }
    }

    #[test]
    fn container_counts_match_single_container_selection(
        shapes in prop::collection::vec(node_shape(), 0..12),
    ) {
        let snapshot = build_snapshot(&shapes);
        let summaries = list_containers(&snapshot);

        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(&ids, &sorted);

        for summary in &summaries {
            let required: BTreeSet<String> = [summary.id.clone()].into();
            let hosts = select_nodes(&snapshot, &required, usize::MAX, 0);
            prop_assert!(summary.count >= 1);
            prop_assert_eq!(summary.count, hosts.len());
        }
    }
}
