//! Integration Test: スナップショットの一貫性
//!
//! 監視ループが回っている間に並行して読み取っても、
//! 各読み取りが1つの完全なスナップショットだけを見ることを検証する。

use edge_router::balancer::{list_containers, select_nodes};
use edge_router::shutdown::MonitorState;
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{dead_host, host_of, info_response, monitor_for, node_server};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_see_whole_snapshots() {
    let stable = node_server(json!([{"id": "x"}, {"id": "y"}]), json!({"x": 2})).await;

    // 応答と失敗を交互に繰り返すノード
    let toggling = MockServer::start().await;
    for _ in 0..50 {
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(info_response(json!([{"id": "x"}]), json!({"x": 1})))
            .up_to_n_times(1)
            .mount(&toggling)
            .await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&toggling)
            .await;
    }

    let monitor = monitor_for(vec![host_of(&stable), host_of(&toggling), dead_host()]);
    let handle = monitor.clone().start();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let selector = monitor.selector();
            tokio::spawn(async move {
                let x: BTreeSet<String> = ["x".to_string()].into();
                let mut last_cycle = 0;
                for _ in 0..200 {
                    let snapshot = selector.snapshot();
                    assert!(snapshot.cycle() >= last_cycle);
                    last_cycle = snapshot.cycle();

                    assert!(snapshot.nodes().values().all(|r| r.is_available()));

                    let selected = select_nodes(&snapshot, &x, usize::MAX, 0);
                    let summaries = list_containers(&snapshot);
                    let x_count = summaries
                        .iter()
                        .find(|s| s.id == "x")
                        .map_or(0, |s| s.count);
                    assert_eq!(selected.len(), x_count);
                    assert_eq!(selected.len(), snapshot.len());

                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
                last_cycle
            })
        })
        .collect();

    for reader in readers {
        reader.await.unwrap();
    }

    monitor.stop();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor should stop")
        .unwrap();
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert!(monitor.snapshot().cycle() >= 2);
}
