//! Integration Test: ノードの脱落と復帰
//!
//! プローブ失敗でスナップショットから外れ、次のサイクルで応答すれば
//! 新しいデータで戻ってくることを検証する。

use edge_router::SelectQuery;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{host_of, info_response, monitor_for, node_server};

/// タイムアウトしたノードは次のサイクルで復帰する
#[tokio::test]
async fn timed_out_node_recovers_next_cycle() {
    let steady = node_server(json!([{"id": "x"}]), json!({"x": 4})).await;
    let flaky = MockServer::start().await;

    // 1回目はタイムアウトより長く遅延する
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(
            info_response(json!([{"id": "x"}]), json!({"x": 9})).set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .mount(&flaky)
        .await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(info_response(json!([{"id": "x"}]), json!({"x": 1})))
        .mount(&flaky)
        .await;

    let (steady_host, flaky_host) = (host_of(&steady), host_of(&flaky));
    let monitor = monitor_for(vec![steady_host.clone(), flaky_host.clone()]);

    let first = monitor.run_cycle().await;
    assert_eq!(first.hostnames(), vec![steady_host.as_str()]);
    assert_eq!(
        monitor.select(&SelectQuery::new(["x"])),
        vec![steady_host.clone()]
    );

    let second = monitor.run_cycle().await;
    assert_eq!(second.cycle(), 2);
    assert_eq!(second.len(), 2);
    let record = second.get(&flaky_host).expect("flaky node is back");
    assert_eq!(record.pending_total(), 1);
    assert_eq!(
        monitor.select(&SelectQuery::new(["x"])),
        vec![flaky_host, steady_host]
    );
}

/// 稼働中ノードが失敗すると、その時点で選択対象から外れる
#[tokio::test]
async fn failing_node_drops_out_and_registry_keeps_it() {
    let node = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(info_response(json!([{"id": "x"}]), json!({})))
        .up_to_n_times(1)
        .mount(&node)
        .await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&node)
        .await;

    let host = host_of(&node);
    let monitor = monitor_for(vec![host.clone()]);

    assert_eq!(monitor.run_cycle().await.len(), 1);
    assert!(monitor.run_cycle().await.is_empty());
    assert!(monitor.select(&SelectQuery::new(["x"])).is_empty());

    // 静的ノードはレジストリに残り、以降のサイクルでもプローブされる
    let record = monitor.registry().get(&host).await.expect("still registered");
    assert!(!record.is_available());
    monitor.run_cycle().await;
    assert_eq!(node.received_requests().await.unwrap().len(), 3);
}

/// 毎サイクル最新のpendingで順位が入れ替わる
#[tokio::test]
async fn fresh_pending_counts_replace_previous_data() {
    let a = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(info_response(json!([{"id": "x"}]), json!({"x": 0})))
        .up_to_n_times(1)
        .mount(&a)
        .await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(info_response(json!([{"id": "x"}]), json!({"x": 10})))
        .mount(&a)
        .await;
    let b = node_server(json!([{"id": "x"}]), json!({"x": 5})).await;

    let (a_host, b_host) = (host_of(&a), host_of(&b));
    let monitor = monitor_for(vec![a_host.clone(), b_host.clone()]);
    let query = SelectQuery::new(["x"]);

    monitor.run_cycle().await;
    assert_eq!(monitor.select(&query), vec![a_host.clone(), b_host.clone()]);

    monitor.run_cycle().await;
    assert_eq!(monitor.select(&query), vec![b_host, a_host]);
}
