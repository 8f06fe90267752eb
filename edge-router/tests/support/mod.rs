//! テスト共通ユーティリティ

use edge_router::common::types::Hostname;
use edge_router::config::MonitorConfig;
use edge_router::{NodeMonitor, NodeRegistry, Prober};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 短い間隔・タイムアウトの監視設定
#[allow(dead_code)]
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        refresh_interval: Duration::from_millis(50),
        probe_timeout: Duration::from_millis(300),
    }
}

/// `/info`に応答するノード情報レスポンス
#[allow(dead_code)]
pub fn info_response(containers: Value, pending: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "containers": containers,
        "pending": pending,
    }))
}

/// 常に同じ内容を返すワーカーノードを起動
#[allow(dead_code)]
pub async fn node_server(containers: Value, pending: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(info_response(containers, pending))
        .mount(&server)
        .await;
    server
}

/// モックサーバーのホスト名（`IP:port`）
#[allow(dead_code)]
pub fn host_of(server: &MockServer) -> Hostname {
    server.address().to_string()
}

/// 接続を受け付けないホスト名
#[allow(dead_code)]
pub fn dead_host() -> Hostname {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to reserve port");
    let addr = listener.local_addr().expect("failed to read port");
    drop(listener);
    addr.to_string()
}

/// 静的ノードだけを監視するモニター
#[allow(dead_code)]
pub fn monitor_for(hosts: Vec<Hostname>) -> NodeMonitor {
    let config = fast_config();
    NodeMonitor::new(
        config,
        NodeRegistry::new(hosts).expect("at least one node"),
        Prober::new(config.probe_timeout).expect("http client"),
    )
}
