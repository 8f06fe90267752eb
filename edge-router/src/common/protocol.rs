//! 通信プロトコル定義
//!
//! ノードの`/info`レスポンスと、ディレクトリAPIの`/api/nodes`レスポンス

use serde::Deserialize;
use std::collections::BTreeMap;

use super::ip::format_host_port;
use super::types::{ContainerInfo, Hostname, NodeRecord};

/// ライブノードのデフォルトポート
pub const DEFAULT_NODE_PORT: &str = "4000";

/// `GET http://{host}/info` のレスポンス
///
/// `containers`と`pending`の両方が必須。未知のフィールドは無視する。
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeInfoResponse {
    /// 稼働コンテナ一覧
    pub containers: Vec<ContainerInfo>,
    /// コンテナごとのpendingジョブ数
    pub pending: BTreeMap<String, i64>,
}

impl From<NodeInfoResponse> for NodeRecord {
    fn from(info: NodeInfoResponse) -> Self {
        NodeRecord::available(info.containers, info.pending)
    }
}

/// `GET {api_url}/api/nodes?minutes_past=60` のレスポンス
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LiveNodesResponse {
    /// 直近に観測されたノード
    pub data: Vec<LiveNodeEntry>,
}

/// ディレクトリAPIが返すノード1件
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LiveNodeEntry {
    /// IPアドレス（またはホスト名）
    pub ip: String,
    /// ポート（文字列・数値のどちらでも受け付ける）
    #[serde(default)]
    pub port: Option<PortValue>,
}

/// ポート表現
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PortValue {
    /// `"4000"`
    Text(String),
    /// `4000`
    Number(u64),
}

impl LiveNodeEntry {
    /// `ip:port`形式のホスト名を返す（ポート未指定時は4000）
    ///
    /// IPが空の場合は`None`。
    pub fn hostname(&self) -> Option<Hostname> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return None;
        }
        let port = match &self.port {
            Some(PortValue::Text(port)) if !port.trim().is_empty() => port.trim().to_string(),
            Some(PortValue::Number(port)) => port.to_string(),
            _ => DEFAULT_NODE_PORT.to_string(),
        };
        Some(format_host_port(ip, &port))
    }
}
