//! ライブノード取得
//!
//! 外部のディレクトリ（エクスプローラー）APIから直近に観測されたノードを取得する。
//! 失敗時は空集合を返してログに残すだけで、監視サイクルは止めない。

use crate::common::error::{DirectoryError, RouterResult};
use crate::common::protocol::LiveNodesResponse;
use crate::common::types::Hostname;
use crate::config::DirectoryConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::BTreeSet;
use tracing::{debug, error};

/// 「直近何分に観測されたノード」を問い合わせるか
pub const LIVE_WINDOW_MINUTES: u32 = 60;

/// サイクルごとに動的なノード集合を返す取得元
#[async_trait]
pub trait LiveNodeSource: Send + Sync {
    /// 現在のライブノード集合
    ///
    /// 実装はエラーを返さず、失敗時は空集合とする。
    async fn fetch_live_nodes(&self) -> BTreeSet<Hostname>;
}

/// ディレクトリAPIクライアント
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    client: Client,
    api_url: String,
}

impl DirectoryClient {
    /// 設定からクライアントを作成
    pub fn new(config: &DirectoryConfig) -> RouterResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// ベースURL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// ライブノードを取得（エラーを返す版）
    pub async fn try_fetch(&self) -> Result<BTreeSet<Hostname>, DirectoryError> {
        let url = format!("{}/api/nodes", self.api_url);

        let response = self
            .client
            .get(&url)
            .query(&[("minutes_past", LIVE_WINDOW_MINUTES)])
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(DirectoryError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;
        let parsed: LiveNodesResponse = serde_json::from_slice(&body)
            .map_err(|e| DirectoryError::MalformedBody(e.to_string()))?;

        let hosts: BTreeSet<Hostname> = parsed
            .data
            .iter()
            .filter_map(|entry| {
                let host = entry.hostname();
                if host.is_none() {
                    debug!(entry = ?entry, "Skipping live node without IP");
                }
                host
            })
            .collect();

        debug!(count = hosts.len(), "Fetched live nodes");
        Ok(hosts)
    }
}

#[async_trait]
impl LiveNodeSource for DirectoryClient {
    async fn fetch_live_nodes(&self) -> BTreeSet<Hostname> {
        match self.try_fetch().await {
            Ok(hosts) => hosts,
            Err(e) => {
                error!(api_url = %self.api_url, error = %e, "Failed to fetch live nodes");
                BTreeSet::new()
            }
        }
    }
}
