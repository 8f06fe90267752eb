//! ノードプローバー
//!
//! `GET http://{host}/info` で1ノードの稼働状況と負荷を取得する。
//! 失敗はすべて`ProbeOutcome::Unreachable`として返し、呼び出し元へは伝播しない。

use crate::common::error::{ProbeError, RouterResult};
use crate::common::protocol::NodeInfoResponse;
use crate::common::types::NodeRecord;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// 1回のプローブ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 200かつ`containers`/`pending`を含む正しいJSON
    Available(NodeRecord),
    /// それ以外すべて
    Unreachable(ProbeError),
}

impl ProbeOutcome {
    /// プローブが成功したか
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// ノードプローバー
///
/// タイムアウト付きの共有HTTPクライアントを保持する。`Clone`は安価。
#[derive(Clone, Debug)]
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    /// 指定タイムアウトのプローバーを作成
    pub fn new(timeout: Duration) -> RouterResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// 1ノードをプローブする
    pub async fn probe(&self, host: &str) -> ProbeOutcome {
        match self.fetch_info(host).await {
            Ok(info) => ProbeOutcome::Available(info.into()),
            Err(e) => {
                debug!(node = %host, error = %e, "Probe failed");
                ProbeOutcome::Unreachable(e)
            }
        }
    }

    async fn fetch_info(&self, host: &str) -> Result<NodeInfoResponse, ProbeError> {
        let url = format!("http://{}/info", host);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ProbeError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProbeError::MalformedBody(e.to_string()))
    }
}
