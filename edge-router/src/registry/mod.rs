//! ノード登録管理
//!
//! 設定ファイルで指定された静的ノードの状態をメモリ内で管理する。
//! 1サイクル分のプローブ結果はまとめて1回の書き込みで反映され、
//! 部分的に適用された状態が外部から見えることはない。

pub mod snapshot;

pub use snapshot::Snapshot;

use crate::common::error::{ProbeError, RouterError, RouterResult};
use crate::common::types::{Hostname, NodeRecord};
use crate::health::prober::ProbeOutcome;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// プローブ結果の適用による可用性の遷移
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 可用性に変化なし
    Unchanged,
    /// 利用不可 → 利用可能
    BecameAvailable,
    /// 利用可能 → 利用不可
    BecameUnavailable(ProbeError),
}

impl Transition {
    /// 遷移をログに1回だけ記録する
    pub fn log(&self, host: &str) {
        match self {
            Transition::Unchanged => {}
            Transition::BecameAvailable => info!(node = %host, "Node available"),
            Transition::BecameUnavailable(reason) => {
                warn!(node = %host, reason = %reason, "Node not available")
            }
        }
    }
}

/// 直前のレコードにプローブ結果を適用する
///
/// 成功時は新しい`containers`/`pending`で完全に置き換える（マージしない）。
/// 失敗時は`available = false`とし、古い値はそのまま残す。
pub fn apply_outcome(previous: NodeRecord, outcome: ProbeOutcome) -> (NodeRecord, Transition) {
    let was_available = previous.is_available();
    match outcome {
        ProbeOutcome::Available(record) => {
            let transition = if was_available {
                Transition::Unchanged
            } else {
                Transition::BecameAvailable
            };
            (record, transition)
        }
        ProbeOutcome::Unreachable(reason) => {
            let transition = if was_available {
                Transition::BecameUnavailable(reason)
            } else {
                Transition::Unchanged
            };
            (previous.into_unavailable(), transition)
        }
    }
}

/// 静的ノードレジストリ
#[derive(Clone, Debug)]
pub struct NodeRegistry {
    nodes: Arc<RwLock<BTreeMap<Hostname, NodeRecord>>>,
}

impl NodeRegistry {
    /// 静的ノード一覧からレジストリを作成
    ///
    /// 全ノードを`available = false`のプレースホルダーで初期化する。
    /// ノードが1件もない場合は設定エラー。
    pub fn new<I>(hosts: I) -> RouterResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Hostname>,
    {
        let nodes: BTreeMap<Hostname, NodeRecord> = hosts
            .into_iter()
            .map(Into::into)
            .map(|host: Hostname| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .map(|host| (host, NodeRecord::placeholder()))
            .collect();

        if nodes.is_empty() {
            return Err(RouterError::config("static node list is empty"));
        }

        info!(nodes = nodes.len(), "Initialized node registry");

        Ok(Self {
            nodes: Arc::new(RwLock::new(nodes)),
        })
    }

    /// 登録済みホスト名一覧（昇順）
    pub async fn hosts(&self) -> Vec<Hostname> {
        self.nodes.read().await.keys().cloned().collect()
    }

    /// 登録ノード数
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// 登録ノードがないか（構築時に拒否されるため通常は`false`）
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    /// 静的ノードかどうか
    pub async fn contains(&self, host: &str) -> bool {
        self.nodes.read().await.contains_key(host)
    }

    /// ノードのレコードを取得
    pub async fn get(&self, host: &str) -> Option<NodeRecord> {
        self.nodes.read().await.get(host).cloned()
    }

    /// 全レコードのコピー
    pub async fn records(&self) -> BTreeMap<Hostname, NodeRecord> {
        self.nodes.read().await.clone()
    }

    /// 1サイクル分のプローブ結果をまとめて適用する
    ///
    /// 未登録ホストの結果は無視する。適用後の全レコードと、発生した遷移を返す。
    pub async fn apply(
        &self,
        results: Vec<(Hostname, ProbeOutcome)>,
    ) -> (BTreeMap<Hostname, NodeRecord>, Vec<(Hostname, Transition)>) {
        let mut nodes = self.nodes.write().await;
        let mut transitions = Vec::new();

        for (host, outcome) in results {
            let Some(slot) = nodes.get_mut(&host) else {
                warn!(node = %host, "Ignoring probe result for unregistered node");
                continue;
            };
            let previous = std::mem::take(slot);
            let (record, transition) = apply_outcome(previous, outcome);
            *slot = record;
            if transition != Transition::Unchanged {
                transitions.push((host, transition));
            }
        }

        (nodes.clone(), transitions)
    }
}
