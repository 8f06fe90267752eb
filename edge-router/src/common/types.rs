//! 共通型定義
//!
//! NodeRecord, ContainerInfo等のコアデータ型

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// ノードのホスト名（IP、またはIP:port）
pub type Hostname = String;

/// ノード上で稼働しているコンテナの記述子
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerInfo {
    /// コンテナID（ジョブ種別）
    pub id: String,
    /// 説明（任意）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContainerInfo {
    /// 説明なしのコンテナ記述子を作成
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
        }
    }

    /// 説明付きのコンテナ記述子を作成
    pub fn with_description(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: Some(description.into()),
        }
    }

    /// 空文字でない説明を返す
    pub fn non_empty_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|description| !description.is_empty())
    }
}

/// ノード1台分の状態
///
/// `container_ids`は常に`containers`のID射影と一致する。
/// そのためフィールドは非公開とし、コンストラクタ経由でのみ生成する。
/// `available == false`の間、`containers`/`pending`は直近の成功プローブ時の
/// 値が残るが、選択処理からは参照されない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    available: bool,
    containers: Vec<ContainerInfo>,
    #[serde(skip)]
    container_ids: BTreeSet<String>,
    pending: BTreeMap<String, i64>,
}

impl NodeRecord {
    /// 未プローブ（利用不可）のプレースホルダーを作成
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// プローブ成功時のレコードを作成
    pub fn available(containers: Vec<ContainerInfo>, pending: BTreeMap<String, i64>) -> Self {
        let container_ids = containers.iter().map(|c| c.id.clone()).collect();
        Self {
            available: true,
            containers,
            container_ids,
            pending,
        }
    }

    /// 利用不可に遷移させる（コンテナ・pendingの値は保持）
    pub fn into_unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// 直近のプローブが成功しているか
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// 稼働コンテナ一覧（ノードが報告した順序）
    pub fn containers(&self) -> &[ContainerInfo] {
        &self.containers
    }

    /// 稼働コンテナIDの集合
    pub fn container_ids(&self) -> &BTreeSet<String> {
        &self.container_ids
    }

    /// コンテナごとのpendingジョブ数
    pub fn pending(&self) -> &BTreeMap<String, i64> {
        &self.pending
    }

    /// 全コンテナのpending合計（コンテナ種別は問わない）
    pub fn pending_total(&self) -> i64 {
        self.pending
            .values()
            .fold(0i64, |total, count| total.saturating_add(*count))
    }

    /// 要求されたコンテナをすべて稼働しているか
    pub fn runs_all(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.container_ids)
    }
}

/// ネットワーク全体でのコンテナ集計結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerSummary {
    /// コンテナID
    pub id: String,
    /// このコンテナを稼働している利用可能ノード数
    pub count: usize,
    /// 最初に見つかった空でない説明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
