//! ノード選択モジュール
//!
//! 最新スナップショットを読み取り、要求コンテナでフィルタして
//! pendingジョブ合計の少ない順に並べる。
//!
//! # 決定的な順序
//!
//! - pending合計が同じノードはホスト名の昇順で並べる
//! - コンテナ説明は「ホスト名順で最初に見つかった空でない説明」を採用する
//!
//! 読み取りはロックフリー（`ArcSwap::load_full`）で、監視ループによる
//! スナップショットの差し替えと協調する必要はない。

pub mod types;

pub use types::{SelectQuery, DEFAULT_SELECT_LIMIT};

use crate::common::types::{ContainerSummary, Hostname};
use crate::registry::Snapshot;
use arc_swap::ArcSwap;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// スナップショットからノードを選択する
///
/// `required`をすべて稼働しているノードを、pending合計の昇順
/// （同値はホスト名昇順）で並べ、`[offset, offset + limit)`を返す。
/// 該当なし・`offset`超過・`limit == 0`は空配列。
pub fn select_nodes(
    snapshot: &Snapshot,
    required: &BTreeSet<String>,
    limit: usize,
    offset: usize,
) -> Vec<Hostname> {
    let mut candidates: Vec<(&Hostname, i64)> = snapshot
        .nodes()
        .iter()
        .filter(|(_, record)| record.is_available() && record.runs_all(required))
        .map(|(host, record)| (host, record.pending_total()))
        .collect();

    candidates.sort_by(|(host_a, load_a), (host_b, load_b)| {
        load_a.cmp(load_b).then_with(|| host_a.cmp(host_b))
    });

    candidates
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(host, _)| host.clone())
        .collect()
}

/// スナップショット全体のコンテナを集計する
///
/// `count`はそのIDを稼働しているノード数（1ノード内の重複は1回）。
/// 結果はコンテナIDの昇順。
pub fn list_containers(snapshot: &Snapshot) -> Vec<ContainerSummary> {
    let mut summaries: BTreeMap<&str, ContainerSummary> = BTreeMap::new();

    for record in snapshot.nodes().values().filter(|r| r.is_available()) {
        let mut seen_on_node = HashSet::new();
        for container in record.containers() {
            let summary = summaries
                .entry(container.id.as_str())
                .or_insert_with(|| ContainerSummary {
                    id: container.id.clone(),
                    count: 0,
                    description: None,
                });

            if seen_on_node.insert(container.id.as_str()) {
                summary.count += 1;
            }
            if summary.description.is_none() {
                summary.description = container.non_empty_description().map(str::to_string);
            }
        }
    }

    summaries.into_values().collect()
}

/// 公開済みスナップショットへの読み取りハンドル
///
/// `Clone`は安価で、各呼び出しはその時点の完全なスナップショット1つだけを参照する。
#[derive(Clone, Debug)]
pub struct NodeSelector {
    snapshot: Arc<ArcSwap<Snapshot>>,
}

impl NodeSelector {
    /// 共有スナップショットから選択器を作成
    pub fn new(snapshot: Arc<ArcSwap<Snapshot>>) -> Self {
        Self { snapshot }
    }

    /// 現在のスナップショット
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// 要求コンテナを稼働する負荷の低いノードを返す
    pub fn select_nodes(
        &self,
        required: &BTreeSet<String>,
        limit: usize,
        offset: usize,
    ) -> Vec<Hostname> {
        select_nodes(&self.snapshot.load(), required, limit, offset)
    }

    /// クエリでノードを選択
    pub fn select(&self, query: &SelectQuery) -> Vec<Hostname> {
        self.select_nodes(&query.containers, query.limit, query.offset)
    }

    /// 利用可能ノード全体のコンテナ集計
    pub fn list_containers(&self) -> Vec<ContainerSummary> {
        list_containers(&self.snapshot.load())
    }
}
