//! 利用可能ノードのスナップショット
//!
//! 1サイクルにつき1回だけ生成される不変の値。公開は`Arc`の差し替えで行う。

use crate::common::types::{Hostname, NodeRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// ある時点で利用可能なノード全体のビュー
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    cycle: u64,
    published_at: DateTime<Utc>,
    nodes: BTreeMap<Hostname, NodeRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    /// 初回サイクル前の空スナップショット（cycle = 0）
    pub fn empty() -> Self {
        Self {
            cycle: 0,
            published_at: Utc::now(),
            nodes: BTreeMap::new(),
        }
    }

    /// サイクルの全レコードからスナップショットを作成
    ///
    /// `available = true`のノードのみ残す。
    pub fn from_records<I>(cycle: u64, records: I) -> Self
    where
        I: IntoIterator<Item = (Hostname, NodeRecord)>,
    {
        let nodes = records
            .into_iter()
            .filter(|(_, record)| record.is_available())
            .collect();
        Self {
            cycle,
            published_at: Utc::now(),
            nodes,
        }
    }

    /// このスナップショットを生成したサイクル番号
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// 公開時刻
    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// ホスト名順のノード
    pub fn nodes(&self) -> &BTreeMap<Hostname, NodeRecord> {
        &self.nodes
    }

    /// ノードのレコード
    pub fn get(&self, host: &str) -> Option<&NodeRecord> {
        self.nodes.get(host)
    }

    /// 利用可能ノードのホスト名（昇順）
    pub fn hostnames(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// 利用可能ノード数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 利用可能ノードがないか
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
