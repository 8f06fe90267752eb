//! ノード選択の型定義

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// デフォルトの返却ノード数
pub const DEFAULT_SELECT_LIMIT: usize = 3;

/// ノード選択クエリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// 必要なコンテナID（すべて稼働しているノードのみ対象）
    pub containers: BTreeSet<String>,
    /// 最大返却数
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// 先頭からスキップする件数
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_SELECT_LIMIT
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self {
            containers: BTreeSet::new(),
            limit: DEFAULT_SELECT_LIMIT,
            offset: 0,
        }
    }
}

impl SelectQuery {
    /// 指定コンテナに対するデフォルトクエリ（limit = 3, offset = 0）
    pub fn new<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: containers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// 返却数を設定
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// オフセットを設定
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}
