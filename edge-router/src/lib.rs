//! Edge router
//!
//! 静的・動的なワーカーノード群を定期的にプローブし、要求コンテナを
//! 稼働している負荷の低いノードを選ぶ。

#![warn(missing_docs)]

/// 共通型定義（エラー・ワイヤ形式・IPユーティリティ）
pub mod common;

/// 設定管理（環境変数ヘルパー・ノードリスト）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 監視ループの停止制御
pub mod shutdown;

/// ノード登録管理とスナップショット
pub mod registry;

/// ヘルスチェック監視（プローブと監視ループ）
pub mod health;

/// ライブノード取得（ディレクトリAPI）
pub mod discovery;

/// ノード選択（負荷の低い順）
pub mod balancer;

/// CLI
pub mod cli;

pub use balancer::{NodeSelector, SelectQuery};
pub use common::error::{RouterError, RouterResult};
pub use config::RouterConfig;
pub use discovery::{DirectoryClient, LiveNodeSource};
pub use health::{NodeMonitor, ProbeOutcome, Prober};
pub use registry::{NodeRegistry, Snapshot};
