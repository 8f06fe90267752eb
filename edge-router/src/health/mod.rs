//! ヘルスチェックモニター
//!
//! 定期的にノードの稼働状況と負荷を監視
//!
//! PULL型ヘルスチェックを提供する。各ノードの`GET /info`をポーリングし、
//! サイクルごとに利用可能ノードのスナップショットを公開する。

pub mod monitor;
pub mod prober;

pub use monitor::NodeMonitor;
pub use prober::{ProbeOutcome, Prober};
