//! 共通型定義
//!
//! エラー型、ノード状態、通信プロトコル

pub mod error;
pub mod ip;
pub mod protocol;
pub mod types;
