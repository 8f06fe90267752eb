//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! プローブとディレクトリ取得の失敗は監視サイクル内で回復されるため、
//! `RouterError`ではなく専用の`ProbeError`/`DirectoryError`で表現する。

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// router error type
#[derive(Debug, Error)]
pub enum RouterError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// I/O error (node list file etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl RouterError {
    /// 設定エラーを生成
    pub fn config(message: impl Into<String>) -> Self {
        Self::Common(CommonError::Config(message.into()))
    }

    /// 起動を中断すべき設定エラーかどうか
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Common(CommonError::Config(_)) | Self::Common(CommonError::Validation(_))
        )
    }
}

impl From<reqwest::Error> for RouterError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// ノードプローブの失敗理由
///
/// いずれもノードを利用不可とするだけで、サイクル外には伝播しない。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// 接続失敗（拒否、DNS、リセット等）
    #[error("connection failed: {0}")]
    Connect(String),

    /// タイムアウト
    #[error("probe timed out")]
    Timeout,

    /// 200以外のステータス
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// JSONボディ不正（`containers`/`pending`欠落を含む）
    #[error("malformed /info body: {0}")]
    MalformedBody(String),

    /// プローブタスク自体が異常終了した
    #[error("probe task aborted: {0}")]
    TaskAborted(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedBody(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

/// ライブノード取得（ディレクトリAPI）の失敗理由
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// リクエスト送信失敗・タイムアウト
    #[error("directory request failed: {0}")]
    Request(String),

    /// 200以外のステータス
    #[error("directory returned HTTP {0}")]
    Status(u16),

    /// JSONボディ不正
    #[error("malformed directory body: {0}")]
    MalformedBody(String),
}

/// Result type alias (router)
pub type RouterResult<T> = Result<T, RouterError>;
