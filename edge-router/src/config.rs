//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs, and the explicit
//! configuration values handed to the monitor, prober and directory client.

use crate::common::error::{CommonError, RouterError, RouterResult};
use crate::common::types::Hostname;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// デフォルトのポーリング間隔（秒）
pub const DEFAULT_REFRESH_INTERVAL_SECS: f64 = 30.0;

/// デフォルトのプローブタイムアウト（秒）
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// デフォルトのディレクトリAPIタイムアウト（秒）
pub const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 10;

/// デフォルトの静的ノード一覧ファイル
pub const DEFAULT_NODES_FILE: &str = "ips.txt";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use edge_router::config::get_env_with_fallback;
///
/// let interval = get_env_with_fallback("ROUTER_REFRESH_INTERVAL", "REFRESH_INTERVAL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// 監視ループとプローブの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// サイクル間のスリープ時間
    pub refresh_interval: Duration,
    /// 1ノードあたりのプローブタイムアウト
    pub probe_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs_f64(DEFAULT_REFRESH_INTERVAL_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl MonitorConfig {
    /// Load monitor configuration from environment variables.
    ///
    /// `ROUTER_REFRESH_INTERVAL`（旧: `REFRESH_INTERVAL`）は小数秒を受け付ける。
    pub fn from_env() -> Self {
        let interval_secs = get_env_with_fallback_parse(
            "ROUTER_REFRESH_INTERVAL",
            "REFRESH_INTERVAL",
            DEFAULT_REFRESH_INTERVAL_SECS,
        );
        let refresh_interval = Duration::try_from_secs_f64(interval_secs).unwrap_or_else(|_| {
            tracing::warn!(
                value = interval_secs,
                "Invalid refresh interval, using default"
            );
            Duration::from_secs_f64(DEFAULT_REFRESH_INTERVAL_SECS)
        });
        let probe_timeout_secs = get_env_with_fallback_parse(
            "ROUTER_PROBE_TIMEOUT_SECS",
            "PROBE_TIMEOUT_SECS",
            DEFAULT_PROBE_TIMEOUT_SECS,
        );

        Self {
            refresh_interval,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
        }
    }

    /// 設定値を検証
    pub fn validate(&self) -> RouterResult<()> {
        if self.refresh_interval.is_zero() {
            return Err(CommonError::Validation(
                "refresh interval must be greater than zero".to_string(),
            )
            .into());
        }
        if self.probe_timeout.is_zero() {
            return Err(CommonError::Validation(
                "probe timeout must be greater than zero".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// ディレクトリ（エクスプローラー）APIの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// APIのベースURL（末尾スラッシュなし）
    pub api_url: String,
    /// リクエストタイムアウト
    pub timeout: Duration,
}

impl DirectoryConfig {
    /// ベースURLから設定を作成
    ///
    /// 空文字列の場合は`None`（ディレクトリ連携なし）。
    pub fn new(api_url: &str, timeout: Duration) -> Option<Self> {
        let api_url = api_url.trim().trim_end_matches('/');
        if api_url.is_empty() {
            return None;
        }
        Some(Self {
            api_url: api_url.to_string(),
            timeout,
        })
    }

    /// Load directory configuration from environment variables.
    pub fn from_env() -> Option<Self> {
        let api_url = get_env_with_fallback("ROUTER_API_URL", "API_URL")?;
        let timeout_secs = get_env_with_fallback_parse(
            "ROUTER_DIRECTORY_TIMEOUT_SECS",
            "DIRECTORY_TIMEOUT_SECS",
            DEFAULT_DIRECTORY_TIMEOUT_SECS,
        );
        Self::new(&api_url, Duration::from_secs(timeout_secs))
    }
}

/// ルーター全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// 監視ループ設定
    pub monitor: MonitorConfig,
    /// ディレクトリAPI設定（未設定ならライブノード取得なし）
    pub directory: Option<DirectoryConfig>,
    /// 静的ノード一覧ファイル
    pub nodes_file: PathBuf,
}

impl RouterConfig {
    /// Load router configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            monitor: MonitorConfig::from_env(),
            directory: DirectoryConfig::from_env(),
            nodes_file: PathBuf::from(get_env_with_fallback_or(
                "ROUTER_NODES_FILE",
                "NODES_FILE",
                DEFAULT_NODES_FILE,
            )),
        }
    }

    /// 設定値を検証
    pub fn validate(&self) -> RouterResult<()> {
        self.monitor.validate()?;
        if let Some(directory) = &self.directory {
            if directory.timeout.is_zero() {
                return Err(CommonError::Validation(
                    "directory timeout must be greater than zero".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// 静的ノード一覧を読み込む
///
/// 1行1ホスト名。前後の空白を除去し、空行と`#`で始まる行は無視する。
/// 重複は最初の出現のみ残す。
pub fn parse_node_list(contents: &str) -> Vec<Hostname> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// ファイルから静的ノード一覧を読み込む
///
/// 1件もなければ設定エラー。
pub fn load_node_list(path: &Path) -> RouterResult<Vec<Hostname>> {
    let contents = std::fs::read_to_string(path)?;
    let nodes = parse_node_list(&contents);
    if nodes.is_empty() {
        return Err(RouterError::config(format!(
            "no nodes listed in {}",
            path.display()
        )));
    }
    Ok(nodes)
}
