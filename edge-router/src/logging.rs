//! ロギング初期化ユーティリティ
//!
//! コンソールには人間向けの形式（既定INFO以上）、ファイルにはJSON形式
//! （DEBUG以上、日次ローテーション）で出力する。

use crate::config::get_env_with_fallback;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

/// デフォルトのログファイル名
pub const DEFAULT_LOG_FILE: &str = "edge_router.log";

/// ロギング設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// コンソール出力のフィルタ（`EnvFilter`ディレクティブ）
    pub level: String,
    /// ログファイルの出力ディレクトリ
    pub dir: PathBuf,
    /// ログファイル名（日付サフィックスが付与される）
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: std::env::temp_dir(),
            file_name: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl LogConfig {
    /// 環境変数から読み込む
    ///
    /// `ROUTER_LOG_LEVEL`（旧: `RUST_LOG`）、`ROUTER_LOG_DIR`。
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: get_env_with_fallback("ROUTER_LOG_LEVEL", "RUST_LOG")
                .filter(|level| !level.trim().is_empty())
                .unwrap_or(defaults.level),
            dir: std::env::var("ROUTER_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dir),
            file_name: defaults.file_name,
        }
    }

    fn console_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn console_layer<S>(config: &LogConfig) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    // 標準出力はCLIのJSON出力に使うため、コンソールログは標準エラーへ
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(config.console_filter())
}

/// グローバルsubscriberを初期化
///
/// 戻り値の`WorkerGuard`はプロセス終了まで保持すること（dropでファイル出力が止まる）。
/// ログファイルを作成できない場合もコンソール出力だけは有効にしてから`Err`を返す。
pub fn init(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_name)
        .build(&config.dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(console_layer(config))
                .try_init();
            return Err(anyhow::Error::new(e).context(format!(
                "failed to open log file in {}",
                config.dir.display()
            )));
        }
    };
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer(config))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
