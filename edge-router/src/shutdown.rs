//! Cooperative shutdown controller for the monitor loop.
//!
//! `stop()` only flips the state; the loop observes it at the top of each
//! cycle and in-flight probes are never cancelled.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// 監視ループの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// 稼働中
    Running,
    /// 停止要求済み（現在のサイクル完了待ち）
    Stopping,
    /// 停止済み
    Stopped,
}

impl MonitorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Stopping,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Stopping => 1,
            Self::Stopped => 2,
        }
    }

    /// Returns the state as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cooperative shutdown signal shared between the monitor loop and callers.
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: AtomicU8,
    notify: Notify,
}

impl ShutdownController {
    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        MonitorState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    /// Returns true if shutdown has been requested (or completed).
    pub fn is_shutdown_requested(&self) -> bool {
        self.state() != MonitorState::Running
    }

    /// Request shutdown and wake all waiters.
    ///
    /// Returns `true` only for the call that performed `Running → Stopping`.
    pub fn request_shutdown(&self) -> bool {
        let transitioned = self
            .inner
            .state
            .compare_exchange(
                MonitorState::Running.as_u8(),
                MonitorState::Stopping.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if transitioned {
            self.inner.notify.notify_waiters();
        }
        transitioned
    }

    /// Mark the loop as exited.
    pub fn mark_stopped(&self) {
        self.inner
            .state
            .store(MonitorState::Stopped.as_u8(), Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // 登録後に状態を確認し、通知の取りこぼしを防ぐ
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}
