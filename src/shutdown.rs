//! 优雅退出管理模块
//!
//! 监听 SIGINT / SIGTERM（Windows 下为 Ctrl+C），通知 `axum::serve` 停止接收新连接并等待在途请求结束。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::{debug, info};

/// 优雅退出管理器
#[derive(Debug, Clone, Default)]
pub struct ShutdownManager {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    notify: Notify,
    /// 首次触发时记录的退出原因
    reason: Mutex<Option<ShutdownReason>>,
    shutting_down: AtomicBool,
}

/// 退出原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 应用请求退出
    Application,
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 等待退出信号；已触发过则立即返回首次触发的原因
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        // 先注册等待者再检查标志，避免错过检查与等待之间的通知
        let notified = self.inner.notify.notified();
        if !self.is_shutting_down() {
            debug!("等待退出信号...");
            notified.await;
        }
        self.recorded_reason()
    }

    /// 触发优雅退出；只有第一次调用生效
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        if self
            .inner
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("重复的退出信号被忽略: {:?}", reason);
            return;
        }

        info!("触发优雅退出: {:?}", reason);
        if let Ok(mut guard) = self.inner.reason.lock() {
            *guard = Some(reason);
        }
        self.inner.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    fn recorded_reason(&self) -> ShutdownReason {
        self.inner
            .reason
            .lock()
            .ok()
            .and_then(|g| g.clone())
            .unwrap_or(ShutdownReason::Application)
    }

    /// 启动信号监听任务
    pub async fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let mut sigterm = signal(SignalKind::terminate())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;

            let manager = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    _ = sigterm.recv() => manager.trigger_shutdown(ShutdownReason::Terminate),
                }
            });
            info!("Unix 信号处理器已启动 (SIGINT/SIGTERM)");
        }

        #[cfg(not(unix))]
        {
            let manager = self.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    Err(e) => tracing::error!("监听Ctrl+C信号失败: {}", e),
                }
            });
            info!("Ctrl+C 信号处理器已启动");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ShutdownManager, ShutdownReason};
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_before_wait_returns_immediately() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutting_down());

        manager.trigger_shutdown(ShutdownReason::Application);
        assert!(manager.is_shutting_down());
        assert_eq!(manager.wait_for_shutdown().await, ShutdownReason::Application);
    }

    #[tokio::test]
    async fn first_reason_wins() {
        let manager = ShutdownManager::new();
        manager.trigger_shutdown(ShutdownReason::Interrupt);
        manager.trigger_shutdown(ShutdownReason::Terminate);
        assert_eq!(manager.wait_for_shutdown().await, ShutdownReason::Interrupt);
    }

    #[tokio::test]
    async fn waiter_is_woken_by_later_trigger() {
        let manager = ShutdownManager::new();
        let waiter = {
            let m = manager.clone();
            tokio::spawn(async move { m.wait_for_shutdown().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.trigger_shutdown(ShutdownReason::Terminate);

        let reason = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter timed out")
            .expect("join waiter");
        assert_eq!(reason, ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn wait_blocks_without_trigger() {
        let manager = ShutdownManager::new();
        let res =
            tokio::time::timeout(Duration::from_millis(50), manager.wait_for_shutdown()).await;
        assert!(res.is_err());
    }
}
