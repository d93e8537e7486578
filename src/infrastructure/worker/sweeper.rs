//! Identifier Sweeper - 标识符索引定期清理
//!
//! 单个长期运行的后台任务，按固定间隔清除过期条目，与请求处理互不阻塞。

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::IdentifierIndexPort;

/// Sweeper 配置
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// 清理间隔
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
        }
    }
}

/// 清理任务
pub struct IdentifierSweeper {
    config: SweeperConfig,
    identifier_index: Arc<dyn IdentifierIndexPort>,
    cancel_token: CancellationToken,
}

/// 运行中的清理任务句柄
pub struct SweeperHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// 停止清理任务并等待其退出
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.join_handle.await {
            tracing::error!(error = %e, "Identifier sweeper task failed");
        }
    }
}

impl IdentifierSweeper {
    pub fn new(config: SweeperConfig, identifier_index: Arc<dyn IdentifierIndexPort>) -> Self {
        Self {
            config,
            identifier_index,
            cancel_token: CancellationToken::new(),
        }
    }

    /// 启动后台任务
    pub fn spawn(self) -> SweeperHandle {
        let cancel_token = self.cancel_token.clone();
        let join_handle = tokio::spawn(self.run());
        SweeperHandle {
            cancel_token,
            join_handle,
        }
    }

    async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            "Identifier sweeper started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = self.identifier_index.sweep();
                    tracing::info!(
                        removed = removed,
                        remaining = self.identifier_index.len(),
                        "Identifier index swept"
                    );
                }
            }
        }

        tracing::info!("Identifier sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryIdentifierIndex;

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        // ttl 为 0，记录后立即过期
        let index = Arc::new(InMemoryIdentifierIndex::new(chrono::Duration::zero()));
        let fp = index.observe("Hello");
        assert!(index.resolve(&fp).is_some());

        let handle = IdentifierSweeper::new(
            SweeperConfig {
                interval: Duration::from_millis(10),
            },
            index.clone(),
        )
        .spawn();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(index.resolve(&fp).is_none());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_promptly() {
        let index = Arc::new(InMemoryIdentifierIndex::new(chrono::Duration::seconds(60)));
        let handle = IdentifierSweeper::new(SweeperConfig::default(), index).spawn();

        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("sweeper should stop on cancel");
    }
}
