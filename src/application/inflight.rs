//! In-Flight Registry - 按指纹的单飞控制
//!
//! 同一指纹的并发未命中只允许一个请求（leader）调用合成服务，
//! 其余请求（follower）等待 leader 的持久化结束后重新查缓存。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::TextFingerprint;

/// 占位认领结果
pub enum Claim {
    /// 获得合成权，guard 释放时通知所有等待者
    Leader(InFlightGuard),
    /// 已有请求在合成，等待其结束
    Follower(InFlightWaiter),
}

/// 进行中的合成占位
pub struct InFlightGuard {
    registry: Arc<DashMap<TextFingerprint, watch::Receiver<()>>>,
    fingerprint: TextFingerprint,
    _signal: watch::Sender<()>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // 先移除占位，随后 _signal 被丢弃，等待者才会被唤醒
        self.registry.remove(&self.fingerprint);
    }
}

pub struct InFlightWaiter {
    signal: watch::Receiver<()>,
}

impl InFlightWaiter {
    /// 等待 leader 释放占位
    pub async fn wait(mut self) {
        while self.signal.changed().await.is_ok() {}
    }
}

/// 指纹 -> 进行中合成
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<DashMap<TextFingerprint, watch::Receiver<()>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, fingerprint: &TextFingerprint) -> Claim {
        match self.inner.entry(fingerprint.clone()) {
            Entry::Occupied(entry) => Claim::Follower(InFlightWaiter {
                signal: entry.get().clone(),
            }),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(());
                entry.insert(rx);
                Claim::Leader(InFlightGuard {
                    registry: self.inner.clone(),
                    fingerprint: fingerprint.clone(),
                    _signal: tx,
                })
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_claim_leads() {
        let registry = InFlightRegistry::new();
        let fp = TextFingerprint::of("hello");

        let guard = match registry.claim(&fp) {
            Claim::Leader(guard) => guard,
            Claim::Follower(_) => panic!("first claim must lead"),
        };
        assert!(matches!(registry.claim(&fp), Claim::Follower(_)));
        assert!(matches!(
            registry.claim(&TextFingerprint::of("other")),
            Claim::Leader(_)
        ));

        drop(guard);
        assert!(registry.inner.is_empty());
        assert!(matches!(registry.claim(&fp), Claim::Leader(_)));
    }

    #[tokio::test]
    async fn test_follower_wakes_when_leader_releases() {
        let registry = InFlightRegistry::new();
        let fp = TextFingerprint::of("hello");

        let Claim::Leader(guard) = registry.claim(&fp) else {
            panic!("first claim must lead");
        };
        let Claim::Follower(waiter) = registry.claim(&fp) else {
            panic!("second claim must follow");
        };

        let wait = tokio::spawn(waiter.wait());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!wait.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .expect("follower should wake")
            .unwrap();
        assert!(registry.inner.is_empty());
    }
}
