//! In-Memory Identifier Index Implementation

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{CacheEntry, IdentifierIndexPort};
use crate::domain::TextFingerprint;

/// 内存标识符索引
///
/// 进程级生命周期，重启后清空。单次 map 访问由 DashMap 分片锁互斥。
pub struct InMemoryIdentifierIndex {
    entries: DashMap<TextFingerprint, CacheEntry>,
    ttl: Duration,
}

impl InMemoryIdentifierIndex {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 以指定时间记录文本
    ///
    /// 已过期但尚未被清理的条目会被刷新
    pub fn observe_at(&self, text: &str, now: DateTime<Utc>) -> TextFingerprint {
        let fingerprint = TextFingerprint::of(text);

        match self.entries.entry(fingerprint.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_expired_at(now) {
                    entry.insert(CacheEntry::issued_at(text, now, self.ttl));
                    tracing::debug!(fingerprint = %fingerprint, "Identifier refreshed");
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(CacheEntry::issued_at(text, now, self.ttl));
                tracing::debug!(fingerprint = %fingerprint, "Identifier issued");
            }
        }

        fingerprint
    }

    /// 删除在 `now` 时已过期的条目
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// 查看条目（测试与统计用）
    pub fn entry(&self, fingerprint: &TextFingerprint) -> Option<CacheEntry> {
        self.entries.get(fingerprint).map(|e| e.clone())
    }
}

impl IdentifierIndexPort for InMemoryIdentifierIndex {
    fn observe(&self, text: &str) -> TextFingerprint {
        self.observe_at(text, Utc::now())
    }

    fn resolve(&self, fingerprint: &TextFingerprint) -> Option<String> {
        self.entries.get(fingerprint).map(|e| e.text.clone())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
