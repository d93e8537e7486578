//! Identifier Index Port - 短标识符索引
//!
//! 内联查询结果的 URL 有长度限制，因此用指纹代替原文，
//! 音频请求到达时再通过本索引取回原文。

use chrono::{DateTime, Duration, Utc};

use crate::domain::TextFingerprint;

/// 索引条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// 原始（未规范化）文本
    pub text: String,
    pub issued_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self::issued_at(text, Utc::now(), ttl)
    }

    pub fn issued_at(text: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            issued_at,
            ttl,
        }
    }

    /// expired = now >= issued_at + ttl
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at + self.ttl
    }
}

/// Identifier Index Port
///
/// 所有操作都不会失败；查不到是正常结果
pub trait IdentifierIndexPort: Send + Sync {
    /// 记录文本并返回其指纹
    ///
    /// 已存在未过期条目时不做任何修改（不会重置 issued_at）
    fn observe(&self, text: &str) -> TextFingerprint;

    /// 取回原文
    ///
    /// 不检查过期，过期条目只由 sweep 清除
    fn resolve(&self, fingerprint: &TextFingerprint) -> Option<String>;

    /// 删除所有已过期条目，返回删除数量
    fn sweep(&self) -> usize;

    /// 当前条目数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry_boundary() {
        let issued = Utc::now();
        let entry = CacheEntry::issued_at("hello", issued, Duration::seconds(60));
        assert!(!entry.is_expired_at(issued));
        assert!(!entry.is_expired_at(issued + Duration::seconds(59)));
        assert!(entry.is_expired_at(issued + Duration::seconds(60)));
        assert!(entry.is_expired_at(issued + Duration::seconds(61)));
    }
}
