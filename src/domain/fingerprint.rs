//! Text Fingerprint - 文本指纹
//!
//! 指纹 = md5(normalize(text)) 的 32 位十六进制小写表示，
//! 同时用作 ContentCache 文件名和 IdentifierIndex 的 key。

use serde::{Deserialize, Serialize};

/// 规范化文本：去掉首尾空白并转小写
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 文本指纹
///
/// 不变量:
/// - 相同的规范化文本总是得到相同指纹
/// - 内容固定为 32 个十六进制小写字符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextFingerprint(String);

impl TextFingerprint {
    /// 指纹长度（十六进制字符数）
    pub const LEN: usize = 32;

    /// 计算文本指纹（内部先做规范化）
    pub fn of(text: &str) -> Self {
        let digest = md5::compute(normalize_text(text).as_bytes());
        Self(format!("{:x}", digest))
    }

    /// 解析外部传入的标识符
    ///
    /// 只接受 32 位十六进制字符串，其余一律返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TextFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
