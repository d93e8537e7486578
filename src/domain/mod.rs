//! Domain Layer - 领域层
//!
//! 纯值对象，不依赖任何基础设施:
//! - TextFingerprint: 规范化文本的摘要（缓存 key / 标识符）
//! - AudioFormat: 合成音频格式

mod audio_format;
mod fingerprint;

pub use audio_format::{AudioFormat, UnsupportedFormat};
pub use fingerprint::{normalize_text, TextFingerprint};
