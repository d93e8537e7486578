//! Audio Queries - 音频请求
//!
//! `/audio` 请求的输入、解析结果和输出

use serde::Deserialize;

use crate::application::ports::AudioStream;
use crate::domain::TextFingerprint;

/// 音频请求参数
///
/// - `text`: base64 编码的原文
/// - `telegram`: 之前由 observe 签发的标识符
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// 文本来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Literal,
    Identifier,
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestSource::Literal => write!(f, "literal"),
            RequestSource::Identifier => write!(f, "identifier"),
        }
    }
}

/// 解析后的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub text: String,
    pub source: RequestSource,
}

/// 音频来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOrigin {
    /// 缓存命中
    Cache,
    /// 本次请求调用了合成服务
    Synthesis,
}

impl std::fmt::Display for AudioOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioOrigin::Cache => write!(f, "cache"),
            AudioOrigin::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// 音频响应
pub struct AudioDelivery {
    pub fingerprint: TextFingerprint,
    pub origin: AudioOrigin,
    pub content_type: &'static str,
    /// 缓存命中时已知大小
    pub size_bytes: Option<u64>,
    pub stream: AudioStream,
}
