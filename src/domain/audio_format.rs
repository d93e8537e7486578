//! Audio Format - 合成音频格式

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unsupported audio format: {0}")]
pub struct UnsupportedFormat(pub String);

/// 音频输出格式
///
/// 同时决定合成服务的输出格式、缓存文件后缀和响应 Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MP3 格式 - 通用兼容
    #[default]
    Mp3,
    /// Ogg Vorbis
    OggVorbis,
    /// 原始 PCM
    Pcm,
}

impl AudioFormat {
    /// 缓存文件后缀
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggVorbis => "ogg",
            Self::Pcm => "pcm",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::OggVorbis => "audio/ogg",
            Self::Pcm => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Mp3 => write!(f, "mp3"),
            AudioFormat::OggVorbis => write!(f, "ogg_vorbis"),
            AudioFormat::Pcm => write!(f, "pcm"),
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "ogg" | "ogg_vorbis" => Ok(AudioFormat::OggVorbis),
            "pcm" => Ok(AudioFormat::Pcm),
            _ => Err(UnsupportedFormat(s.to_string())),
        }
    }
}
