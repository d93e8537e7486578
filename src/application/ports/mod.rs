//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_cache;
mod identifier_index;
mod tts_engine;

pub use audio_cache::{ArtifactWriter, AudioArtifact, AudioCachePort, AudioStream, CacheError};
pub use identifier_index::{CacheEntry, IdentifierIndexPort};
pub use tts_engine::{SynthesisRequest, TtsEnginePort, TtsError};
