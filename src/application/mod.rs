//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioCache、IdentifierIndex、TtsEngine）
//! - commands: CQRS 命令及处理器（observe）
//! - queries: CQRS 查询及处理器（resolve、deliver）
//! - tee / inflight: 投递流程使用的分流与单飞工具
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod inflight;
pub mod ports;
pub mod queries;
pub mod tee;

// Re-exports
pub use commands::{handlers::ObserveTextHandler, ObserveTextCommand, ObserveTextResponse};

pub use error::{ApplicationError, DeliveryError};

pub use ports::{
    // Audio cache
    ArtifactWriter,
    AudioArtifact,
    AudioCachePort,
    AudioStream,
    CacheError,
    // Identifier index
    CacheEntry,
    IdentifierIndexPort,
    // TTS engine
    SynthesisRequest,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    handlers::{
        DeliverAudioHandler, DeliveryConfig, DeliveryStats, DeliveryStatsSnapshot,
        ResolveAudioHandler,
    },
    AudioDelivery, AudioOrigin, AudioRequest, RequestSource, ResolvedRequest,
};
