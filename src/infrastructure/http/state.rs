//! Application State
//!
//! 所有 Command/Query Handlers 的应用状态，由服务入口装配一次后共享

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ObserveTextHandler,
    // Query handlers
    DeliverAudioHandler, DeliveryConfig, ResolveAudioHandler,
    // Ports
    ApplicationError, AudioCachePort, IdentifierIndexPort, TtsEnginePort,
};

/// 装配参数
#[derive(Debug, Clone)]
pub struct AppStateConfig {
    /// 对外 URL 前缀，用于生成 `/audio` 链接
    pub public_base_url: String,
    /// 文本最大长度（UTF-8 字节）
    pub max_length: usize,
    pub delivery: DeliveryConfig,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub identifier_index: Arc<dyn IdentifierIndexPort>,
    pub tts_engine: Arc<dyn TtsEnginePort>,

    // ========== Command Handlers ==========
    pub observe_text_handler: ObserveTextHandler,

    // ========== Query Handlers ==========
    pub resolve_audio_handler: ResolveAudioHandler,
    pub deliver_audio_handler: DeliverAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        identifier_index: Arc<dyn IdentifierIndexPort>,
        audio_cache: Arc<dyn AudioCachePort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        config: AppStateConfig,
    ) -> Result<Self, ApplicationError> {
        Ok(Self {
            identifier_index: identifier_index.clone(),
            tts_engine: tts_engine.clone(),

            observe_text_handler: ObserveTextHandler::new(
                identifier_index.clone(),
                &config.public_base_url,
                config.max_length,
            )?,

            resolve_audio_handler: ResolveAudioHandler::new(
                identifier_index,
                config.max_length,
            ),
            deliver_audio_handler: DeliverAudioHandler::new(
                audio_cache,
                tts_engine,
                config.delivery,
            ),
        })
    }
}
