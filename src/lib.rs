//! Saybot - 内联查询文本转语音服务
//!
//! 架构设计: CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - TextFingerprint: 规范化文本的 MD5 指纹
//! - AudioFormat: 合成输出格式
//!
//! 应用层 (application/):
//! - Ports: 端口定义（IdentifierIndex, AudioCache, TtsEngine）
//! - Commands: observe（签发标识符）
//! - Queries: resolve（解析请求）、deliver（缓存命中或合成并分流持久化）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: /audio 与辅助 API
//! - Memory: IdentifierIndex 内存实现
//! - Worker: 过期标识符清扫任务
//! - Adapters: TTS Client, 文件音频缓存

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
