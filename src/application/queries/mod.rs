//! 应用层 - 查询（读操作）
//!
//! 音频请求的解析与投递

mod audio_queries;

pub mod handlers;

pub use audio_queries::*;
