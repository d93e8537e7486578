//! Observe Commands - 记录内联查询文本

use serde::{Deserialize, Serialize};

use crate::domain::TextFingerprint;

/// 记录一次查询文本
#[derive(Debug, Clone, Deserialize)]
pub struct ObserveTextCommand {
    pub text: String,
}

/// 记录结果
#[derive(Debug, Clone, Serialize)]
pub struct ObserveTextResponse {
    /// 短标识符（文本指纹）
    pub identifier: TextFingerprint,
    /// 规范化文本是否在长度限制内；为 false 时调用方应返回空结果
    pub accepted: bool,
    /// `<base>/audio?telegram=<identifier>`
    pub audio_url: String,
    /// `<base>/audio?text=<base64>`
    pub text_url: String,
}
