//! Resolve Handler - 音频请求解析
//!
//! 将 text / telegram 参数解析为最终要合成的文本，并统一执行长度限制。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

use crate::application::error::DeliveryError;
use crate::application::ports::IdentifierIndexPort;
use crate::application::queries::audio_queries::{AudioRequest, RequestSource, ResolvedRequest};
use crate::domain::TextFingerprint;

/// ResolveAudio Handler
///
/// 两个参数同时存在时 text 优先
pub struct ResolveAudioHandler {
    identifier_index: Arc<dyn IdentifierIndexPort>,
    max_length: usize,
}

impl ResolveAudioHandler {
    pub fn new(identifier_index: Arc<dyn IdentifierIndexPort>, max_length: usize) -> Self {
        Self {
            identifier_index,
            max_length,
        }
    }

    pub fn handle(&self, request: &AudioRequest) -> Result<ResolvedRequest, DeliveryError> {
        let resolved = if let Some(encoded) = non_empty(&request.text) {
            ResolvedRequest {
                text: decode_text(encoded)?,
                source: RequestSource::Literal,
            }
        } else if let Some(identifier) = non_empty(&request.telegram) {
            ResolvedRequest {
                text: self.lookup(identifier)?,
                source: RequestSource::Identifier,
            }
        } else {
            return Err(DeliveryError::MissingParameter);
        };

        // 按 UTF-8 字节数计算
        let len = resolved.text.len();
        if len > self.max_length {
            return Err(DeliveryError::TooLong {
                len,
                max: self.max_length,
            });
        }

        Ok(resolved)
    }

    fn lookup(&self, identifier: &str) -> Result<String, DeliveryError> {
        TextFingerprint::parse(identifier)
            .and_then(|fp| self.identifier_index.resolve(&fp))
            .ok_or_else(|| DeliveryError::UnknownIdentifier(identifier.to_string()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn decode_text(encoded: &str) -> Result<String, DeliveryError> {
    // 查询串里未转义的 '+' 会被解码成空格，base64 字母表不含空格，直接还原
    let encoded = encoded.replace(' ', "+");
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| DeliveryError::DecodeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DeliveryError::DecodeError(e.to_string()))
}
