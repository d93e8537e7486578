//! 应用层错误定义
//!
//! 音频请求的错误分类，所有错误对当前请求都是终态，不做自动重试

use thiserror::Error;

use crate::application::ports::{CacheError, TtsError};

/// 应用层错误（装配阶段）
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

/// 音频请求错误
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// text 参数的 base64 解码失败（或解码结果不是 UTF-8）
    #[error("Base64 decode error: {0}")]
    DecodeError(String),

    /// text 与 telegram 参数都缺失
    #[error("Invalid request: missing text or telegram parameter")]
    MissingParameter,

    /// 标识符不在索引中
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// 文本长度超过上限
    #[error("Text too long: {len} > {max}")]
    TooLong { len: usize, max: usize },

    /// 合成服务失败
    #[error("Synthesize error: {0}")]
    SynthesisFailed(#[from] TtsError),

    /// 本地存储失败
    #[error(transparent)]
    Storage(#[from] CacheError),
}

impl DeliveryError {
    /// 返回给请求方的纯文本描述
    pub fn public_message(&self) -> &'static str {
        match self {
            DeliveryError::DecodeError(_) => "Base64 decode error",
            DeliveryError::MissingParameter => "Invalid request",
            DeliveryError::UnknownIdentifier(_) => "Unknown md5",
            DeliveryError::TooLong { .. } => "Too long",
            DeliveryError::SynthesisFailed(_) => "Synthesize error",
            DeliveryError::Storage(e) => e.public_message(),
        }
    }

    /// 是否为请求方的问题（而非服务端故障）
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            DeliveryError::SynthesisFailed(_) | DeliveryError::Storage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_public_messages() {
        assert_eq!(
            DeliveryError::DecodeError("bad".into()).public_message(),
            "Base64 decode error"
        );
        assert_eq!(DeliveryError::MissingParameter.public_message(), "Invalid request");
        assert_eq!(
            DeliveryError::UnknownIdentifier("x".into()).public_message(),
            "Unknown md5"
        );
        assert_eq!(
            DeliveryError::TooLong { len: 70, max: 64 }.public_message(),
            "Too long"
        );
        assert_eq!(
            DeliveryError::SynthesisFailed(TtsError::Timeout).public_message(),
            "Synthesize error"
        );
        let denied = || io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            DeliveryError::from(CacheError::CreateDir(denied())).public_message(),
            "Could not create cache directory"
        );
        assert_eq!(
            DeliveryError::from(CacheError::OpenWrite(denied())).public_message(),
            "Cannot open file (write)"
        );
        assert_eq!(
            DeliveryError::from(CacheError::OpenRead(denied())).public_message(),
            "Cannot open file (read)"
        );
    }

    #[test]
    fn test_rejection_classification() {
        assert!(DeliveryError::MissingParameter.is_rejection());
        assert!(!DeliveryError::SynthesisFailed(TtsError::Timeout).is_rejection());
    }
}
