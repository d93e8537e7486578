//! HTTP Error Handling
//!
//! 音频接口的错误一律返回 HTTP 200 + 纯文本描述，兼容已有的播放端

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::application::DeliveryError;

/// 错误类别响应头，供中间件和调用方区分失败类型
pub const ERROR_KIND_HEADER: &str = "x-saybot-error";

/// API 错误
///
/// `context` 对请求方的问题是引起问题的参数，对服务端故障是正在处理的文本
#[derive(Debug)]
pub struct ApiError {
    error: DeliveryError,
    context: String,
}

impl ApiError {
    pub fn new(error: DeliveryError, context: impl Into<String>) -> Self {
        Self {
            error,
            context: context.into(),
        }
    }

    /// 错误类别标识
    pub fn kind(&self) -> &'static str {
        match &self.error {
            DeliveryError::DecodeError(_) => "decode",
            DeliveryError::MissingParameter => "missing_parameter",
            DeliveryError::UnknownIdentifier(_) => "unknown_identifier",
            DeliveryError::TooLong { .. } => "too_long",
            DeliveryError::SynthesisFailed(_) => "synthesis",
            DeliveryError::Storage(_) => "storage",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if self.error.is_rejection() {
            tracing::warn!(kind = kind, parameter = %self.context, error = %self.error, "Audio request rejected");
        } else {
            tracing::error!(kind = kind, text = %self.context, error = %self.error, "Audio request failed");
        }

        let mut response = (StatusCode::OK, self.error.public_message()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(ERROR_KIND_HEADER, HeaderValue::from_static(kind));
        response
    }
}
