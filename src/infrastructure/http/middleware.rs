//! HTTP Middleware
//!
//! 错误日志中间件：记录 4xx/5xx 以及携带错误类别头的 200 响应

use axum::{extract::Request, middleware::Next, response::Response};

use super::error::ERROR_KIND_HEADER;

/// HTTP 错误日志中间件
///
/// 音频接口的业务错误以 200 返回，通过错误类别头识别
/// 注意：错误详情（参数、文本）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    } else if let Some(kind) = response
        .headers()
        .get(ERROR_KIND_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        tracing::debug!(
            method = %method,
            path = %uri.path(),
            kind = %kind,
            "Request answered with error body"
        );
    }

    response
}
