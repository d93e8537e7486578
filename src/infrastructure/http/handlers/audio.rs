//! Audio Handler
//!
//! `GET /audio?text=<base64>` 或 `GET /audio?telegram=<identifier>`

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::{AudioOrigin, AudioRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 音频来源响应头（cache | synthesis）
pub const AUDIO_SOURCE_HEADER: &str = "x-audio-source";

pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Query(req): Query<AudioRequest>,
) -> Result<Response, ApiError> {
    let resolved = state
        .resolve_audio_handler
        .handle(&req)
        .map_err(|e| ApiError::new(e, offending_parameter(&req)))?;

    let text = resolved.text.clone();
    let delivery = state
        .deliver_audio_handler
        .handle(resolved)
        .await
        .map_err(|e| ApiError::new(e, text))?;

    let source = match delivery.origin {
        AudioOrigin::Cache => "cache",
        AudioOrigin::Synthesis => "synthesis",
    };

    let mut response = Body::from_stream(delivery.stream).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(delivery.content_type),
    );
    if let Some(size_bytes) = delivery.size_bytes {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size_bytes));
    }
    headers.insert(AUDIO_SOURCE_HEADER, HeaderValue::from_static(source));

    Ok(response)
}

fn offending_parameter(req: &AudioRequest) -> String {
    match (&req.text, &req.telegram) {
        (Some(text), _) if !text.is_empty() => format!("text={}", text),
        (_, Some(telegram)) if !telegram.is_empty() => format!("telegram={}", telegram),
        _ => String::new(),
    }
}
