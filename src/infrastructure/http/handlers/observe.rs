//! Observe Handler
//!
//! 供内联查询组件调用：登记查询文本并返回嵌入结果卡片的音频链接

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ObserveTextCommand, ObserveTextResponse};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// 登记查询文本
pub async fn observe(
    State(state): State<Arc<AppState>>,
    Json(command): Json<ObserveTextCommand>,
) -> Json<ApiResponse<ObserveTextResponse>> {
    Json(ApiResponse::success(
        state.observe_text_handler.handle(command),
    ))
}
