//! Stats Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, StatsResponse};
use crate::infrastructure::http::state::AppState;

/// 索引大小与投递计数
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsResponse>> {
    Json(ApiResponse::success(StatsResponse {
        identifiers: state.identifier_index.len(),
        delivery: state.deliver_audio_handler.stats(),
    }))
}
