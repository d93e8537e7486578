//! HTTP Routes
//!
//! API Endpoints:
//! - /audio          GET   获取音频（?text=<base64> 或 ?telegram=<identifier>）
//! - /api/observe    POST  登记查询文本，返回标识符和音频链接
//! - /api/ping       GET   健康检查
//! - /api/stats      GET   索引与缓存统计

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/audio", get(handlers::get_audio))
        .nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/observe", post(handlers::observe))
        .route("/stats", get(handlers::stats))
}
