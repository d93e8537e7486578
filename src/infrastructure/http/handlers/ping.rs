//! Ping Handler
//!
//! 健康检查，同时探测合成服务是否可用

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tts_available: bool,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tts_available: state.tts_engine.health_check().await,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_app;
    use crate::infrastructure::adapters::FakeTtsClientConfig;
    use axum::{body::Body, body::to_bytes, http::Request};
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_ping() {
        let dir = tempdir().unwrap();
        let app = test_app(dir.path(), FakeTtsClientConfig::default(), 64);

        let response = app
            .router
            .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["tts_available"], true);
    }
}
