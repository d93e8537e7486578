//! Data Transfer Objects

use serde::Serialize;

use crate::application::DeliveryStatsSnapshot;

/// 统一 API 响应格式（JSON 接口）
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 统计信息
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// 标识符索引中的条目数（含已过期未清扫的）
    pub identifiers: usize,
    pub delivery: DeliveryStatsSnapshot,
}
