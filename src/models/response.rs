//! 通用 API 响应模型
//! 
//! 定义统一的 API 响应格式

use serde::{Deserialize, Serialize};
use chrono::Utc;
use chrono_tz::America::Sao_Paulo;

/// 获取门户所在时区（圣保罗）的当前时间
fn get_portal_time() -> chrono::DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&Sao_Paulo)
}

/// 统一 API 响应结构
/// 
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - timestamp: 响应时间戳（圣保罗时间）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    /// 
    /// # 参数
    /// - data: 响应数据
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: get_portal_time().to_rfc3339(),
        }
    }

    /// 创建错误响应
    /// 
    /// # 参数
    /// - message: 错误信息
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: get_portal_time().to_rfc3339(),
        }
    }
}

impl ApiResponse<super::Status> {
    /// 写操作的响应：业务失败也带回 Status，success 跟随 status_code
    pub fn from_status(status: super::Status) -> Self {
        Self {
            success: status.is_ok(),
            message: status.description.clone(),
            data: Some(status),
            timestamp: get_portal_time().to_rfc3339(),
        }
    }
}
