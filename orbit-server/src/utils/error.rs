//! 统一错误处理
//!
//! 提供应用级错误类型和 JSON 错误响应：
//!
//! | 分类 | HTTP | 说明 |
//! |------|------|------|
//! | NotFound | 404 | 商品/订单不存在 |
//! | Validation | 400 | 表单验证失败 (逐字段反馈) |
//! | Invalid | 400 | 无效请求 (payload 不合法、前置状态不满足) |
//! | Provisioning | 500 | 开通失败 (订单已标记 failed) |
//! | Internal | 500 | 内部错误 (记录日志，不暴露细节) |
//!
//! 适配器"未配置"不是错误：启动时直接选择演示模式。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误枚举
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(validator::ValidationErrors),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", msg.clone(), None)
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone(), None),
            AppError::Provisioning(msg) => {
                tracing::error!(error = %msg, "Provisioning error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provisioning_error",
                    "Server provisioning failed".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// 处理器的 Result 类型别名
pub type AppResult<T> = std::result::Result<T, AppError>;
