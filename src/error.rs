//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("User with this phone number already exists")]
    PhoneTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Session store unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmailTaken | AppError::PhoneTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取稳定的机器可读错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmailTaken => "EMAIL_TAKEN",
            AppError::PhoneTaken => "PHONE_TAKEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CacheUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    ///
    /// InvalidCredentials 与 TokenInvalid 刻意不区分失败原因。
    pub fn user_message(&self) -> String {
        match self {
            AppError::EmailTaken => "User with this email already exists".to_string(),
            AppError::PhoneTaken => "User with this phone number already exists".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::TokenInvalid => "Invalid or expired token".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("Resource not found: {}", msg),
            AppError::CacheUnavailable(_) => "Service temporarily unavailable".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    // 便捷方法
    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: String,
}

/// 响应扩展中携带的错误元数据
///
/// IntoResponse 阶段看不到请求的关联 ID,由请求追踪中间件据此
/// 回填 correlation_id 后重建错误响应体。
#[derive(Debug, Clone)]
pub struct ErrorMeta {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.user_message();

        // 记录错误日志(关联 ID 由 http_request span 携带)
        tracing::error!(
            code,
            status = status.as_u16(),
            message = %self,
            "Application error"
        );

        let mut response = (
            status,
            Json(ErrorResponse {
                error: ErrorDetail {
                    code,
                    message: message.clone(),
                    correlation_id: String::new(),
                },
            }),
        )
            .into_response();

        response.extensions_mut().insert(ErrorMeta { code, message });

        response
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从请求体验证错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
