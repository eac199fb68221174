//! 认证相关的 HTTP 处理器

use crate::{
    auth::{extract_token, middleware::AuthContext, PasswordHasher},
    error::AppError,
    middleware::{AppState, CorrelationId},
    models::auth::*,
    models::user::UserResponse,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(correlation_id): Extension<CorrelationId>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    PasswordHasher::validate_strength(
        &req.password,
        state.config.security.password_min_length,
    )?;

    let response = state.auth_service.register(req, &correlation_id.0).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(correlation_id): Extension<CorrelationId>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let response = state.auth_service.login(req, &correlation_id.0).await?;

    Ok(Json(response))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&auth_context.token).await?;

    Ok(Json(json!({"message": "Logged out"})))
}

/// 校验令牌
/// 供其他服务验证 Bearer 令牌并获取身份摘要
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<VerifyTokenResponse>, AppError> {
    let token = extract_token(&headers)?;

    let user = state.auth_service.resolve(&token).await?;

    Ok(Json(VerifyTokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// 当前用户信息
pub async fn me(auth_context: AuthContext) -> Json<UserResponse> {
    Json(UserResponse::from(auth_context.user))
}
