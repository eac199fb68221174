//! Bearer-token extraction and the resolve-on-every-request middleware

use crate::{error::AppError, middleware::AppState, models::user::User};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authentication context attached to request extensions.
///
/// Carries the raw token alongside the freshly-resolved identity so that
/// logout can revoke the exact token that was presented.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::TokenInvalid)
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.to_string()))
        .ok_or(AppError::TokenInvalid)
}

/// Authentication middleware for protected routes.
///
/// Resolves the token through the orchestrator on every request (signature,
/// revocation, session record, fresh identity lookup) so that logout and
/// deactivation take effect immediately.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let user = state.auth_service.resolve(&token).await?;

    req.extensions_mut().insert(AuthContext { user, token });

    Ok(next.run(req).await)
}
