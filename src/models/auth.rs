//! Authentication-related models

use super::user::{UserResponse, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 10, max = 20))]
    pub phone: String,
    pub role: UserRole,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Token response returned by register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64, // seconds until the access token expires
    pub user: UserResponse,
}

/// Identity summary returned by token verification, consumed by other
/// services that need to validate a bearer token without a full profile.
#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

/// The session-of-record stored in the session store, one per user.
///
/// `token` is the currently-valid signed token for this user; a newer login
/// overwrites the whole record, which is what invalidates the previous token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
}
