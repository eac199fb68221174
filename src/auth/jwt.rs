//! JWT token generation and validation

use crate::{config::AppConfig, error::AppError, models::user::User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User ID
    pub user_id: Uuid,

    /// Email at issuance time
    pub email: String,

    /// Role at issuance time
    pub role: String,

    /// Issued at (seconds since epoch)
    pub iat: i64,

    /// Expiration (seconds since epoch)
    pub exp: i64,

    /// Correlation ID of the request that issued the token
    pub correlation_id: String,
}

/// JWT codec with a fixed, explicitly-configured signing algorithm.
///
/// The verifier never trusts the algorithm a token declares for itself.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_exp_secs: i64,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is long enough for HMAC signing
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let algorithm = match config.security.jwt_algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AppError::Config(format!("Unsupported JWT algorithm: {}", other)))
            }
        };

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            token_exp_secs: config.security.token_exp_hours as i64 * 3600,
        })
    }

    /// Issue a signed access token bound to `user`
    pub fn issue(&self, user: &User, correlation_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_exp_secs);

        let claims = TokenClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            correlation_id: correlation_id.to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Validate and decode a token.
    ///
    /// Fails closed: any parse error, signature mismatch, algorithm mismatch
    /// or expired token collapses to `TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        Ok(decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::TokenInvalid
            })?
            .claims)
    }

    /// Configured token lifetime, also used as the session and revocation TTL
    pub fn token_lifetime(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.token_exp_secs as u64)
    }
}
