//! Account lifecycle orchestrator: register, login, logout, resolve.
//!
//! Credential failures deliberately collapse to one `InvalidCredentials`
//! so that responses never reveal whether an email is registered. Token
//! resolution fails closed: if the session store cannot answer, the token
//! is rejected rather than trusted on its signature alone.

use crate::{
    auth::{JwtService, PasswordHasher},
    error::AppError,
    models::{
        auth::{LoginRequest, RegisterRequest, SessionRecord, TokenResponse},
        user::{NewUser, User, UserResponse},
    },
    repository::UserRepository,
    session::SessionStore,
};
use chrono::Utc;
use std::sync::Arc;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    jwt: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        jwt: Arc<JwtService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt,
            hasher,
        }
    }

    /// Register a new account and log it in atomically
    pub async fn register(
        &self,
        request: RegisterRequest,
        correlation_id: &str,
    ) -> Result<TokenResponse, AppError> {
        // Pre-checks give precise conflict errors; the database constraints
        // remain the authority if a concurrent insert slips through.
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }
        if self.users.find_by_phone(&request.phone).await?.is_some() {
            return Err(AppError::PhoneTaken);
        }

        // bcrypt is CPU-bound; keep it off the async workers
        let hasher = self.hasher;
        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

        let user = self
            .users
            .create(NewUser {
                email: request.email,
                phone: request.phone,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                role: request.role,
            })
            .await?;

        let token = self.jwt.issue(&user, correlation_id)?;
        self.record_session(&user, &token).await;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(self.token_response(token, user))
    }

    /// Authenticate an existing account and issue a fresh token.
    ///
    /// A successful login overwrites the user's session record, which
    /// supersedes any token issued by an earlier login.
    pub async fn login(
        &self,
        request: LoginRequest,
        correlation_id: &str,
    ) -> Result<TokenResponse, AppError> {
        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => return Err(AppError::InvalidCredentials),
        };

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Login attempt on deactivated account");
            return Err(AppError::InvalidCredentials);
        }

        let hasher = self.hasher;
        let password = request.password;
        let digest = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?;

        if !verified {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.issue(&user, correlation_id)?;
        self.record_session(&user, &token).await;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(self.token_response(token, user))
    }

    /// Terminate the session behind `token` and revoke the token itself
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let user = self.resolve(token).await?;

        self.sessions.delete_session(user.id).await?;
        self.sessions
            .revoke_token(token, self.jwt.token_lifetime())
            .await?;

        tracing::info!(user_id = %user.id, "User logged out");

        Ok(())
    }

    /// Resolve a presented token to a live user, or fail closed.
    ///
    /// Checked in order: signature and expiry, revocation, the session of
    /// record (which must name this exact token), then a fresh identity
    /// lookup so deactivation takes effect immediately.
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let claims = self.jwt.verify(token)?;

        match self.sessions.is_revoked(token).await {
            Ok(false) => {}
            Ok(true) => return Err(AppError::TokenInvalid),
            Err(e) => {
                tracing::warn!("Revocation check unavailable, rejecting token: {}", e);
                return Err(AppError::TokenInvalid);
            }
        }

        let record = match self.sessions.get_session(claims.user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(AppError::TokenInvalid),
            Err(e) => {
                tracing::warn!("Session lookup unavailable, rejecting token: {}", e);
                return Err(AppError::TokenInvalid);
            }
        };

        // A newer login replaced this token
        if record.token != token {
            return Err(AppError::TokenInvalid);
        }

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| {
                tracing::warn!("Identity lookup failed, rejecting token: {}", e);
                AppError::TokenInvalid
            })?
            .ok_or(AppError::TokenInvalid)?;

        if !user.is_active {
            return Err(AppError::TokenInvalid);
        }

        Ok(user)
    }

    /// Write the session of record; a store outage downgrades the session to
    /// best-effort rather than failing the login, and resolve fails closed
    /// until the store recovers.
    async fn record_session(&self, user: &User, token: &str) {
        let record = SessionRecord {
            token: token.to_string(),
            user: UserResponse::from(user.clone()),
            created_at: Utc::now(),
        };

        if let Err(e) = self
            .sessions
            .put_session(user.id, &record, self.jwt.token_lifetime())
            .await
        {
            tracing::warn!(user_id = %user.id, "Failed to record session: {}", e);
        }
    }

    fn token_response(&self, access_token: String, user: User) -> TokenResponse {
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt.token_lifetime().as_secs(),
            user: UserResponse::from(user),
        }
    }
}
