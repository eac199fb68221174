//! Redis 会话存储
//!
//! 会话记录以 JSON 形式写入 `session:<user_id>`,吊销标记写入
//! `blacklist:<token>`,两者均带 TTL,由 Redis 自行过期。

use super::SessionStore;
use crate::{
    config::RedisConfig,
    error::AppError,
    models::auth::SessionRecord,
};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use secrecy::ExposeSecret;
use std::time::Duration;
use uuid::Uuid;

/// Redis-backed session store.
///
/// `ConnectionManager` multiplexes a single connection and reconnects on
/// failure, so cloning the store is cheap.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    session_prefix: String,
    blacklist_prefix: String,
}

impl RedisSessionStore {
    /// Connect to Redis with a bounded connect timeout
    pub async fn connect(config: &RedisConfig) -> Result<Self, AppError> {
        let client = redis::Client::open(config.url.expose_secret().as_str())
            .map_err(|e| AppError::Config(format!("Invalid Redis URL: {}", e)))?;

        let conn = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            client.get_connection_manager(),
        )
        .await
        .map_err(|_| {
            AppError::CacheUnavailable(format!(
                "Redis connection timed out after {}s",
                config.connect_timeout_secs
            ))
        })?
        .map_err(|e| AppError::CacheUnavailable(format!("Redis connection failed: {}", e)))?;

        tracing::info!("Redis connection established");

        Ok(Self {
            conn,
            session_prefix: config.session_prefix.clone(),
            blacklist_prefix: config.blacklist_prefix.clone(),
        })
    }

    fn session_key(&self, user_id: Uuid) -> String {
        format!("{}{}", self.session_prefix, user_id)
    }

    fn blacklist_key(&self, token: &str) -> String {
        format!("{}{}", self.blacklist_prefix, token)
    }
}

fn cache_err(op: &str, e: redis::RedisError) -> AppError {
    tracing::error!(operation = op, "Redis operation failed: {:?}", e);
    AppError::CacheUnavailable(format!("Redis {} failed: {}", op, e))
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put_session(
        &self,
        user_id: Uuid,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.session_key(user_id), payload, ttl.as_secs())
            .await
            .map_err(|e| cache_err("SETEX", e))?;

        Ok(())
    }

    async fn get_session(&self, user_id: Uuid) -> Result<Option<SessionRecord>, AppError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(self.session_key(user_id))
            .await
            .map_err(|e| cache_err("GET", e))?;

        match payload {
            Some(json) => match serde_json::from_str(&json) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    // Unreadable record is treated as absent; the caller
                    // fails closed and the user logs in again.
                    tracing::warn!(%user_id, "Discarding unreadable session record: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.session_key(user_id))
            .await
            .map_err(|e| cache_err("DEL", e))?;

        Ok(())
    }

    async fn revoke_token(&self, token: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.blacklist_key(token), "revoked", ttl.as_secs())
            .await
            .map_err(|e| cache_err("SETEX", e))?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        conn.exists(self.blacklist_key(token))
            .await
            .map_err(|e| cache_err("EXISTS", e))
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| cache_err("PING", e))?;

        Ok(())
    }
}
