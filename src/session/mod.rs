//! Session-of-record storage.
//!
//! The store is the authority on whether a signed token is still backed by a
//! live login. One record per user, overwritten on every login; a separate
//! revocation set force-expires individual tokens before their natural
//! expiry. Backends implement [`SessionStore`]: Redis in production, an
//! in-memory map for tests and local development.

pub mod memory;
pub mod redis;

pub use memory::InMemorySessionStore;
pub use redis::RedisSessionStore;

use crate::{error::AppError, models::auth::SessionRecord};
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store the session record for `user_id`, replacing any existing one
    async fn put_session(
        &self,
        user_id: Uuid,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), AppError>;

    /// Fetch the current session record for `user_id`
    async fn get_session(&self, user_id: Uuid) -> Result<Option<SessionRecord>, AppError>;

    /// Delete the session record for `user_id` (no-op if absent)
    async fn delete_session(&self, user_id: Uuid) -> Result<(), AppError>;

    /// Mark a token unusable until its natural expiry
    async fn revoke_token(&self, token: &str, ttl: Duration) -> Result<(), AppError>;

    /// Whether a token has been revoked
    async fn is_revoked(&self, token: &str) -> Result<bool, AppError>;

    /// Readiness probe against the backing store
    async fn ping(&self) -> Result<(), AppError>;
}
