//! In-memory session store for tests and local development

use super::SessionStore;
use crate::{error::AppError, models::auth::SessionRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Process-local [`SessionStore`] backed by concurrent maps.
///
/// Expiry is enforced lazily on read, which is enough for the single-process
/// use cases this backend exists for.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, (SessionRecord, Instant)>,
    revoked: DashMap<String, Instant>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put_session(
        &self,
        user_id: Uuid,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), AppError> {
        self.sessions
            .insert(user_id, (record.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn get_session(&self, user_id: Uuid) -> Result<Option<SessionRecord>, AppError> {
        if let Some(entry) = self.sessions.get(&user_id) {
            let (record, expires_at) = entry.value();
            if Instant::now() < *expires_at {
                return Ok(Some(record.clone()));
            }
        }

        // Expired entries are removed on the read path
        self.sessions
            .remove_if(&user_id, |_, (_, expires_at)| Instant::now() >= *expires_at);
        Ok(None)
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<(), AppError> {
        self.sessions.remove(&user_id);
        Ok(())
    }

    async fn revoke_token(&self, token: &str, ttl: Duration) -> Result<(), AppError> {
        self.revoked
            .insert(token.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        if let Some(entry) = self.revoked.get(token) {
            if Instant::now() < *entry.value() {
                return Ok(true);
            }
        }

        self.revoked
            .remove_if(token, |_, expires_at| Instant::now() >= *expires_at);
        Ok(false)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
