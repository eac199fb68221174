//! In-memory user repository for tests

use super::UserRepository;
use crate::{
    error::AppError,
    models::user::{NewUser, User},
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// Process-local [`UserRepository`] that enforces the same email/phone
/// uniqueness the database constraints do.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a user's active flag, as an account-management action would
    pub fn set_active(&self, id: Uuid, is_active: bool) {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.is_active = is_active;
            user.updated_at = Utc::now();
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.phone == phone)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }
        if self.find_by_phone(&new_user.phone).await?.is_some() {
            return Err(AppError::PhoneTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            phone: new_user.phone,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role.as_str().to_string(),
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}
