//! Durable user storage behind a repository trait

pub mod memory;
pub mod user_repo;

pub use memory::InMemoryUserRepository;
pub use user_repo::PgUserRepository;

use crate::{
    error::AppError,
    models::user::{NewUser, User},
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Insert a new user, failing with `EmailTaken`/`PhoneTaken` on the
    /// corresponding unique constraint
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;
}
