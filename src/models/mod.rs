//! Domain models and request/response types

pub mod auth;
pub mod user;

pub use auth::{
    LoginRequest, RegisterRequest, SessionRecord, TokenResponse, VerifyTokenResponse,
};
pub use user::{NewUser, User, UserResponse, UserRole};
