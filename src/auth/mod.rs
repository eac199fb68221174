//! Authentication building blocks: hashing, token codec, extraction middleware

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{JwtService, TokenClaims};
pub use middleware::{auth_middleware, extract_token, AuthContext};
pub use password::PasswordHasher;
