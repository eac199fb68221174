//! Password hashing and verification using bcrypt

use crate::error::AppError;

/// Characters accepted as the required special character
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Password hasher with a configurable cost factor.
///
/// The cost (and the per-call random salt) is embedded in the digest, so the
/// cost can be raised later without breaking digests hashed at the old cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create hasher with an explicit cost factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            AppError::Internal(format!("Failed to hash password: {}", e))
        })
    }

    /// Verify a password against a digest.
    ///
    /// Returns `false` for a mismatch and for any malformed digest; never
    /// compares digests with plain equality.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        bcrypt::verify(password, digest).unwrap_or(false)
    }

    /// Validate password strength at the transport boundary
    pub fn validate_strength(password: &str, min_length: usize) -> Result<(), AppError> {
        if password.len() < min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                min_length
            )));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
