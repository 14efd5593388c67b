use crate::error::{AppError, AuthError};

/// One-way salted password hashing with a tunable bcrypt work factor.
///
/// The cost is baked into each digest, so raising it for new accounts leaves
/// every stored digest verifiable. Plaintext passwords are never logged.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AppError::InternalError(format!("password hashing failed: {}", e)))
    }

    /// `Ok(false)` for a well-formed non-match; an error only when the stored
    /// digest itself is structurally corrupt.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError> {
        bcrypt::verify(plaintext, digest).map_err(|_| AuthError::InvalidDigest)
    }
}
