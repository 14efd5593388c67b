use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub iat: i64,    // Issued at
}

/// Issues and verifies stateless HS256 session tokens.
///
/// The signing secret is injected at construction so several signing
/// configurations can coexist (tests rely on this). Tokens carry no expiry
/// claim; once issued they verify indefinitely under the same secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Issued tokens have no exp claim; don't demand or check one.
        validation.required_spec_claims = Default::default();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: Utc::now().timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalError(format!("token signing failed: {}", e)))
    }

    /// Returns the subject the token was issued for. Bad signature, wrong
    /// key, and malformed structure all fail the same way.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims.sub)
    }
}
