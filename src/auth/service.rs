use std::sync::Arc;

use chrono::Utc;
use tokio::task;
use tracing::info;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::db::models::{Account, NewAccount};
use crate::db::store::UserStore;
use crate::error::{AppError, StoreError};

/// Orchestrates credential checks over the store, the password hasher, and
/// the token service. Holds no per-request state; bcrypt work runs on the
/// blocking pool so it never stalls the request reactor.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Creates an account with both timestamps set to the registration
    /// instant. A taken username fails with the store's duplicate error.
    /// The returned record carries the digest, never the plaintext.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<Account, AppError> {
        let password_hash = self.hash_blocking(password).await?;
        let now = Utc::now();

        let account = self
            .store
            .insert(NewAccount {
                username: username.to_string(),
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone: phone.to_string(),
                joined_at: now,
                last_login_at: now,
            })
            .await?;

        info!("registered account for {}", account.username);
        Ok(account)
    }

    /// Is this username/password pair valid? An unknown username propagates
    /// as the store's not-found error rather than a false verdict.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let account = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(StoreError::NotFound)?;

        let hasher = self.hasher;
        let password = password.to_string();
        let digest = account.password_hash;
        let verdict = task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::InternalError(format!("verification task failed: {}", e)))??;

        Ok(verdict)
    }

    /// Advances `last_login_at` for the account to the current instant.
    pub async fn record_login(&self, username: &str) -> Result<Account, AppError> {
        Ok(self.store.touch_last_login(username).await?)
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, AppError> {
        self.tokens.issue(subject)
    }

    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        Ok(self.tokens.verify(token)?)
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::InternalError(format!("hashing task failed: {}", e)))?
    }
}
