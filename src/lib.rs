pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod users;

use std::sync::Arc;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, AuthUser, PasswordHasher, TokenService};
pub use db::{MemoryUserStore, PgUserStore, UserStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn UserStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Connects the Postgres pool, applies migrations, and wires the auth
    /// service over the resulting store.
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::StoreError(error::StoreError::ConnectionError(e.to_string()))
            })?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::StoreError(error::StoreError::QueryError(e.to_string())))?;

        let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(Arc::new(pool)));
        Ok(Self::with_store(config, store))
    }

    /// Builds state over any store implementation; the test suites pass the
    /// in-memory store here.
    pub fn with_store(config: Settings, store: Arc<dyn UserStore>) -> Self {
        let auth = AuthService::new(
            store.clone(),
            PasswordHasher::new(config.auth.bcrypt_cost),
            TokenService::new(&config.auth.jwt_secret),
        );

        Self {
            config: Arc::new(config),
            store,
            auth: Arc::new(auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_clone() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::with_store(config, Arc::new(MemoryUserStore::new()));
        let cloned = state.clone();

        // Verify Arc references are shared
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.auth, &cloned.auth));
    }

    #[tokio::test]
    async fn test_app_state_wires_auth_over_store() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::with_store(config, Arc::new(MemoryUserStore::new()));

        state
            .auth
            .register("alice", "pw1", "A", "B", "555")
            .await
            .unwrap();

        // The service and the resource routes see the same records.
        let found = state.store.find_by_username("alice").await.unwrap();
        assert!(found.is_some());
    }
}
