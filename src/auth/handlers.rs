use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};
use crate::AppState;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Absent and empty both count as missing.
fn required<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::ValidationError(message.to_string())),
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = required(&req.username, "Missing username/password")?;
    let password = required(&req.password, "Missing username/password")?;

    info!("Received login request for {}", username);
    if state.auth.authenticate(username, password).await? {
        state.auth.record_login(username).await?;
        let token = state.auth.issue_token(username)?;
        info!("Login successful for {}", username);
        Ok(HttpResponse::Ok().json(AuthResponse { token }))
    } else {
        warn!("Login failed for {}", username);
        Err(AuthError::InvalidCredentials.into())
    }
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = required(&req.username, "Missing required information")?;
    let password = required(&req.password, "Missing required information")?;
    let first_name = required(&req.first_name, "Missing required information")?;
    let last_name = required(&req.last_name, "Missing required information")?;
    let phone = required(&req.phone, "Missing required information")?;

    info!("Received registration request for {}", username);
    state
        .auth
        .register(username, password, first_name, last_name, phone)
        .await?;

    let token = state.auth.issue_token(username)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}
