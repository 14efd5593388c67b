use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::{AppError, StoreError};
use crate::AppState;

/// GET /users — basic info on all users. Requires a valid token.
pub async fn list_users(
    _user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users = state.store.list().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

/// GET /users/{username} — account detail. Only the owner may read it; the
/// serialized account never includes the password digest.
pub async fn get_user(
    user: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    user.require_owner(&username)?;

    let account = state
        .store
        .find_by_username(&username)
        .await?
        .ok_or(StoreError::NotFound)?;

    Ok(HttpResponse::Ok().json(json!({ "user": account })))
}

/// GET /users/{username}/to — messages delivered to the user.
pub async fn messages_to(
    user: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    user.require_owner(&username)?;

    let messages = state.store.messages_to(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "messages": messages })))
}

/// GET /users/{username}/from — messages the user sent.
pub async fn messages_from(
    user: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    user.require_owner(&username)?;

    let messages = state.store.messages_from(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "messages": messages })))
}
