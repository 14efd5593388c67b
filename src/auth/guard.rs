use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// The authenticated caller, resolved from the request's bearer token.
///
/// Declaring an `AuthUser` argument on a handler is the authentication gate:
/// extraction fails with 401 when the token is absent or invalid. The
/// ownership gate is `require_owner`, applied per resource.
#[derive(Debug, Clone)]
pub struct AuthUser {
    username: String,
}

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Permits the request only when the caller's identity equals the
    /// resource's owning username.
    pub fn require_owner(&self, username: &str) -> Result<(), AppError> {
        if self.username == username {
            Ok(())
        } else {
            Err(AuthError::WrongOwner.into())
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state not configured".into()))?;

    let token = bearer_token(req).ok_or(AuthError::MissingToken)?;
    let username = state.auth.verify_token(token)?;

    Ok(AuthUser { username })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::Settings;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let config = Settings::new_for_test().unwrap();
        AppState::with_store(config, Arc::new(MemoryUserStore::new()))
    }

    fn user(name: &str) -> AuthUser {
        AuthUser {
            username: name.to_string(),
        }
    }

    #[test]
    fn test_owner_check_permits_only_matching_identity() {
        assert!(user("alice").require_owner("alice").is_ok());

        let err = user("bob").require_owner("alice").unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::WrongOwner)));
    }

    #[test]
    fn test_owner_check_empty_edge_cases() {
        assert!(user("").require_owner("").is_ok());
        assert!(user("").require_owner("alice").is_err());
        assert!(user("alice").require_owner("").is_err());
    }

    #[actix_web::test]
    async fn test_resolve_binds_token_subject() {
        let state = test_state();
        let token = state.auth.issue_token("alice").unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        let auth_user = resolve(&req).unwrap();
        assert_eq!(auth_user.username(), "alice");
    }

    #[actix_web::test]
    async fn test_resolve_accepts_bare_token_header() {
        let state = test_state();
        let token = state.auth.issue_token("alice").unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .insert_header(("Authorization", token))
            .to_http_request();

        assert_eq!(resolve(&req).unwrap().username(), "alice");
    }

    #[actix_web::test]
    async fn test_resolve_missing_token() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::MissingToken)));
    }

    #[actix_web::test]
    async fn test_resolve_invalid_token() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidToken)));
    }

    #[actix_web::test]
    async fn test_resolve_rejects_token_from_other_secret() {
        use crate::auth::{PasswordHasher, TokenService};
        use crate::AuthService;

        let foreign = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            PasswordHasher::new(4),
            TokenService::new("some_other_secret"),
        );
        let token = foreign.issue_token("alice").unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidToken)));
    }

    #[actix_web::test]
    async fn test_resolve_without_state_is_internal_error() {
        let req = TestRequest::default().to_http_request();
        let err = resolve(&req).unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
