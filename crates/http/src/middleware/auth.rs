//! Bearer-token authentication middleware

use crate::error::HttpError;
use crate::services::jwt::TokenKind;
use async_trait::async_trait;
use axum::{extract::Request, http::request::Parts, middleware::Next, response::Response};

/// Identity extracted from a validated bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    /// User id, device uid, or namespace-token id depending on `kind`
    pub id: String,
    pub username: Option<String>,
    pub tenant: Option<String>,
    pub kind: TokenKind,
}

/// Trait for authentication providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate a request and return the identity if successful
    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticatedIdentity, HttpError>;

    /// Check if authentication should be skipped for a given path
    fn should_skip_auth(&self, path: &str) -> bool {
        matches!(
            path,
            "/healthz" | "/api/login" | "/api/devices/auth" | "/api/auth/namespace-token"
        )
    }
}

/// Middleware function for authentication
pub async fn auth_middleware(
    axum::extract::State(app_state): axum::extract::State<crate::AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let path = req.uri().path();

    if app_state.should_skip_auth(path) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    match app_state.authenticate(&parts).await {
        Ok(identity) => {
            parts.extensions.insert(identity);
            let req = Request::from_parts(parts, body);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl AuthProvider for crate::AppState {
    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticatedIdentity, HttpError> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                HttpError::AuthenticationFailed("Missing authorization header".to_string())
            })?;

        self.auth.authenticate_from_header(auth_header)
    }
}
