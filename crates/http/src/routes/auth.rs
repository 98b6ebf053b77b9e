//! Authentication endpoints

use crate::error::HttpError;
use crate::middleware::auth::AuthenticatedIdentity;
use crate::state::AppState;
use crate::types::{
    DeviceAuthRequest, DeviceAuthResponse, NamespaceTokenRequest, NamespaceTokenResponse,
    UserAuthRequest, UserAuthResponse,
};
use axum::{Extension, Json, extract::Path, extract::State};
use tracing::{info, instrument};

/// Authenticate a user by username/email and password
#[instrument(name = "login", skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<UserAuthRequest>,
) -> Result<Json<UserAuthResponse>, HttpError> {
    let response = state.auth.auth_user(request).await?;
    info!(user = %response.user, "user authenticated");
    Ok(Json(response))
}

/// Enroll or re-authenticate a device
#[instrument(name = "device_auth", skip(state, request), fields(hostname = %request.hostname))]
pub async fn auth_device(
    State(state): State<AppState>,
    Json(request): Json<DeviceAuthRequest>,
) -> Result<Json<DeviceAuthResponse>, HttpError> {
    let response = state.auth.auth_device(request).await?;
    info!(uid = %response.uid, "device authenticated");
    Ok(Json(response))
}

/// Re-issue a session token for the authenticated user
#[instrument(name = "refresh_token", skip(state, identity), fields(user_id = %identity.id))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<Json<UserAuthResponse>, HttpError> {
    Ok(Json(state.auth.auth_get_token(&identity.id).await?))
}

/// Issue a session token scoped to another namespace
#[instrument(name = "swap_token", skip(state, identity), fields(user_id = %identity.id, %tenant))]
pub async fn swap_token(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(tenant): Path<String>,
) -> Result<Json<UserAuthResponse>, HttpError> {
    let username = identity.username.ok_or_else(|| {
        HttpError::AuthorizationFailed("user session token required".to_string())
    })?;
    Ok(Json(state.auth.auth_swap_token(&username, &tenant).await?))
}

/// Issue a read-only namespace API token
#[instrument(name = "namespace_token", skip(state, request), fields(namespace = %request.namespace))]
pub async fn namespace_token(
    State(state): State<AppState>,
    Json(request): Json<NamespaceTokenRequest>,
) -> Result<Json<NamespaceTokenResponse>, HttpError> {
    Ok(Json(
        state.auth.auth_namespace_token(&request.namespace).await?,
    ))
}
