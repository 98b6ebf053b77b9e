//! SSH public/private key endpoints

use crate::error::HttpError;
use crate::middleware::auth::AuthenticatedIdentity;
use crate::state::AppState;
use crate::types::{CreatePrivateKeyRequest, CreatePublicKeyRequest, ListQuery};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use quay_core::types::{PrivateKey, PublicKey, PublicKeyUpdate};
use tracing::instrument;

#[instrument(name = "list_public_keys", skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let (keys, total) = state.sshkeys.list_public_keys(query.into()).await?;
    Ok(([("x-total-count", total.to_string())], Json(keys)))
}

#[instrument(name = "get_public_key", skip(state))]
pub async fn get_key(
    State(state): State<AppState>,
    Path((fingerprint, tenant)): Path<(String, String)>,
) -> Result<Json<PublicKey>, HttpError> {
    Ok(Json(state.sshkeys.get_public_key(&fingerprint, &tenant).await?))
}

#[instrument(name = "create_public_key", skip(state, identity, request))]
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(request): Json<CreatePublicKeyRequest>,
) -> Result<Json<PublicKey>, HttpError> {
    let tenant = identity.tenant.unwrap_or_default();
    let key = state
        .sshkeys
        .create_public_key(request.data, request.name, tenant)
        .await?;
    Ok(Json(key))
}

#[instrument(name = "update_public_key", skip(state, identity, update))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(fingerprint): Path<String>,
    Json(update): Json<PublicKeyUpdate>,
) -> Result<Json<PublicKey>, HttpError> {
    let tenant = identity.tenant.unwrap_or_default();
    let key = state
        .sshkeys
        .update_public_key(&fingerprint, &tenant, update)
        .await?;
    Ok(Json(key))
}

#[instrument(name = "delete_public_key", skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(fingerprint): Path<String>,
) -> Result<StatusCode, HttpError> {
    let tenant = identity.tenant.unwrap_or_default();
    state.sshkeys.delete_public_key(&fingerprint, &tenant).await?;
    Ok(StatusCode::OK)
}

#[instrument(name = "create_private_key", skip(state, request))]
pub async fn create_private(
    State(state): State<AppState>,
    Json(request): Json<CreatePrivateKeyRequest>,
) -> Result<Json<PrivateKey>, HttpError> {
    Ok(Json(state.sshkeys.create_private_key(request.data).await?))
}
