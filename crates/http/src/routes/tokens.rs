//! Namespace API-token endpoints

use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use quay_core::types::ApiToken;
use tracing::instrument;

#[instrument(name = "create_api_token", skip(state))]
pub async fn create_token(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ApiToken>, HttpError> {
    Ok(Json(state.tokens.create_token(&namespace).await?))
}

#[instrument(name = "get_api_token", skip(state))]
pub async fn get_token(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ApiToken>, HttpError> {
    Ok(Json(state.tokens.get_token(&namespace).await?))
}

#[instrument(name = "delete_api_token", skip(state))]
pub async fn delete_token(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.tokens.delete_token(&namespace).await?;
    Ok(StatusCode::OK)
}

#[instrument(name = "change_api_token_permission", skip(state))]
pub async fn change_permission(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.tokens.change_permission(&namespace).await?;
    Ok(StatusCode::OK)
}
