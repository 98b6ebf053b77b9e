//! Route registration for the management API

pub mod auth;
pub mod health;
pub mod sshkeys;
pub mod tokens;

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
};

/// Assemble the API router with bearer authentication applied
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/login", post(auth::login))
        .route("/api/devices/auth", post(auth::auth_device))
        .route("/api/auth/token", get(auth::refresh_token))
        .route("/api/auth/token/{tenant}", get(auth::swap_token))
        .route("/api/auth/namespace-token", post(auth::namespace_token))
        .route(
            "/api/sshkeys/public-keys",
            get(sshkeys::list).post(sshkeys::create),
        )
        .route(
            "/api/sshkeys/public-keys/{fingerprint}/{tenant}",
            get(sshkeys::get_key),
        )
        .route(
            "/api/sshkeys/public-keys/{fingerprint}",
            put(sshkeys::update).delete(sshkeys::remove),
        )
        .route("/api/sshkeys/private-keys", post(sshkeys::create_private))
        .route(
            "/api/namespaces/{namespace}/token",
            get(tokens::get_token)
                .post(tokens::create_token)
                .delete(tokens::delete_token),
        )
        .route(
            "/api/namespaces/{namespace}/token/permission",
            patch(tokens::change_permission),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
