//! Application state shared by handlers and middleware

use crate::services::{ApiTokenService, AuthService, JwtConfig, JwtService, SshKeyService};
use quay_core::Store;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<ApiTokenService>,
    pub sshkeys: Arc<SshKeyService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_config: JwtConfig) -> Self {
        let jwt = Arc::new(JwtService::new(jwt_config));
        Self {
            auth: Arc::new(AuthService::new(jwt, store.clone())),
            tokens: Arc::new(ApiTokenService::new(store.clone())),
            sshkeys: Arc::new(SshKeyService::new(store.clone())),
            store,
        }
    }
}
