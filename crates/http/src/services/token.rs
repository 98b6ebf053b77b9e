//! Namespace API-token service

use crate::error::HttpError;
use crate::services::sha256_hex;
use quay_core::Store;
use quay_core::types::{ApiToken, Namespace};
use std::sync::Arc;

pub struct ApiTokenService {
    store: Arc<dyn Store>,
}

impl ApiTokenService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create (or replace) the namespace's read-only API token
    pub async fn create_token(&self, namespace: &str) -> Result<ApiToken, HttpError> {
        let ns = self.require_namespace(namespace, true).await?;

        let token = ApiToken {
            id: sha256_hex(ns.name.as_bytes()),
            tenant_id: ns.tenant_id,
            read_only: true,
        };
        Ok(self.store.create_api_token(&ns.name, &token).await?)
    }

    pub async fn get_token(&self, namespace: &str) -> Result<ApiToken, HttpError> {
        self.require_namespace(namespace, false).await?;
        self.store
            .get_api_token(namespace)
            .await?
            .ok_or_else(|| HttpError::NotFound("token".to_string()))
    }

    pub async fn delete_token(&self, namespace: &str) -> Result<(), HttpError> {
        self.require_namespace(namespace, false).await?;
        Ok(self.store.delete_api_token(namespace).await?)
    }

    /// Flip the token between read-only and read-write
    pub async fn change_permission(&self, namespace: &str) -> Result<(), HttpError> {
        self.require_namespace(namespace, true).await?;
        Ok(self.store.change_api_token_permission(namespace).await?)
    }

    /// Missing namespaces are unauthorized on mutation and not-found on
    /// read, matching the API's observable behavior.
    async fn require_namespace(
        &self,
        namespace: &str,
        unauthorized: bool,
    ) -> Result<Namespace, HttpError> {
        self.store
            .get_namespace_by_name(namespace)
            .await?
            .ok_or_else(|| {
                if unauthorized {
                    HttpError::AuthenticationFailed("unknown namespace".to_string())
                } else {
                    HttpError::NotFound("namespace".to_string())
                }
            })
    }
}
