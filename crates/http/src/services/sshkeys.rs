//! SSH public/private key service

use crate::error::HttpError;
use crate::services::sha256_hex;
use chrono::Utc;
use quay_core::Store;
use quay_core::types::{Pagination, PrivateKey, PublicKey, PublicKeyUpdate};
use std::sync::Arc;

pub struct SshKeyService {
    store: Arc<dyn Store>,
}

impl SshKeyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_public_keys(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<PublicKey>, usize), HttpError> {
        Ok(self.store.list_public_keys(pagination).await?)
    }

    pub async fn get_public_key(
        &self,
        fingerprint: &str,
        tenant: &str,
    ) -> Result<PublicKey, HttpError> {
        self.store
            .get_public_key(fingerprint, tenant)
            .await?
            .ok_or_else(|| HttpError::NotFound("public key".to_string()))
    }

    /// Register a public key; the fingerprint is derived from the key data
    pub async fn create_public_key(
        &self,
        data: String,
        name: String,
        tenant: String,
    ) -> Result<PublicKey, HttpError> {
        validate_openssh(&data)?;

        let key = PublicKey {
            fingerprint: sha256_hex(data.as_bytes()),
            data,
            tenant_id: tenant,
            name,
            created_at: Utc::now(),
        };
        self.store.create_public_key(&key).await?;
        Ok(key)
    }

    pub async fn update_public_key(
        &self,
        fingerprint: &str,
        tenant: &str,
        update: PublicKeyUpdate,
    ) -> Result<PublicKey, HttpError> {
        Ok(self
            .store
            .update_public_key(fingerprint, tenant, &update)
            .await?)
    }

    pub async fn delete_public_key(&self, fingerprint: &str, tenant: &str) -> Result<(), HttpError> {
        Ok(self.store.delete_public_key(fingerprint, tenant).await?)
    }

    /// Store host private-key material supplied by the caller
    pub async fn create_private_key(&self, data: String) -> Result<PrivateKey, HttpError> {
        if data.trim().is_empty() {
            return Err(HttpError::UnprocessableEntity(
                "empty key material".to_string(),
            ));
        }

        let key = PrivateKey {
            fingerprint: sha256_hex(data.as_bytes()),
            data,
            created_at: Utc::now(),
        };
        self.store.create_private_key(&key).await?;
        Ok(key)
    }
}

/// Minimal shape check for an authorized-keys entry: an algorithm tag
/// followed by the base64 blob.
fn validate_openssh(data: &str) -> Result<(), HttpError> {
    let mut parts = data.split_whitespace();
    let algorithm = parts.next().unwrap_or_default();
    let blob = parts.next().unwrap_or_default();

    let known_algorithm = algorithm.starts_with("ssh-")
        || algorithm.starts_with("ecdsa-sha2-")
        || algorithm.starts_with("sk-");

    if !known_algorithm || blob.is_empty() {
        return Err(HttpError::UnprocessableEntity(
            "invalid public key format".to_string(),
        ));
    }
    Ok(())
}
