//! Persistence trait for the management API
//!
//! Trimmed to the operations the auth, token, and SSH-key services use.
//! Backends implement this trait; `quay-memory` ships the in-memory one.

use crate::error::CoreResult;
use crate::types::{
    ApiToken, Device, Namespace, Pagination, PrivateKey, PublicKey, PublicKeyUpdate, User,
};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn get_user_by_username(&self, username: &str) -> CoreResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> CoreResult<Option<User>>;
    async fn create_user(&self, user: &User) -> CoreResult<()>;

    // Namespaces
    async fn get_namespace(&self, tenant: &str) -> CoreResult<Option<Namespace>>;
    async fn get_namespace_by_name(&self, name: &str) -> CoreResult<Option<Namespace>>;
    /// Any namespace the user is a member of; which one is unspecified
    async fn get_user_namespace(&self, user_id: &str) -> CoreResult<Option<Namespace>>;
    async fn create_namespace(&self, namespace: &Namespace) -> CoreResult<()>;

    // Devices
    async fn add_device(&self, device: Device, hostname: &str) -> CoreResult<()>;
    async fn get_device(&self, uid: &str) -> CoreResult<Option<Device>>;
    async fn set_device_online(&self, uid: &str, online: bool) -> CoreResult<()>;

    // Sessions
    async fn keep_alive_session(&self, uid: &str) -> CoreResult<()>;

    // Public keys
    async fn list_public_keys(
        &self,
        pagination: Pagination,
    ) -> CoreResult<(Vec<PublicKey>, usize)>;
    async fn get_public_key(&self, fingerprint: &str, tenant: &str)
    -> CoreResult<Option<PublicKey>>;
    async fn create_public_key(&self, key: &PublicKey) -> CoreResult<()>;
    async fn update_public_key(
        &self,
        fingerprint: &str,
        tenant: &str,
        update: &PublicKeyUpdate,
    ) -> CoreResult<PublicKey>;
    async fn delete_public_key(&self, fingerprint: &str, tenant: &str) -> CoreResult<()>;
    async fn create_private_key(&self, key: &PrivateKey) -> CoreResult<()>;

    // Namespace API tokens
    async fn create_api_token(&self, namespace: &str, token: &ApiToken) -> CoreResult<ApiToken>;
    async fn get_api_token(&self, namespace: &str) -> CoreResult<Option<ApiToken>>;
    async fn delete_api_token(&self, namespace: &str) -> CoreResult<()>;
    /// Flip the read-only bit of the namespace's token
    async fn change_api_token_permission(&self, namespace: &str) -> CoreResult<()>;
}

// Mock implementation for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub Store {}

        #[async_trait]
        impl Store for Store {
            async fn get_user_by_username(&self, username: &str) -> CoreResult<Option<User>>;
            async fn get_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;
            async fn get_user_by_id(&self, id: &str) -> CoreResult<Option<User>>;
            async fn create_user(&self, user: &User) -> CoreResult<()>;
            async fn get_namespace(&self, tenant: &str) -> CoreResult<Option<Namespace>>;
            async fn get_namespace_by_name(&self, name: &str) -> CoreResult<Option<Namespace>>;
            async fn get_user_namespace(&self, user_id: &str) -> CoreResult<Option<Namespace>>;
            async fn create_namespace(&self, namespace: &Namespace) -> CoreResult<()>;
            async fn add_device(&self, device: Device, hostname: &str) -> CoreResult<()>;
            async fn get_device(&self, uid: &str) -> CoreResult<Option<Device>>;
            async fn set_device_online(&self, uid: &str, online: bool) -> CoreResult<()>;
            async fn keep_alive_session(&self, uid: &str) -> CoreResult<()>;
            async fn list_public_keys(
                &self,
                pagination: Pagination,
            ) -> CoreResult<(Vec<PublicKey>, usize)>;
            async fn get_public_key(
                &self,
                fingerprint: &str,
                tenant: &str,
            ) -> CoreResult<Option<PublicKey>>;
            async fn create_public_key(&self, key: &PublicKey) -> CoreResult<()>;
            async fn update_public_key(
                &self,
                fingerprint: &str,
                tenant: &str,
                update: &PublicKeyUpdate,
            ) -> CoreResult<PublicKey>;
            async fn delete_public_key(&self, fingerprint: &str, tenant: &str) -> CoreResult<()>;
            async fn create_private_key(&self, key: &PrivateKey) -> CoreResult<()>;
            async fn create_api_token(
                &self,
                namespace: &str,
                token: &ApiToken,
            ) -> CoreResult<ApiToken>;
            async fn get_api_token(&self, namespace: &str) -> CoreResult<Option<ApiToken>>;
            async fn delete_api_token(&self, namespace: &str) -> CoreResult<()>;
            async fn change_api_token_permission(&self, namespace: &str) -> CoreResult<()>;
        }
    }
}
