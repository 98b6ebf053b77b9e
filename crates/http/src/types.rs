//! Request and response types for the management API

use quay_core::types::{DeviceIdentity, DeviceInfo, Pagination};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAuthResponse {
    pub token: String,
    pub name: String,
    pub id: String,
    pub user: String,
    /// Empty when the user has no namespace yet
    pub tenant: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthRequest {
    pub identity: DeviceIdentity,
    pub hostname: String,
    pub public_key: String,
    pub tenant_id: String,
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub info: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthResponse {
    pub uid: String,
    pub token: String,
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceTokenRequest {
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceTokenResponse {
    pub id: String,
    pub token: String,
    pub tenant_id: String,
    pub read_only: bool,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePublicKeyRequest {
    pub data: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrivateKeyRequest {
    pub data: String,
}

/// Pagination query parameters; absent fields fall back to the defaults
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl From<ListQuery> for Pagination {
    fn from(query: ListQuery) -> Self {
        let defaults = Pagination::default();
        Pagination {
            page: query.page.unwrap_or(defaults.page),
            per_page: query.per_page.unwrap_or(defaults.per_page),
        }
        .normalize()
    }
}
