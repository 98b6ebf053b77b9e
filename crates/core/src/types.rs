use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    /// SHA-256 hex digest of the password
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub owner: String,
    pub tenant_id: String,
    pub members: Vec<Member>,
    pub settings: NamespaceSettings,
    pub max_devices: i64,
}

impl Namespace {
    /// Check whether the given user id is a member of this namespace
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceSettings {
    pub session_record: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Accepted,
    Pending,
    Rejected,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub pretty_name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub uid: String,
    pub name: String,
    pub identity: DeviceIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DeviceInfo>,
    pub public_key: String,
    pub tenant_id: String,
    pub last_seen: DateTime<Utc>,
    pub online: bool,
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub device_uid: String,
    pub tenant_id: String,
    pub username: String,
    pub ip_address: String,
    pub started_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub active: bool,
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKey {
    /// Key material in OpenSSH authorized-keys format
    pub data: String,
    pub fingerprint: String,
    pub tenant_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Mutable fields of a stored public key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyUpdate {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKey {
    pub data: String,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only API token scoped to a namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: String,
    pub tenant_id: String,
    pub read_only: bool,
}

/// Pagination window for list operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Pagination {
    pub const MAX_PER_PAGE: i64 = 100;

    /// Clamp page and per-page to sane bounds
    pub fn normalize(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Zero-based offset of the first item in the window. Saturates so
    /// request-supplied page numbers cannot overflow.
    pub fn offset(&self) -> usize {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .max(0) as usize
    }
}
