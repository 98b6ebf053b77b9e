//! Authentication service for users, devices, and namespace tokens

use crate::error::HttpError;
use crate::middleware::auth::AuthenticatedIdentity;
use crate::services::jwt::JwtService;
use crate::services::sha256_hex;
use crate::types::{
    DeviceAuthRequest, DeviceAuthResponse, NamespaceTokenResponse, UserAuthRequest,
    UserAuthResponse,
};
use chrono::Utc;
use quay_core::Store;
use quay_core::types::{Device, DeviceStatus, User};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Identity payload a device uid is derived from. Re-authentication with
/// the same payload must land on the same uid.
#[derive(Serialize)]
struct DeviceFingerprint<'a> {
    hostname: &'a str,
    mac: &'a str,
    public_key: &'a str,
    tenant_id: &'a str,
}

pub struct AuthService {
    jwt: Arc<JwtService>,
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(jwt: Arc<JwtService>, store: Arc<dyn Store>) -> Self {
        Self { jwt, store }
    }

    /// Authenticate a user by username (or email) and password
    pub async fn auth_user(&self, request: UserAuthRequest) -> Result<UserAuthResponse, HttpError> {
        let login = request.username.to_lowercase();
        let user = match self.store.get_user_by_username(&login).await? {
            Some(user) => user,
            None => self
                .store
                .get_user_by_email(&login)
                .await?
                .ok_or_else(invalid_credentials)?,
        };

        let digest = sha256_hex(request.password.as_bytes());
        if digest != user.password {
            return Err(invalid_credentials());
        }

        self.issue_user_response(user).await
    }

    /// Re-issue a session token for an already authenticated user
    pub async fn auth_get_token(&self, user_id: &str) -> Result<UserAuthResponse, HttpError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| HttpError::NotFound("user".to_string()))?;

        self.issue_user_response(user).await
    }

    /// Issue a session token scoped to another namespace the user belongs to
    pub async fn auth_swap_token(
        &self,
        username: &str,
        tenant: &str,
    ) -> Result<UserAuthResponse, HttpError> {
        let namespace = self
            .store
            .get_namespace(tenant)
            .await?
            .ok_or_else(|| HttpError::NotFound("namespace".to_string()))?;
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| HttpError::NotFound("user".to_string()))?;

        if !namespace.has_member(&user.id) && namespace.owner != user.id {
            return Err(HttpError::AuthorizationFailed(
                "not a member of this namespace".to_string(),
            ));
        }

        let token = self
            .jwt
            .user_token(&user.id, &user.username, Some(&namespace.tenant_id))?;
        Ok(user_response(user, token, namespace.tenant_id))
    }

    /// Enroll or re-authenticate a device
    pub async fn auth_device(
        &self,
        request: DeviceAuthRequest,
    ) -> Result<DeviceAuthResponse, HttpError> {
        let fingerprint = DeviceFingerprint {
            hostname: &request.hostname,
            mac: &request.identity.mac,
            public_key: &request.public_key,
            tenant_id: &request.tenant_id,
        };
        let payload = serde_json::to_vec(&fingerprint)
            .map_err(|e| HttpError::InternalServerError(format!("uid derivation: {e}")))?;
        let uid = sha256_hex(&payload);

        let device = Device {
            uid: uid.clone(),
            name: String::new(),
            identity: request.identity,
            info: request.info,
            public_key: request.public_key,
            tenant_id: request.tenant_id.clone(),
            last_seen: Utc::now(),
            online: false,
            status: DeviceStatus::default(),
        };

        let hostname = request.hostname.to_lowercase();
        self.store.add_device(device, &hostname).await?;

        let token = self.jwt.device_token(&uid)?;

        self.store.set_device_online(&uid, true).await?;

        for session in &request.sessions {
            // A stale session uid must not fail the whole enrollment.
            if let Err(err) = self.store.keep_alive_session(session).await {
                debug!(session, %err, "skipping session keep-alive");
            }
        }

        let device = self
            .store
            .get_device(&uid)
            .await?
            .ok_or_else(|| HttpError::NotFound("device".to_string()))?;
        let namespace = self
            .store
            .get_namespace(&request.tenant_id)
            .await?
            .ok_or_else(|| HttpError::NotFound("namespace".to_string()))?;

        Ok(DeviceAuthResponse {
            uid,
            token,
            name: device.name,
            namespace: namespace.name,
        })
    }

    /// Issue a read-only namespace API token
    pub async fn auth_namespace_token(
        &self,
        namespace_name: &str,
    ) -> Result<NamespaceTokenResponse, HttpError> {
        let namespace = self
            .store
            .get_namespace_by_name(namespace_name)
            .await?
            .ok_or_else(|| HttpError::NotFound("namespace".to_string()))?;

        let id = sha256_hex(namespace.name.as_bytes());
        let token = self.jwt.namespace_token(&id, &namespace.tenant_id)?;

        Ok(NamespaceTokenResponse {
            id,
            token,
            tenant_id: namespace.tenant_id,
            read_only: true,
            namespace: namespace.name,
        })
    }

    /// Validate a bearer token from an Authorization header value
    pub fn authenticate_from_header(
        &self,
        auth_header: &str,
    ) -> Result<AuthenticatedIdentity, HttpError> {
        let token = self.jwt.extract_bearer_token(auth_header)?;
        let claims = self.jwt.validate_token(token)?;
        Ok(AuthenticatedIdentity {
            id: claims.sub,
            username: claims.username,
            tenant: claims.tenant,
            kind: claims.kind,
        })
    }

    async fn issue_user_response(&self, user: User) -> Result<UserAuthResponse, HttpError> {
        let tenant = self
            .store
            .get_user_namespace(&user.id)
            .await?
            .map(|ns| ns.tenant_id);

        let token = self
            .jwt
            .user_token(&user.id, &user.username, tenant.as_deref())?;
        Ok(user_response(user, token, tenant.unwrap_or_default()))
    }
}

fn user_response(user: User, token: String, tenant: String) -> UserAuthResponse {
    UserAuthResponse {
        token,
        name: user.name,
        id: user.id,
        user: user.username,
        tenant,
        email: user.email,
    }
}

fn invalid_credentials() -> HttpError {
    HttpError::AuthenticationFailed("invalid credentials".to_string())
}
