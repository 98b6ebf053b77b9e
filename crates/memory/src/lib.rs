//! In-memory [`Store`] backend
//!
//! Default backend for the daemon and the integration tests. Everything
//! lives behind one `RwLock`; lock sections are short and never held
//! across an await.

use async_trait::async_trait;
use chrono::Utc;
use quay_core::error::{CoreError, CoreResult};
use quay_core::store::Store;
use quay_core::types::{
    ApiToken, Device, Namespace, Pagination, PrivateKey, PublicKey, PublicKeyUpdate, Session, User,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, User>,
    namespaces: Vec<Namespace>,
    devices: HashMap<String, Device>,
    sessions: HashMap<String, Session>,
    public_keys: Vec<PublicKey>,
    private_keys: Vec<PrivateKey>,
    api_tokens: HashMap<String, ApiToken>,
}

/// In-memory store over a single `RwLock`
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a session directly; sessions are otherwise created by the
    /// session broker, which is outside this crate.
    pub fn insert_session(&self, session: Session) {
        self.write().sessions.insert(session.uid.clone(), session);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_id(&self, id: &str) -> CoreResult<Option<User>> {
        Ok(self.read().users.get(id).cloned())
    }

    async fn create_user(&self, user: &User) -> CoreResult<()> {
        let mut inner = self.write();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::DuplicateEmail);
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_namespace(&self, tenant: &str) -> CoreResult<Option<Namespace>> {
        Ok(self
            .read()
            .namespaces
            .iter()
            .find(|ns| ns.tenant_id == tenant)
            .cloned())
    }

    async fn get_namespace_by_name(&self, name: &str) -> CoreResult<Option<Namespace>> {
        Ok(self
            .read()
            .namespaces
            .iter()
            .find(|ns| ns.name == name)
            .cloned())
    }

    async fn get_user_namespace(&self, user_id: &str) -> CoreResult<Option<Namespace>> {
        Ok(self
            .read()
            .namespaces
            .iter()
            .find(|ns| ns.owner == user_id || ns.has_member(user_id))
            .cloned())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> CoreResult<()> {
        self.write().namespaces.push(namespace.clone());
        Ok(())
    }

    async fn add_device(&self, device: Device, hostname: &str) -> CoreResult<()> {
        let mut inner = self.write();
        match inner.devices.get_mut(&device.uid) {
            Some(existing) => {
                existing.identity = device.identity;
                existing.info = device.info;
                existing.public_key = device.public_key;
                existing.last_seen = device.last_seen;
            }
            None => {
                let mut device = device;
                device.name = hostname.to_string();
                inner.devices.insert(device.uid.clone(), device);
            }
        }
        Ok(())
    }

    async fn get_device(&self, uid: &str) -> CoreResult<Option<Device>> {
        Ok(self.read().devices.get(uid).cloned())
    }

    async fn set_device_online(&self, uid: &str, online: bool) -> CoreResult<()> {
        let mut inner = self.write();
        let device = inner
            .devices
            .get_mut(uid)
            .ok_or_else(|| CoreError::not_found("device"))?;
        device.online = online;
        device.last_seen = Utc::now();
        Ok(())
    }

    async fn keep_alive_session(&self, uid: &str) -> CoreResult<()> {
        let mut inner = self.write();
        let session = inner
            .sessions
            .get_mut(uid)
            .ok_or_else(|| CoreError::not_found("session"))?;
        session.last_seen = Utc::now();
        session.active = true;
        Ok(())
    }

    async fn list_public_keys(
        &self,
        pagination: Pagination,
    ) -> CoreResult<(Vec<PublicKey>, usize)> {
        let inner = self.read();
        let total = inner.public_keys.len();
        let pagination = pagination.normalize();
        let keys = inner
            .public_keys
            .iter()
            .skip(pagination.offset())
            .take(pagination.per_page as usize)
            .cloned()
            .collect();
        Ok((keys, total))
    }

    async fn get_public_key(
        &self,
        fingerprint: &str,
        tenant: &str,
    ) -> CoreResult<Option<PublicKey>> {
        Ok(self
            .read()
            .public_keys
            .iter()
            .find(|k| k.fingerprint == fingerprint && k.tenant_id == tenant)
            .cloned())
    }

    async fn create_public_key(&self, key: &PublicKey) -> CoreResult<()> {
        let mut inner = self.write();
        if inner
            .public_keys
            .iter()
            .any(|k| k.fingerprint == key.fingerprint && k.tenant_id == key.tenant_id)
        {
            return Err(CoreError::DuplicateFingerprint);
        }
        inner.public_keys.push(key.clone());
        Ok(())
    }

    async fn update_public_key(
        &self,
        fingerprint: &str,
        tenant: &str,
        update: &PublicKeyUpdate,
    ) -> CoreResult<PublicKey> {
        let mut inner = self.write();
        let key = inner
            .public_keys
            .iter_mut()
            .find(|k| k.fingerprint == fingerprint && k.tenant_id == tenant)
            .ok_or_else(|| CoreError::not_found("public key"))?;
        key.name = update.name.clone();
        Ok(key.clone())
    }

    async fn delete_public_key(&self, fingerprint: &str, tenant: &str) -> CoreResult<()> {
        let mut inner = self.write();
        let before = inner.public_keys.len();
        inner
            .public_keys
            .retain(|k| !(k.fingerprint == fingerprint && k.tenant_id == tenant));
        if inner.public_keys.len() == before {
            return Err(CoreError::not_found("public key"));
        }
        Ok(())
    }

    async fn create_private_key(&self, key: &PrivateKey) -> CoreResult<()> {
        self.write().private_keys.push(key.clone());
        Ok(())
    }

    async fn create_api_token(&self, namespace: &str, token: &ApiToken) -> CoreResult<ApiToken> {
        self.write()
            .api_tokens
            .insert(namespace.to_string(), token.clone());
        Ok(token.clone())
    }

    async fn get_api_token(&self, namespace: &str) -> CoreResult<Option<ApiToken>> {
        Ok(self.read().api_tokens.get(namespace).cloned())
    }

    async fn delete_api_token(&self, namespace: &str) -> CoreResult<()> {
        self.write()
            .api_tokens
            .remove(namespace)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("token"))
    }

    async fn change_api_token_permission(&self, namespace: &str) -> CoreResult<()> {
        let mut inner = self.write();
        let token = inner
            .api_tokens
            .get_mut(namespace)
            .ok_or_else(|| CoreError::not_found("token"))?;
        token.read_only = !token.read_only;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quay_core::types::{DeviceIdentity, DeviceStatus, Member, NamespaceSettings};

    fn user(id: &str, username: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            name: username.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: "digest".to_string(),
        }
    }

    fn public_key(fingerprint: &str, tenant: &str) -> PublicKey {
        PublicKey {
            data: "ssh-rsa AAAA test".to_string(),
            fingerprint: fingerprint.to_string(),
            tenant_id: tenant.to_string(),
            name: "key".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn user_lookup_by_username_email_and_id() {
        let store = MemoryStore::new();
        store
            .create_user(&user("u1", "alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(
            store
                .get_user_by_username("alice")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .get_user_by_email("alice@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.get_user_by_id("u1").await.unwrap().is_some());
        assert!(store.get_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(&user("u1", "alice", "a@example.com"))
            .await
            .unwrap();
        let err = store
            .create_user(&user("u2", "bob", "a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateEmail);
    }

    #[tokio::test]
    async fn user_namespace_covers_owner_and_members() {
        let store = MemoryStore::new();
        store
            .create_namespace(&Namespace {
                name: "dev".to_string(),
                owner: "u1".to_string(),
                tenant_id: "t1".to_string(),
                members: vec![Member {
                    id: "u2".to_string(),
                    name: None,
                }],
                settings: NamespaceSettings::default(),
                max_devices: 3,
            })
            .await
            .unwrap();

        assert!(store.get_user_namespace("u1").await.unwrap().is_some());
        assert!(store.get_user_namespace("u2").await.unwrap().is_some());
        assert!(store.get_user_namespace("u3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_device_names_new_devices_after_hostname() {
        let store = MemoryStore::new();
        let device = Device {
            uid: "d1".to_string(),
            name: String::new(),
            identity: DeviceIdentity::default(),
            info: None,
            public_key: "pk".to_string(),
            tenant_id: "t1".to_string(),
            last_seen: Utc::now(),
            online: false,
            status: DeviceStatus::default(),
        };
        store.add_device(device.clone(), "edge-01").await.unwrap();
        let stored = store.get_device("d1").await.unwrap().unwrap();
        assert_eq!(stored.name, "edge-01");

        // Re-auth keeps the stored name.
        store.add_device(device, "renamed").await.unwrap();
        let stored = store.get_device("d1").await.unwrap().unwrap();
        assert_eq!(stored.name, "edge-01");

        store.set_device_online("d1", true).await.unwrap();
        assert!(store.get_device("d1").await.unwrap().unwrap().online);
    }

    #[tokio::test]
    async fn public_key_crud_and_duplicate_fingerprint() {
        let store = MemoryStore::new();
        store.create_public_key(&public_key("f1", "t1")).await.unwrap();
        let err = store
            .create_public_key(&public_key("f1", "t1"))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateFingerprint);

        // Same fingerprint under another tenant is fine.
        store.create_public_key(&public_key("f1", "t2")).await.unwrap();

        let updated = store
            .update_public_key(
                "f1",
                "t1",
                &PublicKeyUpdate {
                    name: "renamed".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");

        store.delete_public_key("f1", "t1").await.unwrap();
        assert!(store.get_public_key("f1", "t1").await.unwrap().is_none());
        assert!(store.delete_public_key("f1", "t1").await.is_err());
    }

    #[tokio::test]
    async fn public_key_listing_paginates() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .create_public_key(&public_key(&format!("f{i}"), "t1"))
                .await
                .unwrap();
        }

        let (page, total) = store
            .list_public_keys(Pagination {
                page: 2,
                per_page: 10,
            })
            .await
            .unwrap();
        assert_eq!(total, 15);
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn api_token_lifecycle() {
        let store = MemoryStore::new();
        let token = ApiToken {
            id: "id1".to_string(),
            tenant_id: "t1".to_string(),
            read_only: true,
        };
        store.create_api_token("dev", &token).await.unwrap();
        assert!(store.get_api_token("dev").await.unwrap().is_some());

        store.change_api_token_permission("dev").await.unwrap();
        let stored = store.get_api_token("dev").await.unwrap().unwrap();
        assert!(!stored.read_only);

        store.delete_api_token("dev").await.unwrap();
        assert!(store.get_api_token("dev").await.unwrap().is_none());
        assert!(store.delete_api_token("dev").await.is_err());
    }

    #[tokio::test]
    async fn survives_a_poisoned_lock() {
        let store = MemoryStore::new();
        store
            .create_user(&user("u1", "alice", "alice@example.com"))
            .await
            .unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.inner.write().unwrap();
            panic!("poison the lock");
        }));

        assert!(
            store
                .get_user_by_username("alice")
                .await
                .unwrap()
                .is_some()
        );
        store
            .create_user(&user("u2", "bob", "bob@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn keep_alive_requires_existing_session() {
        let store = MemoryStore::new();
        assert!(store.keep_alive_session("s1").await.is_err());

        store.insert_session(Session {
            uid: "s1".to_string(),
            device_uid: "d1".to_string(),
            tenant_id: "t1".to_string(),
            username: "alice".to_string(),
            ip_address: "10.0.0.1".to_string(),
            started_at: Utc::now(),
            last_seen: Utc::now(),
            active: false,
            authenticated: true,
        });
        store.keep_alive_session("s1").await.unwrap();
    }
}
