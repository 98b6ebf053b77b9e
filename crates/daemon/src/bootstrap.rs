//! Startup seeding for the in-memory store

use crate::config::BootstrapConfig;
use anyhow::Result;
use quay_core::Store;
use quay_core::types::{Member, Namespace, NamespaceSettings, User};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// Create the bootstrap account, and its namespace if one is configured
pub async fn seed(store: &dyn Store, bootstrap: &BootstrapConfig) -> Result<()> {
    let user_id = Uuid::new_v4().to_string();
    let username = bootstrap.username.to_lowercase();

    store
        .create_user(&User {
            id: user_id.clone(),
            name: bootstrap.username.clone(),
            username: username.clone(),
            email: bootstrap.email.to_lowercase(),
            password: hex::encode(Sha256::digest(bootstrap.password.as_bytes())),
        })
        .await?;
    info!(%username, "bootstrap user created");

    if let Some(name) = &bootstrap.namespace {
        let tenant_id = Uuid::new_v4().to_string();
        store
            .create_namespace(&Namespace {
                name: name.clone(),
                owner: user_id.clone(),
                tenant_id: tenant_id.clone(),
                members: vec![Member {
                    id: user_id,
                    name: Some(username),
                }],
                settings: NamespaceSettings::default(),
                max_devices: 3,
            })
            .await?;
        info!(namespace = %name, %tenant_id, "bootstrap namespace created");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quay_memory::MemoryStore;

    #[tokio::test]
    async fn seed_creates_user_and_namespace() {
        let store = MemoryStore::new();
        seed(
            &store,
            &BootstrapConfig {
                username: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
                namespace: Some("dev".to_string()),
            },
        )
        .await
        .unwrap();

        let user = store
            .get_user_by_username("admin")
            .await
            .unwrap()
            .expect("seeded user");
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.password.len(), 64);

        let namespace = store
            .get_namespace_by_name("dev")
            .await
            .unwrap()
            .expect("seeded namespace");
        assert_eq!(namespace.owner, user.id);
        assert!(namespace.has_member(&user.id));
    }
}
