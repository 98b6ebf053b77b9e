//! End-to-end exercises of the management API against the in-memory store

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use quay_core::Store;
use quay_core::types::{Member, Namespace, NamespaceSettings, User};
use quay_http::services::JwtConfig;
use quay_http::{AppState, routes};
use quay_memory::MemoryStore;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower::ServiceExt;

const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKLx alice@host";

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

async fn seeded_router() -> Router {
    let store = MemoryStore::new();
    store
        .create_user(&User {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: sha256_hex(b"secret"),
        })
        .await
        .unwrap();
    store
        .create_namespace(&Namespace {
            name: "dev".to_string(),
            owner: "u1".to_string(),
            tenant_id: "t1".to_string(),
            members: vec![Member {
                id: "u1".to_string(),
                name: None,
            }],
            settings: NamespaceSettings::default(),
            max_devices: 10,
        })
        .await
        .unwrap();

    let state = AppState::new(
        Arc::new(store),
        JwtConfig::new("test-secret".to_string(), 72, "quay".to_string()),
    );
    routes::router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(router: &Router) -> String {
    let (status, body) = send(
        router,
        post_json("/api/login", json!({"username": "alice", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_succeeds_and_rejects_bad_password() {
    let router = seeded_router().await;

    let (status, body) = send(
        &router,
        post_json("/api/login", json!({"username": "alice", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "alice");
    assert_eq!(body["tenant"], "t1");
    assert!(!body["token"].as_str().unwrap().is_empty());

    let (status, _) = send(
        &router,
        post_json("/api/login", json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let router = seeded_router().await;

    let request = Request::get("/api/sshkeys/public-keys")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&router).await;
    let response = router
        .clone()
        .oneshot(
            Request::get("/api/sshkeys/public-keys")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let total = response.headers().get("x-total-count").unwrap();
    assert_eq!(total.to_str().unwrap(), "0");
}

#[tokio::test]
async fn list_tolerates_extreme_pagination() {
    let router = seeded_router().await;
    let token = login(&router).await;

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/sshkeys/public-keys?page=9223372036854775807&per_page=100")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_key_create_conflicts_and_validation() {
    let router = seeded_router().await;
    let token = login(&router).await;

    let create = |data: &str| {
        Request::post("/api/sshkeys/public-keys")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"data": data, "name": "laptop"}).to_string(),
            ))
            .unwrap()
    };

    let (status, body) = send(&router, create(PUBLIC_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "t1");
    let fingerprint = body["fingerprint"].as_str().unwrap().to_string();

    let (status, _) = send(&router, create(PUBLIC_KEY)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&router, create("not an ssh key")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // The key is fetchable by fingerprint and tenant.
    let (status, body) = send(
        &router,
        Request::get(format!("/api/sshkeys/public-keys/{fingerprint}/t1"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "laptop");
}

#[tokio::test]
async fn namespace_api_token_lifecycle() {
    let router = seeded_router().await;
    let token = login(&router).await;
    let auth = format!("Bearer {token}");

    let (status, body) = send(
        &router,
        Request::post("/api/namespaces/dev/token")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], sha256_hex(b"dev"));
    assert_eq!(body["read_only"], true);

    let (status, _) = send(
        &router,
        Request::patch("/api/namespaces/dev/token/permission")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        Request::get("/api/namespaces/dev/token")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["read_only"], false);

    let (status, _) = send(
        &router,
        Request::delete("/api/namespaces/dev/token")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Request::get("/api/namespaces/dev/token")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn swap_token_scopes_session_to_namespace() {
    let router = seeded_router().await;
    let token = login(&router).await;

    let (status, body) = send(
        &router,
        Request::get("/api/auth/token/t1")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"], "t1");
    assert_eq!(body["user"], "alice");
}

#[tokio::test]
async fn device_auth_is_public_and_deterministic() {
    let router = seeded_router().await;

    let request = json!({
        "identity": {"mac": "aa:bb:cc:dd:ee:ff"},
        "hostname": "edge-01",
        "public_key": "ssh-rsa AAAA device",
        "tenant_id": "t1",
    });

    let (status, first) = send(&router, post_json("/api/devices/auth", request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["namespace"], "dev");
    assert_eq!(first["name"], "edge-01");
    assert!(!first["token"].as_str().unwrap().is_empty());

    // Re-enrolling with the same identity lands on the same uid.
    let (status, second) = send(&router, post_json("/api/devices/auth", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["uid"], second["uid"]);
}

#[tokio::test]
async fn namespace_token_endpoint_is_public() {
    let router = seeded_router().await;

    let (status, body) = send(
        &router,
        post_json("/api/auth/namespace-token", json!({"namespace": "dev"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["namespace"], "dev");
    assert_eq!(body["tenant_id"], "t1");
    assert_eq!(body["read_only"], true);

    let (status, _) = send(
        &router,
        post_json("/api/auth/namespace-token", json!({"namespace": "ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
