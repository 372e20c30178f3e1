#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use crm_core::password::PasswordHasher;
use crm_core::service::CustomerService;
use crm_core::storage::StorageBackendType;
use crm_core::testing::{MemoryCustomerStore, MemoryObjectStorage, PrefixHasher};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crm_api::auth::jwt::JwtConfig;
use crm_api::config::{ServerConfig, StorageConfig};
use crm_api::router::build_app_router;
use crm_api::state::AppState;

pub const TEST_BUCKET: &str = "test-customer-bucket";
pub const MULTIPART_BOUNDARY: &str = "X-CRM-TEST-BOUNDARY";

/// Application under test plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCustomerStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub config: ServerConfig,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 15,
        },
        storage: StorageConfig {
            backend: StorageBackendType::Local,
            customer_bucket: TEST_BUCKET.to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
            local_root: "./storage".to_string(),
        },
        seed_random_customer: false,
    }
}

/// Build the full application router over in-memory backends with a cheap
/// password hasher.
pub fn build_test_app() -> TestApp {
    build_test_app_with_hasher(Arc::new(PrefixHasher))
}

/// Build the full application router with a specific password hasher.
///
/// Uses [`build_app_router`] so tests exercise the same middleware stack
/// (CORS, request ID, timeout, tracing, panic recovery) that production uses.
pub fn build_test_app_with_hasher(hasher: Arc<dyn PasswordHasher>) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryCustomerStore::default());
    let storage = Arc::new(MemoryObjectStorage::default());

    let customers = Arc::new(CustomerService::new(
        store.clone(),
        storage.clone(),
        hasher,
        config.storage.customer_bucket.clone(),
    ));
    let state = AppState {
        customers,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        storage,
        config,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, Some(token)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a multipart body with a single field.
pub async fn post_multipart_auth(
    app: &Router,
    uri: &str,
    field: &str,
    content: &[u8],
    token: &str,
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"profile.jpg\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn registration(email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Alex Doe",
        "email": email,
        "password": "password",
        "age": 30,
        "gender": "MALE",
    })
}

/// Register a customer through the API, returning its id and access token.
pub async fn register(app: &Router, email: &str) -> (i64, String) {
    let response = post_json(app, "/api/v1/customers", registration(email)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let token = response
        .headers()
        .get(AUTHORIZATION)
        .expect("registration must return a token")
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    (json["id"].as_i64().expect("id is a number"), token)
}
