//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
use serde_json::{Value, json};
use tower::ServiceExt;
use warden_api::config::ApiConfig;
use warden_api::{AppState, router};
use warden_core::accounts::memory::MemoryAccountStore;
use warden_core::auth::password::PasswordHasher;
use warden_core::auth::policy::PasswordPolicy;
use warden_core::bus::{BusError, EventBus};

pub const SECRET: &str = "integration-test-secret";
pub const GOOD_PASSWORD: &str = "Fontysict1234!";
/// Lowest cost bcrypt accepts.
pub const TEST_COST: u32 = 4;

/// Bus that captures published messages and reports a settable connection state.
pub struct CapturingBus {
    messages: Mutex<Vec<(String, Vec<u8>)>>,
    connected: AtomicBool,
}

impl CapturingBus {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_connected(&self, up: bool) {
        self.connected.store(up, Ordering::Relaxed);
    }

    pub fn messages(&self) -> Vec<(String, Vec<u8>)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBus for CapturingBus {
    async fn publish(
        &self,
        queue: &str,
        payload: &[u8],
        _content_type: &str,
    ) -> Result<(), BusError> {
        self.messages
            .lock()
            .unwrap()
            .push((queue.to_string(), payload.to_vec()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryAccountStore>,
    pub bus: Arc<CapturingBus>,
    /// Backs the `/metrics` handle; install with `metrics::with_local_recorder`.
    pub recorder: PrometheusRecorder,
}

impl TestApp {
    pub fn new() -> Self {
        let config =
            ApiConfig::from_lookup(|name| (name == "JWT_SECRET").then(|| SECRET.to_string()))
                .unwrap();
        let store = Arc::new(MemoryAccountStore::new());
        let bus = Arc::new(CapturingBus::new());
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState::new(
            &config,
            store.clone(),
            bus.clone(),
            PasswordPolicy::from_passwords(["superman", "password123456789"]),
            PasswordHasher::with_cost(TEST_COST),
            recorder.handle(),
        );
        Self {
            router: router(state.clone()),
            state,
            store,
            bus,
            recorder,
        }
    }

    /// Send a request and return the status with the decoded JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(request).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    /// Send a request and return the status, content type and raw body text.
    pub async fn send_text(&self, request: Request<Body>) -> (StatusCode, String, String) {
        let resp = self.router.clone().oneshot(request).await.expect("request");
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, content_type, String::from_utf8_lossy(&body).into_owned())
    }

    /// Register an account through `POST /users`.
    pub async fn register(&self, id: i64, email: &str, account_type: i32) -> (StatusCode, Value) {
        self.send(json_request(
            "POST",
            "/users",
            None,
            &account_body(id, email, account_type, GOOD_PASSWORD),
        ))
        .await
    }

    /// Log in and return the issued access token.
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/login",
                None,
                &json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "login failed: {body}");
        body["access_token"].as_str().expect("access_token").to_string()
    }

    /// Register an account and log in as it.
    pub async fn signed_up(&self, id: i64, email: &str, account_type: i32) -> String {
        let (status, body) = self.register(id, email, account_type).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        self.token_for(email, GOOD_PASSWORD).await
    }
}

pub fn account_body(id: i64, email: &str, account_type: i32, password: &str) -> Value {
    json!({
        "id": id,
        "full_name": "Test Traveller",
        "email": email,
        "account_type": account_type,
        "password": password,
    })
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bare_request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
