/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store with a manual clock, mints
/// session tokens with the configured secret and wraps request plumbing.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::session::{SessionClaims, SessionKeys};
use taskboard_shared::clock::ManualClock;
use taskboard_shared::store::{memory::MemoryStore, Stores};
use tower::Service as _;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const ISSUER: &str = "taskboard";

/// Clock start for every test (2025-01-01T00:00:00Z)
pub const START_MILLIS: i64 = 1_735_689_600_000;

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub keys: SessionKeys,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            "SESSION_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        let store = Arc::new(MemoryStore::new());
        let stores = Stores {
            tasks: store.clone(),
            users: store.clone(),
        };
        let clock = Arc::new(ManualClock::new(START_MILLIS));

        let state = AppState::with_clock(stores, config, clock.clone());
        let app = build_router(state.clone());

        Self {
            app,
            state,
            store,
            clock,
            keys: SessionKeys::new(SECRET, ISSUER),
        }
    }

    /// Valid bearer token for `user_id`
    pub fn token(&self, user_id: &str) -> String {
        let claims = SessionClaims::new(
            user_id,
            format!("{user_id}@example.com"),
            ISSUER,
            Duration::hours(1),
        );
        self.keys.issue(&claims).expect("issue token")
    }

    /// Token carrying display name and avatar claims
    pub fn token_with_profile(&self, user_id: &str, email: &str, name: &str) -> String {
        let claims = SessionClaims::new(user_id, email, ISSUER, Duration::hours(1))
            .with_name(name)
            .with_picture("https://img.example.com/avatar.png");
        self.keys.issue(&claims).expect("issue token")
    }

    /// Sends a request and returns the status and parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .call(build_request(method, uri, token, body))
            .await
            .expect("router call");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Creates a task for `user_id` and returns the response body's `task`
    pub async fn create_task(&self, user_id: &str, body: Value) -> Value {
        let token = self.token(user_id);
        let (status, json) = self
            .send(Method::POST, "/v1/tasks", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["task"].clone()
    }
}

pub fn build_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}
