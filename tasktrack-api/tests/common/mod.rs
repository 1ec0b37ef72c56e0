//! Common test utilities for API tests
//!
//! Builds the full router over an in-memory store, so the tests exercise
//! routing, token verification, validation and error mapping without a
//! database.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tasktrack_api::app::{build_router, AppState};
use tasktrack_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tasktrack_shared::store::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "api-test-secret-key-at-least-32-bytes";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub config: Config,
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = test_config();
        let app = build_router(AppState::new(store.clone(), config.clone()));

        Self { app, store, config }
    }

    /// Sends a request, optionally with a JSON body and bearer token
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Sends a raw body with an optional content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &'static str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let request = builder.body(Body::from(body)).unwrap();
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Registers a user and asserts it succeeded
    pub async fn register(&self, username: &str, email: &str, password: &str) {
        let response = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "fullName": format!("{} Tester", username),
                    "username": username,
                    "gender": "other",
                    "email": email,
                    "password": password,
                })),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "registration failed: {}",
            response.body
        );
    }

    /// Logs in and returns the session token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Registers and logs in, returning the token
    pub async fn user(&self, username: &str, email: &str) -> String {
        self.register(username, email, "password123").await;
        self.login(email, "password123").await
    }

    /// Creates a task and returns its id
    pub async fn create_task(&self, token: &str, body: Value) -> String {
        let response = self
            .send(Method::POST, "/createtask", Some(token), Some(body))
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "task creation failed: {}",
            response.body
        );
        response.body["task"]["id"].as_str().unwrap().to_string()
    }
}

pub fn personal_task(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Something to do",
        "assignedTo": "personal",
    })
}

pub fn task_for(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "description": "Something to do",
        "assignedTo": "others",
        "assigneeEmail": email,
    })
}
