//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use student_records::config::AppConfig;
use student_records::lifecycle::Shutdown;
use student_records::store::{Document, DocumentStore, Fields, MemoryStore, Query, StoreError};
use student_records::HttpServer;

pub const ORIGIN: &str = "http://localhost:3000";

/// Router over a fresh in-memory store.
pub fn test_router() -> Router {
    router_with_store(Arc::new(MemoryStore::new()))
}

pub fn router_with_store(store: Arc<dyn DocumentStore>) -> Router {
    router_with(AppConfig::default(), store)
}

pub fn router_with(config: AppConfig, store: Arc<dyn DocumentStore>) -> Router {
    HttpServer::new(config, store)
        .expect("default config is valid")
        .router()
}

/// Status, headers and parsed JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Middleware rejections (413, 408) carry plain-text bodies.
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, json_request("POST", uri, body.to_string())).await
}

pub async fn put_json(router: &Router, uri: &str, body: &Value) -> TestResponse {
    send(router, json_request("PUT", uri, body.to_string())).await
}

pub fn json_request(method: &str, uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// A store whose every call fails, for exercising 500 paths.
pub struct FailingStore;

impl FailingStore {
    pub const DETAIL: &'static str = "internal detail: replica set unreachable";

    fn error() -> StoreError {
        StoreError::Backend {
            status: 503,
            body: Self::DETAIL.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
        Err(Self::error())
    }

    async fn add(&self, _: &str, _: Fields) -> Result<Document, StoreError> {
        Err(Self::error())
    }

    async fn update(&self, _: &str, _: &str, _: Fields) -> Result<Document, StoreError> {
        Err(Self::error())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn query(&self, _: &str, _: &Query) -> Result<Vec<Document>, StoreError> {
        Err(Self::error())
    }
}

/// A store whose calls never complete.
pub struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    fn backend(&self) -> &'static str {
        "stalled"
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
        std::future::pending().await
    }

    async fn add(&self, _: &str, _: Fields) -> Result<Document, StoreError> {
        std::future::pending().await
    }

    async fn update(&self, _: &str, _: &str, _: Fields) -> Result<Document, StoreError> {
        std::future::pending().await
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn query(&self, _: &str, _: &Query) -> Result<Vec<Document>, StoreError> {
        std::future::pending().await
    }
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

pub async fn spawn_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(AppConfig::default(), Arc::new(MemoryStore::new())).unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, signal));

    TestServer {
        base_url: format!("http://{addr}"),
        shutdown,
        handle,
    }
}
