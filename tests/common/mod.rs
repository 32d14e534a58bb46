//! Common test utilities for the HTTP API tests
//!
//! Provides shared helper functions for:
//! - Building routers over lazily connected handler managers
//! - Issuing JSON requests through `tower::ServiceExt::oneshot`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mongobench::config::MongoConfig;
use mongobench::{create_router, HandlerManager};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Environment variable pointing the live tests at a MongoDB deployment
pub const TEST_URI_ENV: &str = "MONGOBENCH_TEST_URI";

/// Manager whose handlers never touch the network until an operation runs.
/// Port 1 is never a MongoDB server, so any operation that did reach the
/// driver would fail instead of silently succeeding.
pub fn lazy_manager() -> Arc<HandlerManager> {
    Arc::new(HandlerManager::new(MongoConfig {
        connection_uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".into(),
        connect_eagerly: false,
        ..MongoConfig::default()
    }))
}

/// Manager connected to the deployment named by `MONGOBENCH_TEST_URI`.
pub fn live_manager() -> Arc<HandlerManager> {
    let uri =
        std::env::var(TEST_URI_ENV).unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    Arc::new(HandlerManager::new(MongoConfig {
        connection_uri: uri,
        ..MongoConfig::default()
    }))
}

pub fn create_test_app() -> (Router, Arc<HandlerManager>) {
    let manager = lazy_manager();
    (create_router(manager.clone()), manager)
}

/// POST a raw body with a JSON content type
pub async fn post_raw(app: &Router, path: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));
    (status, json)
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));
    (status, json)
}

pub fn is_object_id_hex(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}
