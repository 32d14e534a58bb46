use axum::{
    extract::{Path, State},
    response::Json,
};
use mongodb::bson::Document;
use serde_json::Value;
use std::sync::Arc;

use crate::db::{DatabaseName, DriverKind, HandlerManager, InsertAck, Record, TableName};
use crate::error::BenchResult;

#[derive(Clone)]
pub struct AppState {
    pub handlers: Arc<HandlerManager>,
    pub startup_time: std::time::Instant,
}

impl AppState {
    pub fn new(handlers: Arc<HandlerManager>) -> Self {
        Self {
            handlers,
            startup_time: std::time::Instant::now(),
        }
    }
}

// ==================== Health ====================

/// Root liveness message with the current UTC time
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "message": format!(
            "Service is up and well as of {} UTC.",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f")
        )
    }))
}

/// Detailed status: uptime and which handlers are live
pub async fn health_status(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_secs": state.startup_time.elapsed().as_secs(),
        "handlers": state.handlers.live_handlers(),
        "constructed": state.handlers.constructed(),
    }))
}

// ==================== Async routes ====================

/// `POST /async/{driver}`: insert through the chosen driver from an async route.
pub async fn add_new_record(
    State(state): State<AppState>,
    Path(driver): Path<String>,
    Json(record): Json<Record>,
) -> BenchResult<Json<InsertAck>> {
    let kind: DriverKind = driver.parse()?;
    let handler = state
        .handlers
        .get_handler(DatabaseName::Testing, kind)
        .await?;

    let ack = handler.set(TableName::PostUser, record.into()).await?;
    Ok(Json(ack))
}

/// `GET /async/{driver}`: read every record through the chosen driver.
pub async fn get_all_records(
    State(state): State<AppState>,
    Path(driver): Path<String>,
) -> BenchResult<Json<Vec<Document>>> {
    let kind: DriverKind = driver.parse()?;
    let handler = state
        .handlers
        .get_handler(DatabaseName::Testing, kind)
        .await?;

    let records = handler.get_all(TableName::GetUser).await?;
    Ok(Json(records))
}

// ==================== Sync routes ====================
// These run on the blocking thread pool, like a synchronous route served by
// a worker thread.

/// `POST /sync/pymongo`
pub async fn sync_add_new_record(
    State(state): State<AppState>,
    Json(record): Json<Record>,
) -> BenchResult<Json<InsertAck>> {
    let handler = state
        .handlers
        .get_handler(DatabaseName::Testing, DriverKind::Blocking)
        .await?;

    let ack = tokio::task::spawn_blocking(move || {
        handler.blocking()?.set(TableName::PostUser, record.into())
    })
    .await??;
    Ok(Json(ack))
}

/// `GET /sync/pymongo`
pub async fn sync_get_all_records(
    State(state): State<AppState>,
) -> BenchResult<Json<Vec<Document>>> {
    let handler = state
        .handlers
        .get_handler(DatabaseName::Testing, DriverKind::Blocking)
        .await?;

    let records =
        tokio::task::spawn_blocking(move || handler.blocking()?.get_all(TableName::GetUser))
            .await??;
    Ok(Json(records))
}
