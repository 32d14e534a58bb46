use axum::http::Method;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::*;
use crate::db::HandlerManager;

pub fn create_router(handlers: Arc<HandlerManager>) -> Router {
    let state = AppState::new(handlers);

    Router::new()
        // Health
        .route("/", get(health_check))
        .route("/health", get(health_status))
        // Async routes: driver chosen per request
        .route(
            "/async/{driver}",
            get(get_all_records).post(add_new_record),
        )
        // Sync routes: blocking driver on the blocking pool
        .route(
            "/sync/pymongo",
            get(sync_get_all_records).post(sync_add_new_record),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
}
