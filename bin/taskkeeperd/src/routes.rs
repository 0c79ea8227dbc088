//! Top-level router: health endpoints plus the task API under `/api`.

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use taskkeeper_core::Module;
use taskkeeper_task::TaskModule;

use crate::config::ServerConfig;

pub fn build_router(config: &ServerConfig, task: &TaskModule) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api", task.routes())
        .layer(cors_layer(config)?);
    info!(module = task.name(), "mounted module under /api");
    Ok(router)
}

/// The dashboard is served from a different origin than the API, so
/// cross-origin requests are allowed. A single origin can be pinned in
/// the configuration; the default accepts any.
fn cors_layer(config: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let layer = match config.http.cors_origin.as_deref() {
        Some(origin) if origin != "*" => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid cors origin '{origin}'"))?;
            CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any)
        }
        _ => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };
    Ok(layer)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({ "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}
