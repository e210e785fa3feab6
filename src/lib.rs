//! Booking pricing and availability service for the guesthouse dashboard.

pub mod booking;
pub mod cache;
pub mod config;
pub mod error;
pub mod tenant;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::booking::BookingStore;
use crate::cache::AppCache;
use crate::config::Config;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookingStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            cache: AppCache::new(config.settings_cache_ttl),
            config,
        }
    }
}

/// Full application router with tracing and CORS
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(booking::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
