use axum::{
    http::{HeaderValue, StatusCode},
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::{RatingStore, WatchlistStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    models::MediaKind,
    services::providers::CatalogProvider,
};

pub mod catalog;
pub mod extract;
pub mod ratings;
pub mod recommendations;
pub mod watchlist;

/// Shared handles every handler works through
pub struct AppState {
    pub ratings: Arc<dyn RatingStore>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        watchlist: Arc<dyn WatchlistStore>,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            ratings,
            watchlist,
            catalog,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/movies", catalog::media_routes(MediaKind::Movie))
        .nest("/tv", catalog::media_routes(MediaKind::Tv))
        .route("/genres/:media_type", get(catalog::genres))
        .route("/ratings", get(ratings::list).post(ratings::create))
        .route(
            "/ratings/:rating_id",
            put(ratings::update).delete(ratings::delete),
        )
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route("/watchlist/:item_id", delete(watchlist::remove))
}

/// CORS policy from the configured origin list; `*` allows any origin
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
