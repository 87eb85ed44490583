use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod browse;
pub mod search;
pub mod sessions;
mod state;

pub use state::{AppState, SearchSettings};

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search::search))
        .route("/browse", get(browse::browse_all))
        .route("/browse/:list", get(browse::browse_list))
        .route("/movies/:id", get(browse::movie_details))
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:id", delete(sessions::close_session))
        .route("/sessions/:id/input", put(sessions::input_change))
        .route(
            "/sessions/:id/suggestions",
            get(sessions::suggestions).delete(sessions::dismiss_suggestions),
        )
        .route("/sessions/:id/view-all", post(sessions::view_all))
        .route("/sessions/:id/results", get(sessions::results))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
