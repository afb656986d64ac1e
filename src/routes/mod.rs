use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod catalog;
pub mod feed;
pub mod friends;
pub mod lists;
pub mod profiles;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Identity
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/profiles/search", get(profiles::search))
        // Lists
        .route("/lists/:kind", get(lists::get_list).post(lists::add_entry))
        .route("/lists/:kind/:item_id", delete(lists::remove_entry))
        // Social graph
        .route("/friends", get(friends::list_friends))
        .route(
            "/friends/requests",
            get(friends::list_requests).post(friends::send_request),
        )
        .route("/friends/requests/:sender_id/accept", post(friends::accept_request))
        .route(
            "/friends/requests/:sender_id/decline",
            post(friends::decline_request),
        )
        // Feed
        .route("/feed", get(feed::get_feed))
        // Catalog proxy
        .route("/catalog/search", get(catalog::search))
        .route("/catalog/:kind/:item_id/providers", get(catalog::watch_providers))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
