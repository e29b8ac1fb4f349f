//! Route definitions for the Stashbox HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(folder_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(middleware::timeout::build_timeout_layer(
            server.request_timeout_seconds,
        ))
        .layer(middleware::compression::build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// File listing, lookup, mutation, and deletion
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_children).post(handlers::file::create_node),
        )
        .route("/files/starred", get(handlers::file::list_starred))
        .route(
            "/files/trash",
            get(handlers::file::list_trash).delete(handlers::file::empty_trash),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_node)
                .patch(handlers::file::update_node)
                .delete(handlers::file::delete_node),
        )
        .route("/files/{id}/breadcrumbs", get(handlers::file::breadcrumbs))
        .route("/files/{id}/star", patch(handlers::file::toggle_star))
        .route("/files/{id}/trash", patch(handlers::file::toggle_trash))
}

/// Folder creation and nested view
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/tree", get(handlers::folder::get_tree))
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
