//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, list_files, rename_file, upload_files, AppState,
};
use super::middleware::{create_cors_layer, security_headers};
use crate::config::WebConfig;

/// Create the file API router.
///
/// `body_limit` is the request body ceiling in bytes; uploads beyond it are
/// rejected with 413.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig, body_limit: usize) -> Router {
    let file_routes = Router::new()
        .route("/api/files", post(upload_files))
        .route("/api/files/list", get(list_files))
        .route("/api/files/:name/download", get(download_file))
        .route("/api/files/:name/delete", delete(delete_file))
        .route("/api/files/:name/rename", put(rename_file));

    file_routes
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve the UI bundle, falling back to `index.html` for client-side routes.
///
/// Returns `None` when the bundle directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let root = Path::new(static_path);
    if !root.is_dir() {
        tracing::warn!("Static path not found: {}", static_path);
        return None;
    }

    let serve_dir = ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")));
    Some(Router::new().fallback_service(serve_dir))
}

/// Expose the store directory read-only under `/files`.
pub fn create_public_files_router(storage_path: &Path) -> Router {
    Router::new().nest_service("/files", ServeDir::new(storage_path))
}
