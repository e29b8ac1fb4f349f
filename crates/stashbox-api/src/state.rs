//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use stashbox_core::config::AppConfig;
use stashbox_service::FileTreeService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// File tree store
    pub tree_service: Arc<FileTreeService>,
}

impl AppState {
    /// Bundle the configuration and the file tree service.
    pub fn new(config: Arc<AppConfig>, tree_service: Arc<FileTreeService>) -> Self {
        Self {
            config,
            tree_service,
        }
    }
}
