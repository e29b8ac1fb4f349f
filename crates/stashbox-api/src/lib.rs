//! # stashbox-api
//!
//! HTTP API layer for Stashbox built on Axum.
//!
//! Provides the file tree REST endpoints, middleware (CORS, request
//! logging, timeouts, body limits), the caller identity extractor, DTOs,
//! and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
