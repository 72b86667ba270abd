//! Axum HTTP API for the reelcast backend.
//!
//! Endpoints cover the upload → analyze → process → poll lifecycle:
//! multipart upload with synchronous format analysis, background rendition
//! processing per platform variant, a polled status endpoint, and static
//! delivery of source files and renditions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
