//! HTTP protocol layer for the BeTus resumable upload server.
//!
//! This crate translates tus 1.0.0 requests into operations on the files
//! manager:
//! - OPTIONS capability discovery
//! - POST upload creation (with optional initial content)
//! - HEAD offset queries
//! - PATCH appends with optional SHA-1 verification
//! - DELETE termination

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod preconditions;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
