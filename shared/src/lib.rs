//! Shared types for the Tarp Mill backend
//!
//! Common types used across crates: the unified error system,
//! the API response envelope and small utility helpers.

pub mod error;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
