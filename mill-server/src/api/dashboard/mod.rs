//! Dashboard API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Dashboard router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/dashboard/manufacturing", get(handler::manufacturing))
}
