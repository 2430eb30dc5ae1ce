//! Production API Module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Production router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/production", get(handler::list))
        .route("/api/production", post(handler::create))
        .route("/api/production/schedule", get(handler::schedule))
        .route("/api/production/{id}/status", put(handler::update_status))
}
