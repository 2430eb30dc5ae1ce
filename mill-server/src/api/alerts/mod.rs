//! Alert API Module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Alert router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/alerts", get(handler::list))
        .route("/api/alerts/{id}/read", put(handler::mark_read))
}
