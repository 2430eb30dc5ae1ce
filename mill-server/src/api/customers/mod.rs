//! Customer API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Customer router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/customers", get(handler::list))
        .route("/api/customers", post(handler::create))
        .route("/api/customers/{id}", get(handler::get_by_id))
}
