//! Order API Module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders", post(handler::create))
        .route("/api/orders/book", get(handler::order_book))
        .route("/api/orders/{order_no}", get(handler::get_detail))
        .route("/api/orders/{order_no}/status", put(handler::update_status))
}
