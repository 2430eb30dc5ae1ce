//! Product API Module (成品)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list))
        .route("/api/products/{item_id}", get(handler::get_by_item_id))
}
