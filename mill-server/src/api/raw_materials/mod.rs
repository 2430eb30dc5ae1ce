//! Raw Material API Module (原料)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Raw material router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/raw-materials", get(handler::list))
        .route("/api/raw-materials/{item_id}", get(handler::get_by_item_id))
        .route(
            "/api/raw-materials/{item_id}/stock",
            put(handler::update_stock),
        )
}
