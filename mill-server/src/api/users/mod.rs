//! User API Module
//!
//! 用户管理，全部需要管理员角色。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// User router (admin only)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users", post(handler::create))
        .route("/api/users/{id}", put(handler::update))
        .route("/api/users/{id}", delete(handler::remove))
        .layer(middleware::from_fn(require_admin))
}
