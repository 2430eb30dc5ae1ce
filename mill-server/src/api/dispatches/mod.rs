//! Dispatch API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/dispatches | GET | 发货列表 (分页) |
//! | /api/dispatches | POST | 创建发货 (两阶段工作流) |
//! | /api/dispatches/today | GET | 今日发货面板 |
//! | /api/dispatches/{dispatch_no}/status | PUT | 状态迁移 (DELIVERED 级联订单) |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Dispatch router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dispatches", get(handler::list))
        .route("/api/dispatches", post(handler::create))
        .route("/api/dispatches/today", get(handler::today))
        .route("/api/dispatches/{dispatch_no}", get(handler::get_by_no))
        .route(
            "/api/dispatches/{dispatch_no}/status",
            put(handler::update_status),
        )
}
