//! Inventory API Module
//!
//! 入库与库存汇总视图。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/inventory/summary | GET | 库存总览 |
//! | /api/inventory/search | GET | 原料 + 成品联合检索 |
//! | /api/inventory/report | GET | 库存报表 (全量清单) |
//! | /api/inventory/low-stock | GET | 低库存告警清单 |
//! | /api/inventory/products | POST | 成品入库 (合并或新建) |
//! | /api/inventory/raw-materials | POST | 原料入库 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Inventory router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/inventory/summary", get(handler::summary))
        .route("/api/inventory/search", get(handler::search))
        .route("/api/inventory/report", get(handler::report))
        .route("/api/inventory/low-stock", get(handler::low_stock))
        .route("/api/inventory/products", post(handler::intake_product))
        .route(
            "/api/inventory/raw-materials",
            post(handler::intake_raw_material),
        )
}
