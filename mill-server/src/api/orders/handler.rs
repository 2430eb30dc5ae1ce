//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus, OrderStatusUpdate};
use crate::db::repository::order::{OrderBook, OrderDetail, OrderFilter, OrderSummary};
use crate::db::repository::{OrderRepository, PageInfo, Pagination};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderListQuery {
    fn split(self) -> (OrderFilter, Pagination) {
        let default = Pagination::default();
        (
            OrderFilter {
                status: self.status,
                search: self.search,
            },
            Pagination {
                page: self.page.unwrap_or(default.page),
                limit: self.limit.unwrap_or(default.limit),
            },
        )
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderSummary>,
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct OrderBookQuery {
    pub filter: Option<String>,
}

/// GET /api/orders - 订单列表 (分页 + 过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let (filter, pagination) = query.split();
    let repo = OrderRepository::new(state.db.clone());
    let (orders, pagination) = repo.find_all(filter, pagination).await?;
    Ok(Json(OrderListResponse { orders, pagination }))
}

/// POST /api/orders - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let user_id = RecordId::from_table_key("user", user.id.as_str());
    let order = repo.create(payload, Some(user_id)).await?;

    tracing::info!(order_no = %order.order_no, total = order.total, "Order created");
    Ok(Json(order))
}

/// GET /api/orders/book - 订单簿 (计数 + 最近订单)
pub async fn order_book(
    State(state): State<ServerState>,
    Query(query): Query<OrderBookQuery>,
) -> AppResult<Json<OrderBook>> {
    // UI 过滤标签映射到状态值
    let status = query.filter.as_deref().and_then(|f| match f {
        "In Production" => Some("IN_PRODUCTION".to_string()),
        "Completed" => Some("COMPLETED".to_string()),
        _ => None,
    });

    let repo = OrderRepository::new(state.db.clone());
    let book = repo.order_book(status).await?;
    Ok(Json(book))
}

/// GET /api/orders/{order_no} - 订单详情
pub async fn get_detail(
    State(state): State<ServerState>,
    Path(order_no): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.db.clone());
    let detail = repo.get_detail(&order_no).await.map_err(|e| match e {
        crate::db::repository::RepoError::NotFound(_) => {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_no} not found"))
        }
        other => other.into(),
    })?;
    Ok(Json(detail))
}

/// PUT /api/orders/{order_no}/status - 显式状态更新
///
/// 状态机校验见 OrderStatus::may_enter；
/// 绕过发货工作流直达 SHIPPED / DELIVERED 会被拒绝。
pub async fn update_status(
    State(state): State<ServerState>,
    Path(order_no): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let status = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::new(ErrorCode::OrderInvalidStatus).with_detail("status", payload.status.clone())
    })?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.update_status(&order_no, status).await?;

    tracing::info!(order_no = %order_no, status = ?status, "Order status updated");
    Ok(Json(order))
}
