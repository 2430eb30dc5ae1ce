//! Dispatch API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Dispatch, DispatchMeta};
use crate::db::repository::dispatch::{DispatchFilter, TodayDispatches};
use crate::db::repository::{DispatchRepository, PageInfo, Pagination};
use crate::dispatch::ManifestEntry;
use crate::utils::{AppResult, ok_with_message};

/// 创建发货请求
#[derive(Debug, Deserialize)]
pub struct CreateDispatchRequest {
    pub order_no: String,
    pub manifest: Vec<ManifestEntry>,
    #[serde(flatten)]
    pub meta: DispatchMeta,
}

#[derive(Debug, Deserialize)]
pub struct DispatchListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DispatchListResponse {
    pub dispatches: Vec<Dispatch>,
    pub pagination: PageInfo,
}

/// 状态更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub tracking_id: Option<String>,
    pub remarks: Option<String>,
}

/// POST /api/dispatches - 创建发货
///
/// Phase 1 失败整体回滚并按错误语义返回 (404/400/409)；
/// Phase 2 库存记账失败不影响本接口的成功响应 (设计决定, 见工作流文档)。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateDispatchRequest>,
) -> AppResult<axum::Json<crate::utils::ApiResponse<Dispatch>>> {
    let workflow = state.dispatch_workflow();
    let dispatch = workflow
        .create_dispatch(&payload.order_no, payload.manifest, payload.meta)
        .await?;

    Ok(ok_with_message(dispatch, "Dispatch created successfully"))
}

/// GET /api/dispatches - 发货列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DispatchListQuery>,
) -> AppResult<Json<DispatchListResponse>> {
    let default = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(default.page),
        limit: query.limit.unwrap_or(default.limit),
    };
    let filter = DispatchFilter {
        status: query.status,
        search: query.search,
    };

    let repo = DispatchRepository::new(state.db.clone());
    let (dispatches, pagination) = repo.find_all(filter, pagination).await?;
    Ok(Json(DispatchListResponse {
        dispatches,
        pagination,
    }))
}

/// GET /api/dispatches/today - 今日发货面板
pub async fn today(State(state): State<ServerState>) -> AppResult<Json<TodayDispatches>> {
    let repo = DispatchRepository::new(state.db.clone());
    let today = repo.today().await?;
    Ok(Json(today))
}

/// GET /api/dispatches/{dispatch_no} - 发货详情
pub async fn get_by_no(
    State(state): State<ServerState>,
    Path(dispatch_no): Path<String>,
) -> AppResult<Json<Dispatch>> {
    let repo = DispatchRepository::new(state.db.clone());
    let dispatch = repo
        .find_by_dispatch_no(&dispatch_no)
        .await?
        .ok_or_else(|| {
            crate::utils::AppError::with_message(
                crate::utils::ErrorCode::DispatchNotFound,
                format!("Dispatch {dispatch_no} not found"),
            )
        })?;
    Ok(Json(dispatch))
}

/// PUT /api/dispatches/{dispatch_no}/status - 状态迁移
pub async fn update_status(
    State(state): State<ServerState>,
    Path(dispatch_no): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Dispatch>> {
    let workflow = state.dispatch_workflow();
    let dispatch = workflow
        .update_status(
            &dispatch_no,
            &payload.status,
            payload.tracking_id,
            payload.remarks,
        )
        .await?;

    tracing::info!(dispatch_no = %dispatch_no, status = %payload.status, "Dispatch status updated");
    Ok(Json(dispatch))
}
