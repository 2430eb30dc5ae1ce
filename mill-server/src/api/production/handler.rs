//! Production API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{ProductionBatch, ProductionBatchCreate, ProductionStatus};
use crate::db::repository::ProductionRepository;
use crate::db::repository::production::{ProductionFilter, ScheduleRow};
use crate::stock::StockKind;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 状态更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/production - 批次列表
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ProductionFilter>,
) -> AppResult<Json<Vec<ProductionBatch>>> {
    let repo = ProductionRepository::new(state.db.clone());
    let batches = repo.find_all(filter).await?;
    Ok(Json(batches))
}

/// POST /api/production - 创建批次
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductionBatchCreate>,
) -> AppResult<Json<ProductionBatch>> {
    let repo = ProductionRepository::new(state.db.clone());
    let batch = repo.create(payload).await?;
    tracing::info!(batch_id = %batch.batch_id, quantity = batch.quantity, "Production batch created");
    Ok(Json(batch))
}

/// GET /api/production/schedule - 生产排程
pub async fn schedule(State(state): State<ServerState>) -> AppResult<Json<Vec<ScheduleRow>>> {
    let repo = ProductionRepository::new(state.db.clone());
    let rows = repo.schedule().await?;
    Ok(Json(rows))
}

/// PUT /api/production/{id}/status - 批次状态更新
///
/// COMPLETED 时经 StockLedger 为产品入库并扣减声明的原料。
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ProductionBatch>> {
    let status = ProductionStatus::parse(&payload.status).ok_or_else(|| {
        AppError::new(ErrorCode::BatchInvalidStatus).with_detail("status", payload.status.clone())
    })?;

    let repo = ProductionRepository::new(state.db.clone());
    let previous = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BatchNotFound))?;

    let batch = repo.update_status(&id, status).await?;

    // 入库只在首次进入 COMPLETED 时发生一次
    if status == ProductionStatus::Completed && previous.status != ProductionStatus::Completed {
        let product_key = batch.product.key().to_string();
        state
            .stock
            .increment(StockKind::Product, &product_key, batch.quantity as f64)
            .await?;

        for requirement in &batch.materials {
            let material_key = requirement.raw_material.key().to_string();
            let consumed = requirement.quantity_per_unit * batch.quantity as f64;
            state
                .stock
                .decrement(StockKind::RawMaterial, &material_key, consumed)
                .await?;
        }

        tracing::info!(
            batch_id = %batch.batch_id,
            quantity = batch.quantity,
            "Production completed, stock updated"
        );
    }

    Ok(Json(batch))
}
