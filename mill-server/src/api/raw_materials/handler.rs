//! Raw Material API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::db::models::{RawMaterial, RawMaterialStockUpdate};
use crate::db::repository::RawMaterialRepository;
use crate::db::repository::raw_material::RawMaterialFilter;
use crate::stock::StockKind;
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/raw-materials - 原料列表
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<RawMaterialFilter>,
) -> AppResult<Json<Vec<RawMaterial>>> {
    let repo = RawMaterialRepository::new(state.db.clone());
    let materials = repo.find_all(filter).await?;
    Ok(Json(materials))
}

/// GET /api/raw-materials/{item_id} - 单个原料
pub async fn get_by_item_id(
    State(state): State<ServerState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<RawMaterial>> {
    let repo = RawMaterialRepository::new(state.db.clone());
    let material = repo.find_by_item_id(&item_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RawMaterialNotFound,
            format!("Raw material {item_id} not found"),
        )
    })?;
    Ok(Json(material))
}

/// PUT /api/raw-materials/{item_id}/stock - 人工盘点库存
///
/// 经由 StockLedger 写入，状态随之重算。
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(item_id): Path<String>,
    Json(payload): Json<RawMaterialStockUpdate>,
) -> AppResult<Json<RawMaterial>> {
    let repo = RawMaterialRepository::new(state.db.clone());
    let material = repo.find_by_item_id(&item_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RawMaterialNotFound,
            format!("Raw material {item_id} not found"),
        )
    })?;
    let key = material
        .id
        .as_ref()
        .expect("loaded record has an id")
        .key()
        .to_string();

    state
        .stock
        .set_absolute(StockKind::RawMaterial, &key, payload.stock)
        .await?;

    let updated = repo
        .find_by_item_id(&item_id)
        .await?
        .ok_or_else(|| AppError::database("Raw material vanished after update"))?;
    Ok(Json(updated))
}
