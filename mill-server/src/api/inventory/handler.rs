//! Inventory API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Product, RawMaterial, RawMaterialCreate};
use crate::db::repository::product::{ProductAttrs, ProductFilter};
use crate::db::repository::raw_material::RawMaterialFilter;
use crate::db::repository::report::InventorySummary;
use crate::db::repository::{
    Pagination, ProductRepository, RawMaterialRepository, ReportRepository,
};
use crate::stock::StockKind;
use crate::utils::{AppError, AppResult};

/// GET /api/inventory/summary - 库存总览
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<InventorySummary>> {
    let repo = ReportRepository::new(state.db.clone());
    let summary = repo.inventory_summary().await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub raw_materials: Vec<RawMaterial>,
    pub products: Vec<Product>,
}

/// GET /api/inventory/search - 原料 + 成品联合检索
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    if query.query.trim().is_empty() {
        return Err(AppError::validation("Search query is required"));
    }

    let rm_repo = RawMaterialRepository::new(state.db.clone());
    let raw_materials = rm_repo
        .find_all(RawMaterialFilter {
            status: query.status.clone(),
            search: Some(query.query.clone()),
        })
        .await?;

    // 成品按名称/编号过滤 (分页)
    let product_repo = ProductRepository::new(state.db.clone());
    let default = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(default.page),
        limit: query.limit.unwrap_or(default.limit),
    };
    let (all_products, _) = product_repo
        .find_all(
            ProductFilter {
                status: query.status,
                product_type: None,
            },
            pagination,
        )
        .await?;
    let needle = query.query.to_lowercase();
    let products = all_products
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.item_id.to_lowercase().contains(&needle)
        })
        .collect();

    Ok(Json(SearchResponse {
        raw_materials,
        products,
    }))
}

#[derive(Debug, Serialize)]
pub struct InventoryReport {
    pub raw_materials: Vec<RawMaterial>,
    pub products: Vec<Product>,
}

/// GET /api/inventory/report - 库存报表 (全量清单)
pub async fn report(State(state): State<ServerState>) -> AppResult<Json<InventoryReport>> {
    let rm_repo = RawMaterialRepository::new(state.db.clone());
    let raw_materials = rm_repo.find_all(RawMaterialFilter::default()).await?;

    let product_repo = ProductRepository::new(state.db.clone());
    let (products, _) = product_repo
        .find_all(
            ProductFilter::default(),
            Pagination {
                page: 1,
                limit: 1000,
            },
        )
        .await?;

    Ok(Json(InventoryReport {
        raw_materials,
        products,
    }))
}

/// GET /api/inventory/low-stock - 低库存清单
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<RawMaterial>>> {
    let repo = RawMaterialRepository::new(state.db.clone());
    let alerts = repo.find_low_stock().await?;
    Ok(Json(alerts))
}

/// POST /api/inventory/products - 成品入库
///
/// 属性元组已存在 -> 经 StockLedger 合并数量；否则创建新品类并分配编号。
pub async fn intake_product(
    State(state): State<ServerState>,
    Json(intake): Json<crate::db::models::ProductIntake>,
) -> AppResult<Json<Product>> {
    if intake.quantity <= 0.0 {
        return Err(AppError::validation("quantity must be positive"));
    }

    let repo = ProductRepository::new(state.db.clone());
    let attrs = ProductAttrs {
        name: intake.name.clone(),
        product_type: intake.product_type,
        gsm: intake.gsm,
        color_top: intake.color_top.clone(),
        color_bottom: intake.color_bottom.clone(),
        width: intake.width,
        length: intake.length,
        roll_type: intake.roll_type.clone(),
    };

    let existing = repo.find_by_attributes(&attrs).await?;
    if let Some(product) = existing.into_iter().next() {
        let key = product
            .id
            .as_ref()
            .expect("loaded record has an id")
            .key()
            .to_string();
        state
            .stock
            .increment(StockKind::Product, &key, intake.quantity)
            .await?;
        let updated = repo
            .find_by_item_id(&product.item_id)
            .await?
            .ok_or_else(|| AppError::database("Product vanished after intake"))?;
        tracing::info!(item_id = %updated.item_id, quantity = intake.quantity, "Product stock merged");
        return Ok(Json(updated));
    }

    let product = repo.create_from_intake(intake).await?;
    tracing::info!(item_id = %product.item_id, "New product kind created");
    Ok(Json(product))
}

/// POST /api/inventory/raw-materials - 原料入库
pub async fn intake_raw_material(
    State(state): State<ServerState>,
    Json(payload): Json<RawMaterialCreate>,
) -> AppResult<Json<RawMaterial>> {
    let repo = RawMaterialRepository::new(state.db.clone());
    let material = repo.create(payload).await?;
    Ok(Json(material))
}
