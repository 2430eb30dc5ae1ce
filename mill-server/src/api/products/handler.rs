//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::Product;
use crate::db::repository::product::ProductFilter;
use crate::db::repository::{PageInfo, Pagination, ProductRepository};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
}

/// GET /api/products - 成品列表 (分页 + 过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let default = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(default.page),
        limit: query.limit.unwrap_or(default.limit),
    };
    let filter = ProductFilter {
        status: query.status,
        product_type: query.product_type,
    };

    let repo = ProductRepository::new(state.db.clone());
    let (products, pagination) = repo.find_all(filter, pagination).await?;
    Ok(Json(ProductListResponse {
        products,
        pagination,
    }))
}

/// GET /api/products/{item_id} - 单个成品
pub async fn get_by_item_id(
    State(state): State<ServerState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_item_id(&item_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {item_id} not found"))
        })?;
    Ok(Json(product))
}
