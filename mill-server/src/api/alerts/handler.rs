//! Alert API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::db::models::Alert;
use crate::db::repository::AlertRepository;
use crate::db::repository::alert::AlertFilter;
use crate::utils::AppResult;

/// GET /api/alerts - 告警列表
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<Vec<Alert>>> {
    let repo = AlertRepository::new(state.db.clone());
    let alerts = repo.find_all(filter).await?;
    Ok(Json(alerts))
}

/// PUT /api/alerts/{id}/read - 标记已读
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Alert>> {
    let repo = AlertRepository::new(state.db.clone());
    let alert = repo.mark_read(&id).await?;
    Ok(Json(alert))
}
