//! Dashboard API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::ReportRepository;
use crate::db::repository::report::ManufacturingDashboard;
use crate::utils::AppResult;

/// GET /api/dashboard/manufacturing - 制造仪表盘
pub async fn manufacturing(
    State(state): State<ServerState>,
) -> AppResult<Json<ManufacturingDashboard>> {
    let repo = ReportRepository::new(state.db.clone());
    let dashboard = repo.manufacturing_dashboard().await?;
    Ok(Json(dashboard))
}
