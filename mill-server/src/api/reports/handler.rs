//! Report API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::ReportRepository;
use crate::db::repository::report::BusinessSummary;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// month | quarter | year (默认 month)
    pub period: Option<String>,
}

/// GET /api/reports/summary - 经营摘要
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<BusinessSummary>> {
    let period = query.period.as_deref().unwrap_or("month");
    let repo = ReportRepository::new(state.db.clone());
    let summary = repo.business_summary(period).await?;
    Ok(Json(summary))
}
