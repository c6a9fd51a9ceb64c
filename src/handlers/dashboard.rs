use axum::{extract::State, response::Json};
use crate::errors::AppResult;
use crate::models::{DashboardStats, ReportSummary};
use super::AppState;

pub async fn get_dashboard_stats(
    State((store, _)): State<AppState>,
) -> Json<DashboardStats> {
    let stats = store.dashboard_stats().await;
    tracing::debug!("Dashboard stats: {:?}", stats);
    Json(stats)
}

pub async fn get_report_summary(
    State((store, _)): State<AppState>,
) -> AppResult<Json<ReportSummary>> {
    tracing::info!("Building report summary");
    Ok(Json(store.report_summary().await?))
}
