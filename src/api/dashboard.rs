use crate::api::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Flat dashboard statistics, re-computed on every call
#[derive(Serialize)]
pub struct DashboardStats {
    pub total_villages: u64,
    pub active_alerts: u64,
    /// Active alerts with severity "critical"
    pub critical_alerts: u64,
    /// Villages whose alert list mentions "critical" (case-insensitive)
    pub critical_villages: u64,
    pub last_updated: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create dashboard API router
pub fn create_dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(get_stats))
        .with_state(Arc::new(state))
}

/// GET /api/dashboard/stats - Store-wide counters
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, DashboardError> {
    let total_villages = state.villages.count().map_err(DashboardError::Store)?;
    let active_alerts = state.alerts.count_active().map_err(DashboardError::Store)?;
    let critical_alerts = state
        .alerts
        .count_active_critical()
        .map_err(DashboardError::Store)?;
    let critical_villages = state
        .villages
        .count_with_critical_alerts()
        .map_err(DashboardError::Store)?;

    Ok(Json(DashboardStats {
        total_villages,
        active_alerts,
        critical_alerts,
        critical_villages,
        last_updated: Utc::now().to_rfc3339(),
    }))
}

/// Dashboard API error types
enum DashboardError {
    Store(anyhow::Error),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let DashboardError::Store(e) = self;
        error!(error = %e, "Dashboard stats query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal storage error".to_string(),
            }),
        )
            .into_response()
    }
}
