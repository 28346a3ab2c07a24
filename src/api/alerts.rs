use crate::api::AppState;
use crate::model::Alert;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Query parameters for the alert list
#[derive(Deserialize)]
pub struct AlertListParams {
    /// Restrict to undismissed alerts (default: true)
    pub active_only: Option<bool>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct DismissResponse {
    message: String,
}

/// Create alert API router
pub fn create_alert_router(state: AppState) -> Router {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id", get(list_village_alerts))
        .route("/api/alerts/:id/dismiss", patch(dismiss_alert))
        .with_state(Arc::new(state))
}

/// GET /api/alerts?active_only= - All alerts, newest first
async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertListParams>,
) -> Result<Json<Vec<Alert>>, AlertError> {
    let active_only = params.active_only.unwrap_or(true);
    let alerts = state
        .alerts
        .list_all(active_only)
        .map_err(AlertError::Store)?;
    Ok(Json(alerts))
}

/// GET /api/alerts/:id - Alerts for one village, newest first
async fn list_village_alerts(
    State(state): State<Arc<AppState>>,
    Path(village_id): Path<String>,
) -> Result<Json<Vec<Alert>>, AlertError> {
    let alerts = state
        .alerts
        .list_by_village(&village_id)
        .map_err(AlertError::Store)?;
    Ok(Json(alerts))
}

/// PATCH /api/alerts/:id/dismiss - Deactivate an alert (idempotent)
async fn dismiss_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<DismissResponse>, AlertError> {
    let dismissed = state
        .alerts
        .dismiss(&alert_id)
        .map_err(AlertError::Store)?;
    if !dismissed {
        return Err(AlertError::NotFound);
    }

    info!(alert_id = %alert_id, "Alert dismissed");
    Ok(Json(DismissResponse {
        message: "Alert dismissed successfully".to_string(),
    }))
}

/// Alert API error types
enum AlertError {
    NotFound,
    Store(anyhow::Error),
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AlertError::NotFound => (StatusCode::NOT_FOUND, "Alert not found".to_string()),
            AlertError::Store(e) => {
                error!(error = %e, "Alert store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal storage error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
