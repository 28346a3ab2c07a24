use crate::api::AppState;
use crate::model::Alert;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Request body for triggering a simulation scenario
#[derive(Deserialize)]
pub struct SimulationTrigger {
    pub scenario: String,
    pub village_id: String,
    #[serde(default = "default_severity")]
    pub severity: String,
}

fn default_severity() -> String {
    "medium".to_string()
}

/// Composite acknowledgment for a triggered simulation
#[derive(Serialize)]
pub struct TriggerResponse {
    pub message: String,
    pub alert: Alert,
    pub timestamp: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create simulation API router
pub fn create_simulate_router(state: AppState) -> Router {
    Router::new()
        .route("/api/simulate/trigger", post(trigger_simulation))
        .with_state(Arc::new(state))
}

/// POST /api/simulate/trigger - Synthesize a scenario alert for a village
async fn trigger_simulation(
    State(state): State<Arc<AppState>>,
    Json(trigger): Json<SimulationTrigger>,
) -> Result<Json<TriggerResponse>, SimulateError> {
    let outcome = state
        .simulator
        .trigger(&trigger.scenario, &trigger.village_id, &trigger.severity)
        .map_err(SimulateError::Store)?
        .ok_or(SimulateError::VillageNotFound)?;

    Ok(Json(TriggerResponse {
        message: outcome.message,
        alert: outcome.alert,
        timestamp: outcome.timestamp.to_rfc3339(),
    }))
}

/// Simulation API error types
enum SimulateError {
    VillageNotFound,
    Store(anyhow::Error),
}

impl IntoResponse for SimulateError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            SimulateError::VillageNotFound => {
                (StatusCode::NOT_FOUND, "Village not found".to_string())
            }
            SimulateError::Store(e) => {
                error!(error = %e, "Simulation trigger failed");
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
