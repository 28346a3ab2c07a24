use crate::api::AppState;
use crate::model::{Village, VillageCreate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create village API router
pub fn create_village_router(state: AppState) -> Router {
    Router::new()
        .route("/api/villages", get(list_villages).post(create_village))
        .route("/api/villages/:id", get(get_village))
        .with_state(Arc::new(state))
}

/// GET /api/villages - All villages with their sensor data
async fn list_villages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Village>>, VillageError> {
    let villages = state.villages.list().map_err(VillageError::Store)?;
    Ok(Json(villages))
}

/// GET /api/villages/:id - Single village by id
async fn get_village(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Village>, VillageError> {
    let village = state
        .villages
        .get(&id)
        .map_err(VillageError::Store)?
        .ok_or(VillageError::NotFound)?;
    Ok(Json(village))
}

/// POST /api/villages - Create a new village
///
/// Malformed bodies are rejected by the Json extractor before this runs.
async fn create_village(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<VillageCreate>,
) -> Result<Json<Village>, VillageError> {
    let village = state.villages.create(fields).map_err(VillageError::Store)?;
    info!(village_id = %village.id, name = %village.name, "Village created");
    Ok(Json(village))
}

/// Village API error types
enum VillageError {
    NotFound,
    Store(anyhow::Error),
}

impl IntoResponse for VillageError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            VillageError::NotFound => {
                (StatusCode::NOT_FOUND, "Village not found".to_string())
            }
            VillageError::Store(e) => {
                error!(error = %e, "Village store operation failed");
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
