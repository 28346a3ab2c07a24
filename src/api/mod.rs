// HTTP API surface

pub mod alerts;
pub mod dashboard;
pub mod simulate;
pub mod villages;

pub use alerts::create_alert_router;
pub use dashboard::create_dashboard_router;
pub use simulate::create_simulate_router;
pub use villages::create_village_router;

use crate::simulation::Simulator;
use crate::store::{AlertStore, Database, VillageStore};
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub villages: VillageStore,
    pub alerts: AlertStore,
    pub simulator: Simulator,
}

impl AppState {
    pub fn new(db: &Database) -> Self {
        Self {
            villages: db.villages(),
            alerts: db.alerts(),
            simulator: Simulator::new(db.clone()),
        }
    }
}

/// Create the root banner router
pub fn create_root_router() -> Router {
    Router::new().route("/api/", get(root))
}

/// GET /api/ - Service banner
async fn root() -> Json<Value> {
    Json(json!({ "message": "Sarpanch API - Village Monitoring System" }))
}
