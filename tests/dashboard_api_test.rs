// Integration tests for the dashboard stats endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sarpanch::api::{create_dashboard_router, AppState};
use sarpanch::model::VillageCreate;
use sarpanch::seed::initialize_sample_data;
use sarpanch::store::Database;
use serde_json::Value;
use tower::ServiceExt;

fn create_test_app(seed: bool) -> (Router, Database) {
    let db = Database::open(":memory:").unwrap();
    if seed {
        initialize_sample_data(&db.villages()).unwrap();
    }
    let app = create_dashboard_router(AppState::new(&db));
    (app, db)
}

fn village_fields(name: &str) -> VillageCreate {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "district": "D",
        "state": "S",
        "crop": "wheat",
        "coords": [20.0, 75.0]
    }))
    .unwrap()
}

async fn fetch_stats(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/dashboard/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_stats_on_empty_store() {
    let (app, _db) = create_test_app(false);

    let stats = fetch_stats(&app).await;
    assert_eq!(stats["total_villages"], 0);
    assert_eq!(stats["active_alerts"], 0);
    assert_eq!(stats["critical_alerts"], 0);
    assert_eq!(stats["critical_villages"], 0);
    assert!(stats["last_updated"].is_string());
}

#[tokio::test]
async fn test_stats_reflect_seeded_data() {
    let (app, _db) = create_test_app(true);

    let stats = fetch_stats(&app).await;
    assert_eq!(stats["total_villages"], 4);
    // Only Manjari's seed alerts mention "CRITICAL"
    assert_eq!(stats["critical_villages"], 1);
}

#[tokio::test]
async fn test_stats_increase_by_exact_deltas() {
    let (app, db) = create_test_app(true);

    let before = fetch_stats(&app).await;

    // N = 2 new villages, M = 3 new active alerts
    db.villages().create(village_fields("Newpura")).unwrap();
    db.villages().create(village_fields("Otherpura")).unwrap();
    db.alerts().create("v", "drought", "a", "high").unwrap();
    db.alerts().create("v", "flood", "b", "critical").unwrap();
    db.alerts().create("v", "pest", "c", "low").unwrap();

    let after = fetch_stats(&app).await;

    assert_eq!(
        after["total_villages"].as_u64().unwrap(),
        before["total_villages"].as_u64().unwrap() + 2
    );
    assert_eq!(
        after["active_alerts"].as_u64().unwrap(),
        before["active_alerts"].as_u64().unwrap() + 3
    );
    assert_eq!(
        after["critical_alerts"].as_u64().unwrap(),
        before["critical_alerts"].as_u64().unwrap() + 1
    );
}

#[tokio::test]
async fn test_dismissed_alerts_leave_active_counts() {
    let (app, db) = create_test_app(false);

    let keep = db.alerts().create("v", "drought", "keep", "critical").unwrap();
    let gone = db.alerts().create("v", "flood", "gone", "critical").unwrap();
    db.alerts().dismiss(&gone.id).unwrap();

    let stats = fetch_stats(&app).await;
    assert_eq!(stats["active_alerts"], 1);
    assert_eq!(stats["critical_alerts"], 1);

    db.alerts().dismiss(&keep.id).unwrap();
    let stats = fetch_stats(&app).await;
    assert_eq!(stats["active_alerts"], 0);
    assert_eq!(stats["critical_alerts"], 0);
}
