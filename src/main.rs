use anyhow::{Context, Result};
use axum::http::HeaderValue;
use sarpanch::api::{
    create_alert_router, create_dashboard_router, create_root_router, create_simulate_router,
    create_village_router, AppState,
};
use sarpanch::config::{load_config, CorsConfig, SarpanchConfig};
use sarpanch::seed::initialize_sample_data;
use sarpanch::store::Database;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sarpanch=info".into()),
        )
        .init();

    info!("Sarpanch starting...");

    // Load configuration file if present, then apply env overrides
    let config_path =
        std::env::var("SARPANCH_CONFIG").unwrap_or_else(|_| "sarpanch.toml".to_string());
    let mut config = if std::path::Path::new(&config_path).exists() {
        load_config(&config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Failed to load config from {}", config_path))?
    } else {
        SarpanchConfig::default()
    };

    if let Ok(port) = std::env::var("SARPANCH_PORT") {
        config.server.port = port
            .parse()
            .context("SARPANCH_PORT must be a valid port number")?;
    }
    if let Ok(db_path) = std::env::var("SARPANCH_DB") {
        config.database.path = db_path;
    }

    info!(
        bind = %config.server.bind,
        port = config.server.port,
        database = %config.database.path,
        "Configuration loaded"
    );

    // Open the document store
    let db = Database::open(&config.database.path).context("Failed to open database")?;

    // Seed sample villages on first run
    let seeded = initialize_sample_data(&db.villages())?;
    if !seeded {
        info!("Villages already present, skipping sample data");
    }

    // Compose routers
    let state = AppState::new(&db);
    let router = create_root_router()
        .merge(create_village_router(state.clone()))
        .merge(create_alert_router(state.clone()))
        .merge(create_simulate_router(state.clone()))
        .merge(create_dashboard_router(state))
        .layer(build_cors_layer(&config.cors));

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Sarpanch API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Sarpanch stopped");

    Ok(())
}

/// Builds the CORS layer from configured origins. "*" allows any origin;
/// unparseable entries are skipped with a warning.
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cors.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Skipping unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
