// Domain model: villages, alerts, scenarios
pub mod model;

// SQLite-backed document stores
pub mod store;

// Simulation dispatcher
pub mod simulation;

// HTTP API
pub mod api;

// Startup sample data
pub mod seed;

// Configuration
pub mod config;
