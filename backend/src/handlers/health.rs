//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::{ConfigurationProvider, PgConfigurationProvider};
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    /// Whether approvals can currently run the cost engine
    pub cost_configuration: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let provider = PgConfigurationProvider::new(
        state.db.clone(),
        state.config.workflow.standard_container_cbm,
    );
    let cost_configuration = match provider.current_configuration().await {
        Ok(config) => match config.resolve() {
            Ok(_) => "complete".to_string(),
            Err(e) => e.to_string(),
        },
        Err(_) => "unavailable".to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        cost_configuration,
    })
}
