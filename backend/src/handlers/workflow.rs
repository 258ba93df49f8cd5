//! HTTP handlers for the procurement workflow

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::TRANSITIONS;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::{AdvanceInput, CreateProductInput, PgWorkflowService},
    AppState,
};

fn service(state: &AppState) -> PgWorkflowService {
    PgWorkflowService::postgres(
        state.db.clone(),
        state.config.workflow.standard_container_cbm,
    )
}

/// The transition table, for clients rendering the pipeline
pub async fn list_transitions() -> impl IntoResponse {
    Json(TRANSITIONS)
}

/// Register a new product
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<impl IntoResponse> {
    let product = service(&state).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product with its stage history
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<impl IntoResponse> {
    let product = service(&state).get_product(&sku).await?;
    Ok(Json(product))
}

/// Apply the next transition
pub async fn advance_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sku): Path<String>,
    Json(input): Json<AdvanceInput>,
) -> AppResult<impl IntoResponse> {
    let result = service(&state).advance(&sku, input, user.role).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub selling_price: Option<Decimal>,
}

/// Read-only cost and margin preview
pub async fn preview_analysis(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(sku): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> AppResult<impl IntoResponse> {
    let analysis = service(&state)
        .preview_analysis(&sku, query.selling_price)
        .await?;
    Ok(Json(analysis))
}

/// Permanently exclude a product from the pipeline
pub async fn exclude_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<impl IntoResponse> {
    let product = service(&state).exclude_product(&sku, user.role).await?;
    Ok(Json(product))
}

/// Current cost configuration
pub async fn get_configuration(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let config = service(&state).current_configuration().await?;
    Ok(Json(config))
}

/// Replace the cost configuration
pub async fn put_configuration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(config): Json<shared::Configuration>,
) -> AppResult<impl IntoResponse> {
    let config = service(&state)
        .replace_configuration(config, user.role)
        .await?;
    Ok(Json(config))
}
