//! Route definitions for the procurement tracker

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes
        .merge(protected_routes(state))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/workflow/transitions", get(handlers::list_transitions))
        .nest("/products", product_routes())
        .route(
            "/configuration",
            get(handlers::get_configuration).put(handlers::put_configuration),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product pipeline routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_product))
        .route("/:sku", get(handlers::get_product))
        .route("/:sku/advance", post(handlers::advance_product))
        .route("/:sku/analysis", get(handlers::preview_analysis))
        .route("/:sku/exclusion", post(handlers::exclude_product))
}
