//! Router construction for the validation server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::AppState;

/// Build the full axum router. `max_upload_bytes` caps request bodies.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        // Organizations
        .route(
            "/organizations",
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            "/organizations/:id",
            get(handlers::organizations::get_organization),
        )
        // Catalog
        .route("/validators", get(handlers::validators::list_validators))
        .route("/validators/:key", get(handlers::validators::get_validator))
        // Runs
        .route(
            "/validations",
            post(handlers::validations::create_validation)
                .get(handlers::validations::list_validations),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
