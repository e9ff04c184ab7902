//! HTTP API Layer
//!
//! REST surface of the claims workflow engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claim intake, approval decisions, reserve reporting
//! - **Middleware**: tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(engine);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_claims::ClaimsEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{claims, health, reserves};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ClaimsEngine>,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `engine` - Claims engine backed by its repository
pub fn create_router(engine: Arc<ClaimsEngine>) -> Router {
    let state = AppState { engine };

    let public_routes = Router::new().route("/health", get(health::health_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim).get(claims::list_claims))
        .route("/queue", get(claims::queue_summary))
        .route("/:id", get(claims::get_claim))
        .route("/:id/decision", post(claims::decide_claim));

    let reserves_routes = Router::new()
        .route("/snapshot", get(reserves::reserve_snapshot))
        .route(
            "/adjustments",
            post(reserves::record_adjustment).get(reserves::list_adjustments),
        )
        .route("/adjustments/statistics", get(reserves::adjustment_statistics));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/reserves", reserves_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
