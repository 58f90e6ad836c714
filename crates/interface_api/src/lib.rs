//! HTTP API Layer
//!
//! This crate exposes the organization lifecycle over REST using Axum.
//! Creating or deleting an organization drives the billing customer sync;
//! the sync outcome is reported but never fails the request.
//!
//! # Architecture
//!
//! - **Handlers**: Organization lifecycle and health endpoints
//! - **Middleware**: Authentication, request ids, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_customer::{CapabilitySnapshot, OrganizationLifecycle};

use crate::config::ApiConfig;
use crate::handlers::{health, organization};
use crate::middleware::{audit_middleware, auth_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: OrganizationLifecycle,
    /// Capability frozen at startup
    pub capability: Arc<CapabilitySnapshot>,
    /// Backing store checked by `/health/ready`
    pub readiness: Arc<dyn HealthCheckable>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/billing", get(health::billing_health));

    let organization_routes = Router::new()
        .route("/", post(organization::create_organization))
        .route(
            "/:id",
            get(organization::get_organization).delete(organization::delete_organization),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/organizations", organization_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
