//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::AdapterHealth;

use crate::dto::health::{BillingHealthResponse, HealthResponse};
use crate::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes database)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let result = state.readiness.health_check().await;
    if result.status != AdapterHealth::Healthy {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Reports the billing capability established at startup
///
/// Always 200: running without direct integration is a supported mode.
pub async fn billing_health(State(state): State<AppState>) -> Json<BillingHealthResponse> {
    Json(BillingHealthResponse::from(state.capability.as_ref()))
}
