//! Organization handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use core_kernel::OrganizationId;
use domain_customer::{DeletionOutcome, NewOrganization};

use crate::auth::AuthenticatedUser;
use crate::dto::organization::{
    CreateOrganizationRequest, CreateOrganizationResponse, OrganizationResponse,
};
use crate::error::ApiError;
use crate::middleware::operation_metadata;
use crate::AppState;

/// Creates an organization owned by the caller
///
/// Succeeds whenever the organization is stored; the `sync` field tells
/// whether the billing customer was linked or deferred.
pub async fn create_organization(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    headers: HeaderMap,
    payload: Result<Json<CreateOrganizationRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrganizationResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let metadata = operation_metadata(&headers, user_id.to_string());
    let created = state
        .lifecycle
        .create(NewOrganization::new(user_id, request.name), Some(metadata))
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Gets an organization; only its owner may read it
pub async fn get_organization(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrganizationResponse>, ApiError> {
    let organization = state
        .lifecycle
        .get_for(user_id, OrganizationId::from_uuid(id))
        .await?;

    Ok(Json(organization.into()))
}

/// Deletes an organization owned by the caller
///
/// Returns 204 whatever happened to the billing customer.
pub async fn delete_organization(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let metadata = operation_metadata(&headers, user_id.to_string());
    let outcome = state
        .lifecycle
        .delete_for(user_id, OrganizationId::from_uuid(id), Some(metadata))
        .await?;

    if let DeletionOutcome::Failed { customer_id, .. } = &outcome {
        info!(customer_id = %customer_id, "Organization deleted; billing customer left behind");
    }

    Ok(StatusCode::NO_CONTENT)
}
