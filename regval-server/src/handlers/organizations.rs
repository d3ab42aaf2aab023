//! Organization endpoints.
//!
//! POST /organizations      create (201)
//! GET  /organizations      list, ordered by id
//! GET  /organizations/:id  fetch one

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use regval_core::{NewOrganization, Organization, RegvalError};

use crate::error::AppError;
use crate::AppState;

pub async fn create_organization(
    State(state): State<AppState>,
    payload: Result<Json<NewOrganization>, JsonRejection>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    let Json(new) = payload.map_err(|e| RegvalError::InvalidPayload(e.body_text()))?;
    let organization = state.engine.organizations().create(new).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>, AppError> {
    Ok(Json(state.engine.organizations().list().await?))
}

pub async fn get_organization(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, AppError> {
    let Path(id) = id.map_err(|e| RegvalError::InvalidPayload(e.body_text()))?;
    state
        .engine
        .organizations()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| RegvalError::OrganizationNotFound(id).into())
}
