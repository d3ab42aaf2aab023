//! Validation endpoints.
//!
//! POST /validations takes `multipart/form-data` with text parts
//! `organization_id`, `validator_key` (aliases `regulator_key`, `regulator`)
//! and optional `layout_version`, followed by the `file` part. The file part
//! is streamed straight into the engine, so it must come last. A client that
//! disconnects mid-upload drops the handler future, which cancels the run.
//!
//! GET /validations lists the audit trail of completed runs.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use regval_core::{RegvalError, ValidationRequest};

use crate::dto::{AuditListResponse, ValidationResponse};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Default)]
struct ValidationForm {
    organization_id: Option<i64>,
    validator_key: Option<String>,
    layout_version: Option<String>,
}

impl ValidationForm {
    fn into_request(self) -> Result<ValidationRequest, RegvalError> {
        let organization_id = self.organization_id.ok_or_else(|| {
            RegvalError::InvalidPayload("organization_id must precede the file part".into())
        })?;
        let validator_key = self.validator_key.ok_or_else(|| {
            RegvalError::InvalidPayload("validator_key must precede the file part".into())
        })?;
        let request = ValidationRequest::new(organization_id, validator_key);
        Ok(match self.layout_version {
            Some(version) => request.with_layout_version(version),
            None => request,
        })
    }
}

pub async fn create_validation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidationResponse>, AppError> {
    let mut form = ValidationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(RegvalError::transport)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "organization_id" => {
                let raw = text(field).await?;
                let id = raw.trim().parse().map_err(|_| {
                    RegvalError::InvalidPayload(format!(
                        "organization_id must be an integer, got '{raw}'"
                    ))
                })?;
                form.organization_id = Some(id);
            }
            "validator_key" | "regulator_key" | "regulator" => {
                form.validator_key = Some(text(field).await?.trim().to_string());
            }
            "layout_version" => {
                let version = text(field).await?.trim().to_string();
                form.layout_version = (!version.is_empty()).then_some(version);
            }
            "file" => {
                let request = form.into_request()?;
                let organization_id = request.organization_id;
                let validator_key = request.validator_key.clone();
                tracing::debug!(
                    organization_id,
                    validator_key = %validator_key,
                    file_name = field.file_name().unwrap_or("-"),
                    "upload received"
                );
                let result = state
                    .engine
                    .validate_request(request, Box::pin(field))
                    .await?;
                return Ok(Json(ValidationResponse::new(
                    organization_id,
                    validator_key,
                    result,
                )));
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
            }
        }
    }

    Err(RegvalError::InvalidPayload("file part is required".into()).into())
}

pub async fn list_validations(
    State(state): State<AppState>,
) -> Result<Json<AuditListResponse>, AppError> {
    let runs = state.audit.records()?;
    let count = runs.len();
    Ok(Json(AuditListResponse { runs, count }))
}

async fn text(field: Field<'_>) -> Result<String, RegvalError> {
    field.text().await.map_err(RegvalError::transport)
}
