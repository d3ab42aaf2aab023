//! Wire shapes that differ from the domain types.
//!
//! Organizations and issues serialise as-is; validators and validation runs
//! are reshaped for the public contract.

use regval_core::audit::ValidationAudit;
use regval_core::{FieldDefinition, FieldType, Issue, RunStatus, ValidationResult, Validator};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FieldRead {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl From<&FieldDefinition> for FieldRead {
    fn from(field: &FieldDefinition) -> Self {
        let allowed = match &field.kind {
            FieldType::Enum { allowed } => Some(allowed.clone()),
            _ => None,
        };
        Self {
            name: field.name.clone(),
            kind: field.kind.name(),
            required: field.required,
            max_length: field.max_length,
            allowed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LayoutRead {
    pub name: String,
    pub version: String,
    pub fields: Vec<FieldRead>,
}

#[derive(Debug, Serialize)]
pub struct ValidatorRead {
    pub regulator: String,
    pub key: String,
    pub layout: LayoutRead,
}

impl From<&Validator> for ValidatorRead {
    fn from(validator: &Validator) -> Self {
        Self {
            regulator: validator.regulator.clone(),
            key: validator.key.clone(),
            layout: LayoutRead {
                name: validator.layout.name.clone(),
                version: validator.layout.version.clone(),
                fields: validator.layout.fields.iter().map(FieldRead::from).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationRead {
    pub summary: String,
    pub validator_key: String,
    pub organization_id: i64,
    pub status: RunStatus,
    pub rows_processed: u64,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub validation: ValidationRead,
    pub issues: Vec<Issue>,
}

impl ValidationResponse {
    pub fn new(organization_id: i64, validator_key: String, result: ValidationResult) -> Self {
        let status = result.status();
        Self {
            validation: ValidationRead {
                summary: result.summary,
                validator_key,
                organization_id,
                status,
                rows_processed: result.rows_processed,
            },
            issues: result.issues,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub runs: Vec<ValidationAudit>,
    pub count: usize,
}
