pub mod health;
pub mod organizations;
pub mod validations;
pub mod validators;

use axum::http::Uri;
use regval_core::RegvalError;

use crate::error::AppError;

/// Router fallback so unknown paths still answer with a `detail` body.
pub async fn not_found(uri: Uri) -> AppError {
    AppError(RegvalError::NotFound(format!("route {}", uri.path())))
}
