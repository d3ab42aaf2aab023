//! HTTP rendering of domain errors.
//!
//! Every non-2xx body is `{"detail": <message>, "kind": <stable kind>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regval_core::RegvalError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: &'static str,
}

#[derive(Debug)]
pub struct AppError(pub RegvalError);

impl From<RegvalError> for AppError {
    fn from(err: RegvalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
        } else {
            tracing::warn!(kind = self.0.kind(), error = %self.0, "request rejected");
        }
        let body = ErrorBody {
            detail: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
