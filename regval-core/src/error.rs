use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegvalError>;

/// Request-level failures. Row and field problems never surface here; they
/// degrade to [`crate::issue::Issue`] entries instead.
#[derive(Debug, Error)]
pub enum RegvalError {
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("duplicate validator key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid layout for validator '{key}': {reason}")]
    InvalidLayout { key: String, reason: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("organization not found: {0}")]
    OrganizationNotFound(i64),

    /// Upstream stream failure, reported with the transport's own message.
    #[error("{0}")]
    Transport(String),

    #[error("validation cancelled")]
    Cancelled,

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RegvalError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Stable machine-checkable kind, safe to match on across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidatorNotFound(_) => "validator_not_found",
            Self::EmptyFile => "empty_file",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::InvalidLayout { .. } => "invalid_layout",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::OrganizationNotFound(_) => "organization_not_found",
            Self::Transport(_) => "transport_error",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidatorNotFound(_) => 422,
            Self::EmptyFile => 400,
            Self::DuplicateKey(_) => 409,
            Self::NotFound(_) => 404,
            Self::InvalidLayout { .. } => 500,
            Self::InvalidPayload(_) => 400,
            Self::OrganizationNotFound(_) => 404,
            Self::Transport(_) => 400,
            Self::Cancelled => 499,
            Self::Internal(_) => 500,
        }
    }
}
