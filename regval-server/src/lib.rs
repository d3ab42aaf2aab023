//! regval-server: REST surface over `regval-core`.
//!
//! Organizations, the validator catalog and multipart validation uploads.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;

use std::sync::Arc;

use regval_core::audit::{MemoryAuditLog, DEFAULT_AUDIT_CAPACITY};
use regval_core::{EngineOptions, LayoutRegistry, MemoryOrganizationStore, ValidationEngine};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: ValidationEngine,
    pub audit: Arc<MemoryAuditLog>,
}

impl AppState {
    /// Wire an engine over in-memory organization and audit stores; the audit
    /// log keeps the latest `audit_capacity` runs.
    pub fn new(registry: LayoutRegistry, options: EngineOptions, audit_capacity: usize) -> Self {
        let audit = Arc::new(MemoryAuditLog::with_capacity(audit_capacity));
        let engine = ValidationEngine::new(
            Arc::new(registry),
            Arc::new(MemoryOrganizationStore::new()),
            options,
        )
        .with_audit(audit.clone());
        Self { engine, audit }
    }

    pub fn in_memory(registry: LayoutRegistry, options: EngineOptions) -> Self {
        Self::new(registry, options, DEFAULT_AUDIT_CAPACITY)
    }
}
