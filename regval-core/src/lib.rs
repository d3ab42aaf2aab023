//! regval-core: layout-driven validation of regulatory data files.
//!
//! Pure domain crate: layouts and their registry, per-field rules, the row
//! parser and the streaming orchestrator, plus the organization and audit
//! collaborators the orchestrator reads from and reports to. No HTTP here;
//! `regval-server` exposes it over REST.

pub mod audit;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod issue;
pub mod layout;
pub mod lines;
pub mod options;
pub mod organization;
pub mod parser;
pub mod registry;
pub mod rules;

pub use engine::{ValidationEngine, ValidationRequest};
pub use error::{RegvalError, Result};
pub use issue::{Issue, RunStatus, Severity, SeverityCounts, ValidationResult};
pub use layout::{FieldDefinition, FieldType, Layout, Validator};
pub use options::{Encoding, EngineOptions};
pub use organization::{
    MemoryOrganizationStore, NewOrganization, Organization, OrganizationRole, OrganizationStore,
};
pub use registry::LayoutRegistry;
