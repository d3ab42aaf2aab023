//! Organization records and the store the engine resolves them from.
//!
//! Organizations are the institutions a validation run is filed for. The
//! engine only reads them; creation is the single write path.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RegvalError, Result};

pub const MAX_NAME_LENGTH: usize = 255;
pub const TAX_ID_LENGTH: std::ops::RangeInclusive<usize> = 14..=18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    ReportingInstitution,
    Regulator,
    Auditor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub role: OrganizationRole,
    /// CNPJ, formatted (`12.345.678/0001-90`) or bare digits.
    pub tax_id: String,
}

/// Fields required to create an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub role: OrganizationRole,
    pub tax_id: String,
}

impl NewOrganization {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegvalError::InvalidPayload("name must not be blank".into()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(RegvalError::InvalidPayload(format!(
                "name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        let tax_id_len = self.tax_id.trim().chars().count();
        if !TAX_ID_LENGTH.contains(&tax_id_len) {
            return Err(RegvalError::InvalidPayload(format!(
                "tax_id must be between {} and {} characters, got {tax_id_len}",
                TAX_ID_LENGTH.start(),
                TAX_ID_LENGTH.end()
            )));
        }
        Ok(())
    }
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn create(&self, new: NewOrganization) -> Result<Organization>;
    /// Ordered by id.
    async fn list(&self) -> Result<Vec<Organization>>;
    async fn get(&self, id: i64) -> Result<Option<Organization>>;
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, Organization>,
}

/// In-memory store. Id assignment happens under the write lock, so
/// concurrent creates never hand out the same id.
#[derive(Default)]
pub struct MemoryOrganizationStore {
    inner: RwLock<Inner>,
}

impl MemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationStore for MemoryOrganizationStore {
    async fn create(&self, new: NewOrganization) -> Result<Organization> {
        new.validate()?;
        let mut inner = self.inner.write().map_err(|e| anyhow!("Lock: {}", e))?;
        inner.next_id += 1;
        let organization = Organization {
            id: inner.next_id,
            name: new.name.trim().to_string(),
            role: new.role,
            tax_id: new.tax_id.trim().to_string(),
        };
        inner.records.insert(organization.id, organization.clone());
        tracing::info!(id = organization.id, name = %organization.name, "organization created");
        Ok(organization)
    }

    async fn list(&self) -> Result<Vec<Organization>> {
        let inner = self.inner.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(inner.records.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Organization>> {
        let inner = self.inner.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(inner.records.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn acme() -> NewOrganization {
        NewOrganization {
            name: "Acquirer One".into(),
            role: OrganizationRole::ReportingInstitution,
            tax_id: "12.345.678/0001-90".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryOrganizationStore::new();
        let first = store.create(acme()).await.unwrap();
        let second = store.create(acme()).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.get(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let store = MemoryOrganizationStore::new();
        assert_eq!(store.get(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_without_consuming_an_id() {
        let store = MemoryOrganizationStore::new();
        let mut bad = acme();
        bad.tax_id = "123".into();
        let err = store.create(bad).await.unwrap_err();
        assert!(matches!(err, RegvalError::InvalidPayload(_)));

        let ok = store.create(acme()).await.unwrap();
        assert_eq!(ok.id, 1);
    }

    #[test]
    fn blank_name_is_invalid() {
        let mut org = acme();
        org.name = "   ".into();
        assert!(org.validate().is_err());
    }

    #[test]
    fn role_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&OrganizationRole::ReportingInstitution).unwrap();
        assert_eq!(json, "\"reporting_institution\"");
        assert!(serde_json::from_str::<OrganizationRole>("\"adquirente\"").is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_unique_ids() {
        let store = Arc::new(MemoryOrganizationStore::new());
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(acme()).await.unwrap().id })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
    }
}
