//! Per-run audit records.
//!
//! The run id and timestamps live here, never in the `ValidationResult`,
//! which keeps results byte-identical across repeated runs.

use std::collections::VecDeque;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::issue::RunStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationAudit {
    pub run_id: Uuid,
    pub organization_id: i64,
    pub organization_name: String,
    pub validator_key: String,
    pub regulator: String,
    pub layout_version: String,
    pub status: RunStatus,
    pub summary: String,
    pub rows_processed: u64,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, audit: ValidationAudit) -> Result<()>;
}

pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// In-memory audit log holding the most recent `capacity` runs; older
/// records are evicted first.
pub struct MemoryAuditLog {
    capacity: usize,
    records: RwLock<VecDeque<ValidationAudit>>,
}

impl Default for MemoryAuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> Result<Vec<ValidationAudit>> {
        let records = self.records.read().map_err(|e| anyhow!("Lock: {}", e))?;
        Ok(records.iter().cloned().collect())
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record(&self, audit: ValidationAudit) -> Result<()> {
        let mut records = self.records.write().map_err(|e| anyhow!("Lock: {}", e))?;
        if records.len() == self.capacity {
            if let Some(evicted) = records.pop_front() {
                tracing::debug!(run_id = %evicted.run_id, "audit record evicted");
            }
        }
        records.push_back(audit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn audit(rows: u64) -> ValidationAudit {
        let now = Utc::now();
        ValidationAudit {
            run_id: Uuid::new_v4(),
            organization_id: 1,
            organization_name: "Acquirer One".into(),
            validator_key: "bacen".into(),
            regulator: "BACEN".into(),
            layout_version: "1.0".into(),
            status: RunStatus::Completed,
            summary: format!("{rows} rows processed, 0 errors, 0 warnings"),
            rows_processed: rows,
            errors: 0,
            warnings: 0,
            infos: 0,
            started_at: now,
            finished_at: now,
        }
    }

    #[tokio::test]
    async fn keeps_records_in_arrival_order() {
        let log = MemoryAuditLog::new();
        log.record(audit(1)).await.unwrap();
        log.record(audit(2)).await.unwrap();
        let rows: Vec<_> = log.records().unwrap().iter().map(|r| r.rows_processed).collect();
        assert_eq!(rows, vec![1, 2]);
        assert_eq!(log.capacity(), DEFAULT_AUDIT_CAPACITY);
    }

    #[tokio::test]
    async fn oldest_records_are_evicted_at_capacity() {
        let log = MemoryAuditLog::with_capacity(3);
        for rows in 1..=5 {
            log.record(audit(rows)).await.unwrap();
        }
        let rows: Vec<_> = log.records().unwrap().iter().map(|r| r.rows_processed).collect();
        assert_eq!(rows, vec![3, 4, 5]);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_run() {
        assert_eq!(MemoryAuditLog::with_capacity(0).capacity(), 1);
    }
}
