//! Layout registry.
//!
//! Built once at startup (register phase), then frozen behind an `Arc` and
//! only read while serving. No interior mutability, so lookups on the hot
//! path take no locks.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::catalog;
use crate::error::{RegvalError, Result};
use crate::layout::Validator;

#[derive(Debug, Default, Clone)]
pub struct LayoutRegistry {
    validators: Vec<Validator>,
    index: HashMap<String, usize>,
}

/// On-disk catalog shape.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    validators: Vec<Validator>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in regulator catalog.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        for validator in catalog::builtin_validators() {
            registry.register(validator)?;
        }
        Ok(registry)
    }

    /// Registry loaded from a YAML catalog document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: CatalogFile =
            serde_yaml::from_str(yaml).context("failed to parse validator catalog")?;
        let mut registry = Self::new();
        for validator in catalog.validators {
            registry.register(validator)?;
        }
        Ok(registry)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read validator catalog {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Add a validator. Fails on a duplicate key or a malformed layout, and
    /// leaves the registry unchanged in either case.
    pub fn register(&mut self, validator: Validator) -> Result<()> {
        if self.index.contains_key(&validator.key) {
            return Err(RegvalError::DuplicateKey(validator.key));
        }
        validator
            .layout
            .check()
            .map_err(|reason| RegvalError::InvalidLayout {
                key: validator.key.clone(),
                reason,
            })?;

        tracing::debug!(
            key = %validator.key,
            regulator = %validator.regulator,
            version = %validator.layout.version,
            "registered validator"
        );
        self.index
            .insert(validator.key.clone(), self.validators.len());
        self.validators.push(validator);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&Validator> {
        self.index
            .get(key)
            .map(|&i| &self.validators[i])
            .ok_or_else(|| RegvalError::NotFound(format!("validator '{key}'")))
    }

    /// All validators in registration order.
    pub fn list(&self) -> &[Validator] {
        &self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
