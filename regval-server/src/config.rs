//! Server configuration from environment variables.
//!
//!   REGVAL_BIND_ADDR          listen address (default: 0.0.0.0:8000)
//!   REGVAL_LAYOUTS_FILE       YAML validator catalog (default: built-in catalog)
//!   REGVAL_ENCODING           utf-8 | latin-1 (default: utf-8)
//!   REGVAL_DATE_FORMAT        chrono format for date fields (default: %Y-%m-%d)
//!   REGVAL_DECIMAL_SEPARATOR  decimal separator (default: .)
//!   REGVAL_TRIM_VALUES        trim column values (default: true)
//!   REGVAL_MAX_LINE_BYTES     longest accepted line (default: 1048576)
//!   REGVAL_MAX_UPLOAD_BYTES   request body limit (default: 52428800)
//!   REGVAL_AUDIT_CAPACITY     runs kept in the audit log (default: 1000)

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use regval_core::audit::DEFAULT_AUDIT_CAPACITY;
use regval_core::{EngineOptions, LayoutRegistry};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub layouts_file: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub audit_capacity: usize,
    pub engine: EngineOptions,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = EngineOptions::default();

        let engine = EngineOptions {
            encoding: parse_or(&lookup, "REGVAL_ENCODING", defaults.encoding)?,
            date_format: lookup("REGVAL_DATE_FORMAT").unwrap_or(defaults.date_format),
            decimal_separator: parse_or(
                &lookup,
                "REGVAL_DECIMAL_SEPARATOR",
                defaults.decimal_separator,
            )?,
            trim_values: parse_or(&lookup, "REGVAL_TRIM_VALUES", defaults.trim_values)?,
            max_line_bytes: parse_or(&lookup, "REGVAL_MAX_LINE_BYTES", defaults.max_line_bytes)?,
        };
        engine
            .check()
            .map_err(|e| anyhow!("invalid REGVAL_* engine settings: {e}"))?;

        Ok(Self {
            bind_addr: lookup("REGVAL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            layouts_file: lookup("REGVAL_LAYOUTS_FILE").map(PathBuf::from),
            max_upload_bytes: parse_or(&lookup, "REGVAL_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            audit_capacity: parse_or(&lookup, "REGVAL_AUDIT_CAPACITY", DEFAULT_AUDIT_CAPACITY)?,
            engine,
        })
    }

    /// Load the registry once; it is read-only from here on.
    pub fn load_registry(&self) -> Result<LayoutRegistry> {
        let registry = match &self.layouts_file {
            Some(path) => LayoutRegistry::from_yaml_file(path)
                .with_context(|| format!("loading validator catalog {}", path.display()))?,
            None => LayoutRegistry::with_builtin().context("loading built-in catalog")?,
        };
        for validator in registry.list() {
            self.engine.check_layout(&validator.layout).map_err(|e| {
                anyhow!(
                    "validator '{}' conflicts with REGVAL_DECIMAL_SEPARATOR: {e}",
                    validator.key
                )
            })?;
        }
        Ok(registry)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {key}='{raw}': {e}")),
        None => Ok(default),
    }
}
