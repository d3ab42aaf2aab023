//! Validation orchestrator.
//!
//! ```text
//! byte chunks ──► LineSplitter ──► decode ──► header check (line 1)
//!                                         └─► RowParser ──► FieldRuleEvaluator ──► issues
//! ```
//!
//! Single forward pass; only the current line is materialised. The registry
//! and organization store are read, never written.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use uuid::Uuid;

use crate::audit::{AuditSink, ValidationAudit};
use crate::error::{RegvalError, Result};
use crate::issue::{Issue, Severity, ValidationResult};
use crate::layout::{Layout, Validator};
use crate::lines::{LineSplitter, RawLine};
use crate::options::{EngineOptions, Encoding};
use crate::organization::OrganizationStore;
use crate::parser::RowParser;
use crate::registry::LayoutRegistry;
use crate::rules::{FieldRuleEvaluator, IssueContext};

/// One validation request. `layout_version` pins the expected layout
/// version; `cancel` aborts the run when it flips to `true`.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub organization_id: i64,
    pub validator_key: String,
    pub layout_version: Option<String>,
    pub cancel: Option<watch::Receiver<bool>>,
}

impl ValidationRequest {
    pub fn new(organization_id: i64, validator_key: impl Into<String>) -> Self {
        Self {
            organization_id,
            validator_key: validator_key.into(),
            layout_version: None,
            cancel: None,
        }
    }

    pub fn with_layout_version(mut self, version: impl Into<String>) -> Self {
        self.layout_version = Some(version.into());
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Cheap to clone; every member is shared.
#[derive(Clone)]
pub struct ValidationEngine {
    registry: Arc<LayoutRegistry>,
    organizations: Arc<dyn OrganizationStore>,
    audit: Option<Arc<dyn AuditSink>>,
    evaluator: Arc<FieldRuleEvaluator>,
    options: Arc<EngineOptions>,
}

impl ValidationEngine {
    pub fn new(
        registry: Arc<LayoutRegistry>,
        organizations: Arc<dyn OrganizationStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            registry,
            organizations,
            audit: None,
            evaluator: Arc::new(FieldRuleEvaluator::new(&options)),
            options: Arc::new(options),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_evaluator(mut self, evaluator: FieldRuleEvaluator) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn organizations(&self) -> &Arc<dyn OrganizationStore> {
        &self.organizations
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub async fn validate<S, B, E>(
        &self,
        organization_id: i64,
        validator_key: &str,
        file_stream: S,
    ) -> Result<ValidationResult>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        self.validate_request(
            ValidationRequest::new(organization_id, validator_key),
            file_stream,
        )
        .await
    }

    /// Validate an in-memory file.
    pub async fn validate_bytes(
        &self,
        organization_id: i64,
        validator_key: &str,
        bytes: &[u8],
    ) -> Result<ValidationResult> {
        let stream = futures::stream::iter([Ok::<_, Infallible>(bytes)]);
        self.validate(organization_id, validator_key, stream).await
    }

    pub async fn validate_request<S, B, E>(
        &self,
        request: ValidationRequest,
        mut file_stream: S,
    ) -> Result<ValidationResult>
    where
        S: Stream<Item = std::result::Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let ValidationRequest {
            organization_id,
            validator_key,
            layout_version,
            mut cancel,
        } = request;

        let validator = self.resolve(&validator_key, layout_version.as_deref())?;
        let organization = self
            .organizations
            .get(organization_id)
            .await?
            .ok_or(RegvalError::OrganizationNotFound(organization_id))?;

        let started_at = Utc::now();
        tracing::debug!(
            validator_key = %validator.key,
            organization_id,
            "validation started"
        );

        let mut run = RunState::new(&validator.layout, &self.evaluator, &self.options);
        let mut splitter = LineSplitter::new(self.options.max_line_bytes);

        loop {
            let chunk = match next_chunk(&mut file_stream, &mut cancel).await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    if matches!(err, RegvalError::Cancelled) {
                        tracing::warn!(
                            validator_key = %validator.key,
                            organization_id,
                            lines = run.data_lines,
                            "validation cancelled, partial results discarded"
                        );
                    }
                    return Err(err);
                }
            };
            splitter.push(chunk.as_ref(), &mut |line| run.accept(line));
        }
        splitter.finish(&mut |line| run.accept(line));

        let result = run.finish()?;
        tracing::info!(
            validator_key = %validator.key,
            organization_id,
            rows = result.rows_processed,
            errors = result.counts.errors,
            warnings = result.counts.warnings,
            "validation finished"
        );

        if let Some(audit) = &self.audit {
            let record = ValidationAudit {
                run_id: Uuid::new_v4(),
                organization_id,
                organization_name: organization.name,
                validator_key: validator.key.clone(),
                regulator: validator.regulator.clone(),
                layout_version: validator.layout.version.clone(),
                status: result.status(),
                summary: result.summary.clone(),
                rows_processed: result.rows_processed,
                errors: result.counts.errors,
                warnings: result.counts.warnings,
                infos: result.counts.infos,
                started_at,
                finished_at: Utc::now(),
            };
            if let Err(e) = audit.record(record).await {
                tracing::warn!(error = %e, validator_key = %validator.key, "failed to record audit");
            }
        }

        Ok(result)
    }

    fn resolve(&self, key: &str, layout_version: Option<&str>) -> Result<&Validator> {
        let validator = self
            .registry
            .get(key)
            .map_err(|_| RegvalError::ValidatorNotFound(key.to_string()))?;
        match layout_version {
            Some(version) if version != validator.layout.version => {
                return Err(RegvalError::ValidatorNotFound(format!(
                    "{key} (layout version {version}; available {})",
                    validator.layout.version
                )));
            }
            _ => {}
        }
        self.options
            .check_layout(&validator.layout)
            .map_err(|reason| RegvalError::InvalidLayout {
                key: key.to_string(),
                reason,
            })?;
        Ok(validator)
    }
}

async fn next_chunk<S, B, E>(
    stream: &mut S,
    cancel: &mut Option<watch::Receiver<bool>>,
) -> Result<Option<B>>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    E: std::fmt::Display,
{
    loop {
        let Some(rx) = cancel.as_mut() else {
            return stream.next().await.transpose().map_err(RegvalError::transport);
        };
        if *rx.borrow_and_update() {
            return Err(RegvalError::Cancelled);
        }
        let sender_gone = tokio::select! {
            item = stream.next() => {
                return item.transpose().map_err(RegvalError::transport);
            }
            changed = rx.changed() => changed.is_err(),
        };
        if sender_gone {
            // Nobody can cancel any more.
            *cancel = None;
        }
    }
}

/// Mutable state of one run. Lives only for the duration of `validate`.
struct RunState<'a> {
    layout: &'a Layout,
    evaluator: &'a FieldRuleEvaluator,
    parser: RowParser,
    encoding: Encoding,
    max_line_bytes: usize,
    header_seen: bool,
    /// Physical lines after the header, blank ones included.
    data_lines: u64,
    rows_processed: u64,
    issues: Vec<Issue>,
}

impl<'a> RunState<'a> {
    fn new(layout: &'a Layout, evaluator: &'a FieldRuleEvaluator, options: &EngineOptions) -> Self {
        Self {
            layout,
            evaluator,
            parser: RowParser::new(options.trim_values),
            encoding: options.encoding,
            max_line_bytes: options.max_line_bytes,
            header_seen: false,
            data_lines: 0,
            rows_processed: 0,
            issues: Vec::new(),
        }
    }

    fn accept(&mut self, line: RawLine<'_>) {
        if self.header_seen {
            self.data_lines += 1;
        }
        let line_number = self.data_lines;

        let bytes = match line {
            RawLine::Oversized { len } => {
                self.unreadable_line(format!(
                    "line exceeds {} bytes ({len} bytes)",
                    self.max_line_bytes
                ));
                return;
            }
            RawLine::Text(bytes) => bytes,
        };

        let Some(text) = self.encoding.decode(bytes) else {
            self.unreadable_line(format!("line is not valid {}", self.encoding.label()));
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        if !self.header_seen {
            self.header_seen = true;
            self.check_header(text.trim_start_matches('\u{feff}'));
            return;
        }

        self.rows_processed += 1;
        let (values, row_issues) = self.parser.parse(&text, self.layout, line_number);
        if !row_issues.is_empty() {
            // A misaligned row gets its column-count issue and nothing else.
            self.issues.extend(row_issues);
            return;
        }
        for (column_index, (value, field)) in values.iter().zip(&self.layout.fields).enumerate() {
            let ctx = IssueContext {
                line_number,
                column_index,
            };
            self.issues
                .extend(self.evaluator.evaluate(value, field, ctx));
        }
    }

    /// Oversized or undecodable line: one error, the line is otherwise skipped.
    fn unreadable_line(&mut self, message: String) {
        if self.header_seen {
            self.rows_processed += 1;
            self.issues
                .push(Issue::line(self.data_lines, Severity::Error, message));
        } else {
            self.header_seen = true;
            self.issues.push(Issue::file_level(
                Severity::Error,
                format!("unreadable header: {message}"),
            ));
        }
    }

    fn check_header(&mut self, header: &str) {
        let found = self.parser.split(header, self.layout.delimiter);
        let matches = found.len() == self.layout.column_count()
            && found
                .iter()
                .zip(&self.layout.fields)
                .all(|(token, field)| token.trim().to_lowercase() == field.name.to_lowercase());
        if matches {
            return;
        }

        let delimiter = self.layout.delimiter.to_string();
        let expected: Vec<&str> = self.layout.fields.iter().map(|f| f.name.as_str()).collect();
        self.issues.push(Issue::file_level(
            Severity::Warning,
            format!(
                "header does not match layout '{}': expected \"{}\", found \"{}\"",
                self.layout.name,
                expected.join(&delimiter),
                found.join(&delimiter)
            ),
        ));
    }

    fn finish(mut self) -> Result<ValidationResult> {
        if !self.header_seen {
            return Err(RegvalError::EmptyFile);
        }
        if self.rows_processed == 0 {
            self.issues.push(Issue::file_level(
                Severity::Info,
                "file contains no data rows",
            ));
        }
        Ok(ValidationResult::build(self.rows_processed, self.issues))
    }
}
