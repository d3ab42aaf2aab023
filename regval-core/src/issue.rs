use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One inconsistency between an input file and its layout.
///
/// `line_number` and `column_name` are `None` for file-level findings
/// (header mismatch, no data rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub line_number: Option<u64>,
    pub column_name: Option<String>,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn file_level(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            line_number: None,
            column_name: None,
            severity,
            message: message.into(),
        }
    }

    pub fn line(line_number: u64, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            line_number: Some(line_number),
            column_name: None,
            severity,
            message: message.into(),
        }
    }

    pub fn field(
        line_number: u64,
        column_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line_number: Some(line_number),
            column_name: Some(column_name.into()),
            severity,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl SeverityCounts {
    pub fn tally(issues: &[Issue]) -> Self {
        issues.iter().fold(Self::default(), |mut acc, issue| {
            match issue.severity {
                Severity::Error => acc.errors += 1,
                Severity::Warning => acc.warnings += 1,
                Severity::Info => acc.infos += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    CompletedWithIssues,
}

/// Outcome of one validation run. Deterministic: the same bytes against the
/// same validator always produce an identical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub summary: String,
    pub issues: Vec<Issue>,
    pub rows_processed: u64,
    pub counts: SeverityCounts,
}

impl ValidationResult {
    /// Orders the issues (file-level first, then by line; within a line the
    /// emission order, i.e. field declaration order, is kept) and derives the
    /// summary.
    pub fn build(rows_processed: u64, mut issues: Vec<Issue>) -> Self {
        // Stable sort: None < Some(_), equal lines keep emission order.
        issues.sort_by_key(|issue| issue.line_number);
        let counts = SeverityCounts::tally(&issues);
        Self {
            summary: summarize(rows_processed, &counts),
            issues,
            rows_processed,
            counts,
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.counts.errors == 0 && self.counts.warnings == 0 {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithIssues
        }
    }
}

fn plural(n: impl Into<u64>, singular: &str, plural: &str) -> String {
    let n = n.into();
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// "42 rows processed, 3 errors, 1 warning" (plus ", N info" when present).
pub fn summarize(rows_processed: u64, counts: &SeverityCounts) -> String {
    let mut summary = format!(
        "{} processed, {}, {}",
        plural(rows_processed, "row", "rows"),
        plural(counts.errors as u64, "error", "errors"),
        plural(counts.warnings as u64, "warning", "warnings"),
    );
    if counts.infos > 0 {
        summary.push_str(&format!(", {} info", counts.infos));
    }
    summary
}
