//! Row parser: one physical line into positional column values.
//!
//! Plain delimiter split, no quoting. A column-count mismatch is reported
//! once for the line and the tokens are padded/truncated to the layout width;
//! the engine does not run field rules on such a line.

use crate::issue::{Issue, Severity};
use crate::layout::Layout;

#[derive(Debug, Clone, Copy)]
pub struct RowParser {
    trim_values: bool,
}

impl Default for RowParser {
    fn default() -> Self {
        Self { trim_values: true }
    }
}

impl RowParser {
    pub fn new(trim_values: bool) -> Self {
        Self { trim_values }
    }

    /// Split without any layout alignment (used for the header as well).
    pub fn split(&self, raw_line: &str, delimiter: char) -> Vec<String> {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        line.split(delimiter)
            .map(|token| {
                if self.trim_values {
                    token.trim().to_string()
                } else {
                    token.to_string()
                }
            })
            .collect()
    }

    pub fn parse(
        &self,
        raw_line: &str,
        layout: &Layout,
        line_number: u64,
    ) -> (Vec<String>, Vec<Issue>) {
        let mut tokens = self.split(raw_line, layout.delimiter);
        let expected = layout.column_count();
        let found = tokens.len();

        let mut issues = Vec::new();
        if found != expected {
            issues.push(Issue::line(
                line_number,
                Severity::Error,
                format!("expected {expected} columns, found {found}"),
            ));
            tokens.resize(expected, String::new());
        }
        (tokens, issues)
    }
}
