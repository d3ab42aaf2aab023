//! Field rule evaluator.
//!
//! Rules run in a fixed order (required, length, type) and stop at the first
//! failure, so a single bad cell yields at most one issue per line.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::issue::{Issue, Severity};
use crate::layout::{FieldDefinition, FieldTypeVisitor};
use crate::options::EngineOptions;

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Where in the file a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueContext {
    pub line_number: u64,
    pub column_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Continue with the next rule.
    Pass,
    /// Value is acceptable, skip the remaining rules.
    Skip,
    Fail(String),
}

pub trait FieldRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, value: &str, field: &FieldDefinition) -> RuleOutcome;
}

pub struct RequiredRule;

impl FieldRule for RequiredRule {
    fn name(&self) -> &'static str {
        "required"
    }

    fn check(&self, value: &str, field: &FieldDefinition) -> RuleOutcome {
        match (value.is_empty(), field.required) {
            (true, true) => RuleOutcome::Fail("missing required value".to_string()),
            // absent optional value: nothing else to check
            (true, false) => RuleOutcome::Skip,
            _ => RuleOutcome::Pass,
        }
    }
}

pub struct MaxLengthRule;

impl FieldRule for MaxLengthRule {
    fn name(&self) -> &'static str {
        "max_length"
    }

    fn check(&self, value: &str, field: &FieldDefinition) -> RuleOutcome {
        let Some(max) = field.max_length else {
            return RuleOutcome::Pass;
        };
        let len = value.chars().count();
        if len > max {
            RuleOutcome::Fail(format!(
                "value too long: {len} characters, maximum {max}"
            ))
        } else {
            RuleOutcome::Pass
        }
    }
}

pub struct TypeRule {
    decimal_re: Regex,
    date_format: String,
    date_label: String,
}

impl TypeRule {
    pub fn new(options: &EngineOptions) -> Self {
        let sep = regex::escape(&options.decimal_separator.to_string());
        let decimal_re = Regex::new(&format!(r"^[+-]?(?:\d+(?:{sep}\d+)?|{sep}\d+)$"))
            .expect("decimal pattern is built from an escaped literal");
        Self {
            decimal_re,
            date_format: options.date_format.clone(),
            date_label: options.date_format_label(),
        }
    }
}

impl FieldRule for TypeRule {
    fn name(&self) -> &'static str {
        "type"
    }

    fn check(&self, value: &str, field: &FieldDefinition) -> RuleOutcome {
        let mut check = TypeCheck { rule: self, value };
        match field.kind.accept(&mut check) {
            Ok(()) => RuleOutcome::Pass,
            Err(message) => RuleOutcome::Fail(message),
        }
    }
}

struct TypeCheck<'a> {
    rule: &'a TypeRule,
    value: &'a str,
}

impl FieldTypeVisitor for TypeCheck<'_> {
    type Output = Result<(), String>;

    fn visit_string(&mut self) -> Self::Output {
        Ok(())
    }

    fn visit_integer(&mut self) -> Self::Output {
        if INTEGER_RE.is_match(self.value) {
            Ok(())
        } else {
            Err(format!("invalid integer '{}'", self.value))
        }
    }

    fn visit_decimal(&mut self) -> Self::Output {
        if self.rule.decimal_re.is_match(self.value) {
            Ok(())
        } else {
            Err(format!("invalid decimal '{}'", self.value))
        }
    }

    fn visit_date(&mut self) -> Self::Output {
        let fmt = self.rule.date_format.as_str();
        // Round-trip so unpadded forms like 2024-1-5 are rejected too.
        match NaiveDate::parse_from_str(self.value, fmt) {
            Ok(date) if formats_back_to(date, fmt, self.value) => Ok(()),
            _ => Err(format!(
                "invalid date '{}', expected {}",
                self.value, self.rule.date_label
            )),
        }
    }

    fn visit_enum(&mut self, allowed: &[String]) -> Self::Output {
        if allowed.iter().any(|a| a == self.value) {
            Ok(())
        } else {
            Err(format!(
                "invalid value '{}', expected one of: {}",
                self.value,
                allowed.join(", ")
            ))
        }
    }
}

/// A format that parses but cannot render a bare date (`%H`, `%S`) fails
/// the round-trip instead of panicking.
fn formats_back_to(date: NaiveDate, fmt: &str, expected: &str) -> bool {
    let mut rendered = String::with_capacity(expected.len());
    write!(rendered, "{}", date.format(fmt)).is_ok() && rendered == expected
}

pub struct FieldRuleEvaluator {
    rules: Vec<Box<dyn FieldRule>>,
}

impl FieldRuleEvaluator {
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            rules: vec![
                Box::new(RequiredRule),
                Box::new(MaxLengthRule),
                Box::new(TypeRule::new(options)),
            ],
        }
    }

    /// Append a rule that runs after the built-in ones.
    pub fn with_rule(mut self, rule: Box<dyn FieldRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Zero or one issue for this value.
    pub fn evaluate(
        &self,
        raw_value: &str,
        field: &FieldDefinition,
        ctx: IssueContext,
    ) -> Vec<Issue> {
        for rule in &self.rules {
            match rule.check(raw_value, field) {
                RuleOutcome::Pass => continue,
                RuleOutcome::Skip => break,
                RuleOutcome::Fail(message) => {
                    tracing::trace!(
                        rule = rule.name(),
                        line = ctx.line_number,
                        column = ctx.column_index,
                        "field rule failed"
                    );
                    return vec![Issue::field(
                        ctx.line_number,
                        field.name.clone(),
                        Severity::Error,
                        message,
                    )];
                }
            }
        }
        Vec::new()
    }
}
