//! Declarative layout definitions.
//!
//! A [`Layout`] is an ordered list of [`FieldDefinition`]s; position in the
//! list is the column position in the uploaded file. Layouts are immutable
//! once registered in a [`crate::registry::LayoutRegistry`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIMITER: char = ',';

/// Closed set of column types.
///
/// Behaviour over the variants is dispatched through [`FieldTypeVisitor`], so
/// a new check (or a new description of the types) is a new visitor rather
/// than another `match` scattered through the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Date,
    Enum { allowed: Vec<String> },
}

pub trait FieldTypeVisitor {
    type Output;

    fn visit_string(&mut self) -> Self::Output;
    fn visit_integer(&mut self) -> Self::Output;
    fn visit_decimal(&mut self) -> Self::Output;
    fn visit_date(&mut self) -> Self::Output;
    fn visit_enum(&mut self, allowed: &[String]) -> Self::Output;
}

impl FieldType {
    pub fn accept<V: FieldTypeVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::String => visitor.visit_string(),
            Self::Integer => visitor.visit_integer(),
            Self::Decimal => visitor.visit_decimal(),
            Self::Date => visitor.visit_date(),
            Self::Enum { allowed } => visitor.visit_enum(allowed),
        }
    }

    /// Wire name of the type, as exposed by the validator catalog.
    pub fn name(&self) -> &'static str {
        self.accept(&mut TypeName)
    }
}

struct TypeName;

impl FieldTypeVisitor for TypeName {
    type Output = &'static str;

    fn visit_string(&mut self) -> &'static str {
        "string"
    }
    fn visit_integer(&mut self) -> &'static str {
        "integer"
    }
    fn visit_decimal(&mut self) -> &'static str {
        "decimal"
    }
    fn visit_date(&mut self) -> &'static str {
        "date"
    }
    fn visit_enum(&mut self, _allowed: &[String]) -> &'static str {
        "enum"
    }
}

fn default_required() -> bool {
    true
}

/// One positional column of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldDefinition {
    /// A required field with no length limit.
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            max_length: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub version: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    pub fields: Vec<FieldDefinition>,
}

impl Layout {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            delimiter: DEFAULT_DELIMITER,
            fields,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    /// Structural sanity check run at registration time.
    pub fn check(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("layout declares no fields".to_string());
        }
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err("delimiter cannot be a line terminator".to_string());
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err("field with blank name".to_string());
            }
            if !seen.insert(field.name.to_lowercase()) {
                return Err(format!("duplicate field name '{}'", field.name));
            }
            if field.max_length == Some(0) {
                return Err(format!("field '{}' has max_length 0", field.name));
            }
            if let FieldType::Enum { allowed } = &field.kind {
                if allowed.is_empty() {
                    return Err(format!("enum field '{}' has no allowed values", field.name));
                }
            }
        }
        Ok(())
    }
}

/// A layout published under a stable client-facing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub key: String,
    pub regulator: String,
    pub layout: Layout,
}

impl Validator {
    pub fn new(key: impl Into<String>, regulator: impl Into<String>, layout: Layout) -> Self {
        Self {
            key: key.into(),
            regulator: regulator.into(),
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount_layout() -> Layout {
        Layout::new(
            "Amounts",
            "1.0",
            vec![
                FieldDefinition::new("amount", FieldType::Decimal),
                FieldDefinition::new("date", FieldType::Date),
            ],
        )
    }

    #[test]
    fn type_names_match_wire_format() {
        assert_eq!(FieldType::String.name(), "string");
        assert_eq!(FieldType::Integer.name(), "integer");
        assert_eq!(FieldType::Decimal.name(), "decimal");
        assert_eq!(FieldType::Date.name(), "date");
        assert_eq!(
            FieldType::Enum {
                allowed: vec!["A".into()]
            }
            .name(),
            "enum"
        );
    }

    #[test]
    fn field_definition_deserializes_flat_type_tag() {
        let yaml = r#"
name: modalidade
type: enum
allowed: [TED, TEF]
max_length: 4
"#;
        let field: FieldDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(field.name, "modalidade");
        assert!(field.required);
        assert_eq!(field.max_length, Some(4));
        assert_eq!(
            field.kind,
            FieldType::Enum {
                allowed: vec!["TED".into(), "TEF".into()]
            }
        );
    }

    #[test]
    fn layout_defaults_to_comma_delimiter() {
        let yaml = r#"
name: Minimal
version: "2.0"
fields:
  - name: id
    type: integer
"#;
        let layout: Layout = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(layout.delimiter, ',');
        assert_eq!(layout.version, "2.0");
    }

    #[test]
    fn check_accepts_valid_layout() {
        assert!(amount_layout().check().is_ok());
    }

    #[test]
    fn check_rejects_duplicate_names_case_insensitively() {
        let mut layout = amount_layout();
        layout
            .fields
            .push(FieldDefinition::new("AMOUNT", FieldType::String));
        let err = layout.check().unwrap_err();
        assert!(err.contains("duplicate"), "{err}");
    }

    #[test]
    fn check_rejects_empty_enum_and_empty_layout() {
        let layout = Layout::new(
            "Bad",
            "1",
            vec![FieldDefinition::new(
                "kind",
                FieldType::Enum { allowed: vec![] },
            )],
        );
        assert!(layout.check().is_err());
        assert!(Layout::new("Empty", "1", vec![]).check().is_err());
    }
}
