//! Engine-wide parsing options: encoding, date/number locale, line limits.
//!
//! Uploaded files carry no self-description, so all of these are explicit
//! configuration with documented defaults.

use std::borrow::Cow;
use std::fmt::Write;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::{FieldType, Layout};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl Encoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
        }
    }

    /// Decode one line. `None` when the bytes are not valid in this encoding;
    /// Latin-1 maps every byte, so it never fails.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Self::Latin1 => {
                if bytes.is_ascii() {
                    // ASCII is a subset of both, skip the copy.
                    std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
                } else {
                    Some(Cow::Owned(bytes.iter().map(|&b| b as char).collect()))
                }
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(format!(
                "unsupported encoding '{other}' (expected utf-8 or latin-1)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub encoding: Encoding,
    /// chrono format string every `date` field must match exactly.
    pub date_format: String,
    pub decimal_separator: char,
    /// Strip surrounding whitespace from each column before the rules run.
    pub trim_values: bool,
    /// Longest line materialised in memory; the excess is discarded.
    pub max_line_bytes: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            decimal_separator: '.',
            trim_values: true,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl EngineOptions {
    /// Human-readable form of `date_format` for issue messages
    /// (`%Y-%m-%d` becomes `YYYY-MM-DD`).
    pub fn date_format_label(&self) -> String {
        self.date_format
            .replace("%Y", "YYYY")
            .replace("%m", "MM")
            .replace("%d", "DD")
    }

    /// Reject settings that would make every run fail or misbehave.
    pub fn check(&self) -> Result<(), String> {
        if self.max_line_bytes == 0 {
            return Err("max_line_bytes must be positive".into());
        }
        if self.decimal_separator.is_ascii_digit()
            || matches!(self.decimal_separator, '+' | '-' | '\n' | '\r')
        {
            return Err(format!(
                "decimal_separator '{}' cannot separate digits",
                self.decimal_separator.escape_default()
            ));
        }
        check_date_format(&self.date_format)
    }

    /// A layout whose delimiter is the decimal separator would split every
    /// decimal value across two columns.
    pub fn check_layout(&self, layout: &Layout) -> Result<(), String> {
        let has_decimal = layout
            .fields
            .iter()
            .any(|f| matches!(f.kind, FieldType::Decimal));
        if has_decimal && layout.delimiter == self.decimal_separator {
            return Err(format!(
                "delimiter '{}' is also the decimal separator",
                layout.delimiter
            ));
        }
        Ok(())
    }
}

fn check_date_format(fmt: &str) -> Result<(), String> {
    if fmt.is_empty() {
        return Err("date_format is empty".into());
    }
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(format!("date_format '{fmt}' is not a valid chrono format"));
    }
    let mut sample = String::new();
    write!(sample, "{}", NaiveDate::default().format(fmt)).map_err(|_| {
        format!("date_format '{fmt}' uses fields a calendar date cannot supply")
    })?;
    Ok(())
}
