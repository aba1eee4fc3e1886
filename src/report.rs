//! Human-readable and JSON rendering of a [`Description`].
//!
//! The text form is:
//!
//! ```text
//! File: /data/people.csv
//! Total entries: 2
//! Fields:
//! 	id, Integer, 2, 0
//! 	nickname, String, 1, 1
//! ```
//!
//! where each field line is `name, type, non-null occurrences, null occurrences`.

use std::fmt;

use serde::Serialize;

use crate::gather::Description;

/// Output format for describe reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Line-oriented text.
    #[default]
    Text,
    /// Pretty-printed JSON object.
    Json,
}

#[derive(Serialize)]
struct FieldReport<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    field_type: &'static str,
    non_null_occurrences: u64,
    null_occurrences: u64,
}

#[derive(Serialize)]
struct DescriptionReport<'a> {
    file: &'a str,
    total_entries: usize,
    fields: Vec<FieldReport<'a>>,
}

impl<'a> From<&'a Description> for DescriptionReport<'a> {
    fn from(d: &'a Description) -> Self {
        Self {
            file: &d.path,
            total_entries: d.field_count(),
            fields: d
                .fields
                .iter()
                .map(|m| FieldReport {
                    name: &m.field,
                    field_type: m.field_type.display_name(),
                    non_null_occurrences: m.non_null_occurrences(),
                    null_occurrences: m.null_occurrences,
                })
                .collect(),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path)?;
        writeln!(f, "Total entries: {}", self.field_count())?;
        writeln!(f, "Fields:")?;
        for m in &self.fields {
            writeln!(
                f,
                "\t{}, {}, {}, {}",
                m.field,
                m.field_type,
                m.non_null_occurrences(),
                m.null_occurrences
            )?;
        }
        Ok(())
    }
}

/// Render `description` in `format`.
pub fn render(description: &Description, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(description.to_string()),
        ReportFormat::Json => {
            let mut out = serde_json::to_string_pretty(&DescriptionReport::from(description))?;
            out.push('\n');
            Ok(out)
        }
    }
}
