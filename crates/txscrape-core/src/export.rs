//! CSV serialization and export file naming.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Column, TransactionRecord};
use crate::transaction::rules::strip_thousands;

/// Origin label used in exported file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    Web,
    Pdf,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::Web => "web",
            SourceLabel::Pdf => "pdf",
        }
    }
}

/// Columns with at least one non-empty value, in canonical order.
pub fn active_columns(records: &[TransactionRecord]) -> Vec<Column> {
    Column::CANONICAL_ORDER
        .into_iter()
        .filter(|column| records.iter().any(|r| !r.field(*column).is_empty()))
        .collect()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn needs_quotes(value: &str) -> bool {
    value.contains([',', '"', '\n', '\r'])
}

fn cell(column: Column, value: &str) -> String {
    match column {
        Column::Amount | Column::Balance => strip_thousands(value),
        // Raw dates that failed normalization may contain a comma.
        Column::Date => quote(value),
        _ if needs_quotes(value) => quote(value),
        _ => value.to_string(),
    }
}

/// Render records as CSV. An empty set renders as an empty string.
pub fn to_csv(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let columns = active_columns(records);
    let mut lines = Vec::with_capacity(records.len() + 1);

    lines.push(
        columns
            .iter()
            .map(|c| cell(Column::Description, &c.header()))
            .collect::<Vec<_>>()
            .join(","),
    );

    for record in records {
        lines.push(
            columns
                .iter()
                .map(|c| cell(*c, &record.field(*c)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

/// `<prefix>_<web|pdf>_<YYYY-MM-DD>.csv`
pub fn export_file_name(prefix: &str, label: SourceLabel, date: NaiveDate) -> String {
    format!("{}_{}_{}.csv", prefix, label.as_str(), date.format("%Y-%m-%d"))
}
