//! Free-text lines matched against the provider's line templates.

use tracing::trace;

use crate::models::{TransactionRecord, TransactionType};
use crate::source::DomNode;

use super::rules::patterns::LINE_TEMPLATES;
use super::rules::{is_valid_transaction, normalize_amount, normalize_date};
use super::{Result, RowParser};

/// Template-driven parser for one line of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLineParser;

impl TextLineParser {
    pub fn new() -> Self {
        Self
    }

    /// First matching template wins.
    pub fn parse_line(&self, line: &str) -> Option<TransactionRecord> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (name, caps) = LINE_TEMPLATES
            .iter()
            .find_map(|(name, template)| template.captures(line).map(|c| (*name, c)))?;
        trace!("Line matched {}: {}", name, line);

        let description = caps.name("desc").map(|m| m.as_str().trim()).unwrap_or_default();
        let record = TransactionRecord {
            date: caps.name("date").map(|m| normalize_date(m.as_str())).unwrap_or_default(),
            amount: caps
                .name("amount")
                .map(|m| normalize_amount(m.as_str()))
                .unwrap_or_default(),
            kind: TransactionType::classify(description),
            description: description.to_string(),
            ..Default::default()
        };

        is_valid_transaction(&record).then_some(record)
    }

    /// Parse every line, keeping input order.
    pub fn parse_lines<'a, I>(&self, lines: I) -> Vec<TransactionRecord>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().filter_map(|l| self.parse_line(l)).collect()
    }
}

impl RowParser for TextLineParser {
    fn parse_unit(&self, unit: &DomNode) -> Result<Option<TransactionRecord>> {
        Ok(self.parse_line(unit.text()))
    }
}
