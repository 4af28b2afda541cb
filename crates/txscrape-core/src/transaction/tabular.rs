//! Generic table rows, classified cell by cell.

use tracing::trace;

use crate::error::ExtractionError;
use crate::models::{TransactionRecord, TransactionType};
use crate::source::DomNode;

use super::rules::{is_amount, is_date, is_valid_transaction, normalize_date};
use super::{Result, RowParser};

/// Minimum length of a cell taken as the description.
const MIN_DESCRIPTION: usize = 3;

/// Column routed by its header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderHint {
    Type,
    Reference,
}

impl HeaderHint {
    fn of(header: &str) -> Option<Self> {
        let header = header.to_lowercase();
        if header.contains("type") || header.contains("category") {
            Some(HeaderHint::Type)
        } else if header.contains("ref") || header.contains("number") {
            Some(HeaderHint::Reference)
        } else {
            None
        }
    }
}

/// Positional parser for tables without provider markers.
#[derive(Debug, Clone, Default)]
pub struct TabularRowParser {
    hints: Vec<Option<HeaderHint>>,
}

impl TabularRowParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take column hints from a header row (all `th`). Returns whether the
    /// row was a header.
    pub fn observe_header(&mut self, row: &DomNode) -> bool {
        let cells = row.cells();
        if cells.is_empty() || !cells.iter().all(|c| c.tag == "th") {
            return false;
        }
        self.hints = cells.iter().map(|c| HeaderHint::of(c.text())).collect();
        trace!("Table header hints: {:?}", self.hints);
        true
    }

    fn hint(&self, index: usize) -> Option<HeaderHint> {
        self.hints.get(index).copied().flatten()
    }
}

impl RowParser for TabularRowParser {
    fn parse_unit(&self, row: &DomNode) -> Result<Option<TransactionRecord>> {
        let cells = row.cells();
        if cells.is_empty() {
            return Err(ExtractionError::NoCells);
        }

        let mut record = TransactionRecord::default();
        let mut amounts = 0;

        for (index, cell) in cells.iter().enumerate() {
            let text = cell.text();
            if text.is_empty() {
                continue;
            }

            match self.hint(index) {
                Some(HeaderHint::Type) => {
                    record.kind = TransactionType::classify(text);
                    continue;
                }
                Some(HeaderHint::Reference) if !is_amount(text) => {
                    record.reference = text.to_string();
                    continue;
                }
                _ => {}
            }

            if record.date.is_empty() && is_date(text) {
                record.date = normalize_date(text);
            } else if is_amount(text) {
                match amounts {
                    0 => record.amount = text.to_string(),
                    1 => record.balance = text.to_string(),
                    _ => {}
                }
                amounts += 1;
            } else if record.description.is_empty() && text.chars().count() > MIN_DESCRIPTION {
                record.description = text.to_string();
            }
        }

        if record.kind.is_none() {
            record.kind = TransactionType::classify(&record.description);
        }

        if !is_valid_transaction(&record) {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(tag: &str, texts: &[&str]) -> DomNode {
        texts.iter().fold(DomNode::new("tr"), |row, text| {
            row.with_child(DomNode::new(tag).with_text(text))
        })
    }

    #[test]
    fn test_positional_classification() {
        let parser = TabularRowParser::new();
        let record = parser
            .parse_unit(&row("td", &["10/21/2025", "Coffee Shop", "$4.50", "$995.50"]))
            .unwrap()
            .unwrap();

        assert_eq!(record.date, "21/10/2025");
        assert_eq!(record.description, "Coffee Shop");
        assert_eq!(record.amount, "$4.50");
        assert_eq!(record.balance, "$995.50");
        assert_eq!(record.account_type, None);
    }

    #[test]
    fn test_header_hints_route_type_and_reference() {
        let mut parser = TabularRowParser::new();
        assert!(parser.observe_header(&row("th", &["Date", "Type", "Details", "Ref #", "Amount"])));

        let record = parser
            .parse_unit(&row(
                "td",
                &["2025-10-21", "E-Transfer", "Rent October", "A1B2C3", "-$1,500.00"],
            ))
            .unwrap()
            .unwrap();

        assert_eq!(record.kind, Some(TransactionType::Transfer));
        assert_eq!(record.reference, "A1B2C3");
        assert_eq!(record.description, "Rent October");
        assert_eq!(record.amount, "-$1,500.00");
    }

    #[test]
    fn test_data_row_is_not_a_header() {
        let mut parser = TabularRowParser::new();
        assert!(!parser.observe_header(&row("td", &["Date", "Amount"])));
    }

    #[test]
    fn test_short_cells_are_not_descriptions() {
        let parser = TabularRowParser::new();
        assert_eq!(parser.parse_unit(&row("td", &["abc", "x"])), Ok(None));
    }
}
