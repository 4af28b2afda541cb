//! Row and line parsing into transaction records.

pub mod rules;
mod structured;
mod tabular;
mod text_line;

pub use structured::StructuredRowParser;
pub use tabular::TabularRowParser;
pub use text_line::TextLineParser;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::TransactionRecord;
use crate::source::DomNode;

/// Result type for unit-level parsing.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Parses one structural unit into at most one record.
///
/// `Ok(None)` means the unit parsed but did not yield a valid record;
/// `Err` means the unit has a shape the parser cannot read.
pub trait RowParser {
    fn parse_unit(&self, unit: &DomNode) -> Result<Option<TransactionRecord>>;
}

/// Extraction strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Provider layout markers on rows and cells.
    Structured,
    /// Any table, classified cell by cell.
    Tabular,
    /// Text elements matched against line templates.
    FreeText,
    /// Whole rendered page text, line by line.
    PageText,
}

impl Strategy {
    pub const CASCADE: [Strategy; 4] = [
        Strategy::Structured,
        Strategy::Tabular,
        Strategy::FreeText,
        Strategy::PageText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Structured => "structured",
            Strategy::Tabular => "tabular",
            Strategy::FreeText => "free_text",
            Strategy::PageText => "page_text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
