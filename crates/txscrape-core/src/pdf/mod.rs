//! PDF statement processing.

#[cfg(feature = "native")]
mod extractor;
mod grouper;
mod processor;

#[cfg(feature = "native")]
pub use extractor::PdfExtractor;
pub use grouper::{group_lines, TextLine};
pub use processor::StatementProcessor;

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::TxError;

/// A piece of text with its vertical position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// PDF user-space y; larger is higher on the page.
    pub y: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, y: f32) -> Self {
        Self {
            text: text.into(),
            y,
        }
    }
}

/// Fragments of one page, in content-stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed).
    pub number: u32,
    pub fragments: Vec<TextFragment>,
}

/// Something that can produce the pages of a statement, possibly after I/O.
pub trait DocumentSource {
    fn load_pages(&self) -> impl Future<Output = Result<Vec<PageFragments>, TxError>>;
}

/// Pages already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPages(pub Vec<PageFragments>);

impl DocumentSource for StaticPages {
    async fn load_pages(&self) -> Result<Vec<PageFragments>, TxError> {
        Ok(self.0.clone())
    }
}
