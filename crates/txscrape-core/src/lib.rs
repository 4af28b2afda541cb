//! Core library for bank transaction scraping.
//!
//! This crate provides:
//! - A raw-source abstraction over page documents and PDF text fragments
//! - Field classifiers and normalizers (dates, amounts, descriptions)
//! - Row/line parsing strategies and the web extraction orchestrator
//! - PDF line grouping and statement processing
//! - CSV export

mod busy;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod source;
pub mod transaction;

pub use error::{ExtractionError, PdfError, Result, SourceError, TxError};
pub use export::{export_file_name, to_csv, SourceLabel};
pub use extract::{ExtractionContext, Extractor};
pub use models::{
    AccountInfo, AccountType, CountReport, ExtractionReport, RecordSource, ScrapeConfig,
    TransactionRecord, TransactionType,
};
pub use pdf::{DocumentSource, PageFragments, StatementProcessor, StaticPages, TextFragment};
#[cfg(feature = "native")]
pub use pdf::PdfExtractor;
pub use source::{DomNode, DomSource, IncrementalSource};
#[cfg(feature = "native")]
pub use source::HtmlPage;
pub use transaction::Strategy;
