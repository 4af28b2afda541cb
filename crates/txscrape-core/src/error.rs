//! Error types for the txscrape-core library.

use thiserror::Error;

/// Main error type for the txscrape library.
#[derive(Error, Debug)]
pub enum TxError {
    /// The raw source (page or document) could not be read.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// An extraction was requested while another one is still running.
    #[error("an extraction is already in progress")]
    Busy,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by raw source implementations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No raw source is reachable (page not ready, fetch failed).
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// A selector could not be evaluated.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// Activating the incremental-load control failed.
    #[error("failed to trigger load: {0}")]
    Trigger(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Unit-level parse failures. These never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The unit has no cells to read.
    #[error("unit has no cells")]
    NoCells,
}

/// Result type for the txscrape library.
pub type Result<T> = std::result::Result<T, TxError>;
