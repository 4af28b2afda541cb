//! Data models for extraction output and configuration.

pub mod config;
pub mod report;
pub mod transaction;

pub use config::ScrapeConfig;
pub use report::{CountReport, ExtractionReport};
pub use transaction::{AccountInfo, AccountType, Column, RecordSource, TransactionRecord, TransactionType};
