//! PDF statement processing: pages of fragments in, records out.

use std::sync::atomic::AtomicBool;

use tracing::{debug, info, warn};

use super::{group_lines, DocumentSource, PageFragments};
use crate::busy::BusyGuard;
use crate::error::TxError;
use crate::models::config::PdfConfig;
use crate::models::{ExtractionReport, RecordSource, TransactionRecord};
use crate::transaction::{Strategy, TextLineParser};

/// Turns statement pages into records. One document at a time.
pub struct StatementProcessor {
    config: PdfConfig,
    parser: TextLineParser,
    busy: AtomicBool,
}

impl StatementProcessor {
    pub fn new(config: PdfConfig) -> Self {
        Self {
            config,
            parser: TextLineParser::new(),
            busy: AtomicBool::new(false),
        }
    }

    /// Process a whole document. A call made while another is still
    /// running is rejected with a busy report.
    pub async fn process_document<D: DocumentSource>(&self, source: &D) -> ExtractionReport {
        match self.try_process_document(source).await {
            Ok(report) => report,
            Err(e) => {
                warn!("PDF processing failed: {}", e);
                ExtractionReport::failed(&e)
            }
        }
    }

    pub async fn try_process_document<D: DocumentSource>(
        &self,
        source: &D,
    ) -> Result<ExtractionReport, TxError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let pages = source.load_pages().await?;
        let records = self.records_from_pages(&pages);
        info!("Extracted {} transactions from {} pages", records.len(), pages.len());

        let mut report = ExtractionReport::succeeded(records);
        report.strategy = Some(Strategy::FreeText);
        Ok(report)
    }

    /// Records of every page, in page order then top to bottom.
    pub fn records_from_pages(&self, pages: &[PageFragments]) -> Vec<TransactionRecord> {
        let mut records = Vec::new();
        for page in pages {
            let lines = group_lines(&page.fragments, self.config.line_tolerance);
            let before = records.len();

            records.extend(
                self.parser
                    .parse_lines(lines.iter().map(|l| l.text.as_str()))
                    .into_iter()
                    .map(|record| TransactionRecord {
                        source: Some(RecordSource::Pdf),
                        ..record
                    }),
            );
            debug!(
                "Page {}: {} lines, {} transactions",
                page.number,
                lines.len(),
                records.len() - before
            );
        }
        records
    }
}

impl Default for StatementProcessor {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::pdf::{StaticPages, TextFragment};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tokio::sync::oneshot;

    fn page(number: u32, fragments: &[(&str, f32)]) -> PageFragments {
        PageFragments {
            number,
            fragments: fragments
                .iter()
                .map(|(text, y)| TextFragment::new(*text, *y))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_records_in_page_then_line_order() {
        let pages = StaticPages(vec![
            page(
                1,
                &[
                    ("Statement of account", 780.0),
                    ("Oct 22, 2025", 600.0),
                    ("Oct 21, 2025", 700.0),
                    ("Coffee Shop", 700.5),
                    ("$4.50", 699.2),
                    ("Grocery Store $45.10", 601.0),
                ],
            ),
            page(2, &[("10/23/2025 -12.00 Parking", 700.0)]),
        ]);

        let report = StatementProcessor::default().process_document(&pages).await;

        assert!(report.success);
        let summary: Vec<(&str, &str, &str)> = report
            .transactions
            .iter()
            .map(|r| (r.date.as_str(), r.description.as_str(), r.amount.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("21/10/2025", "Coffee Shop", "4.50"),
                ("22/10/2025", "Grocery Store", "45.10"),
                ("23/10/2025", "Parking", "-12.00"),
            ]
        );
        assert!(report
            .transactions
            .iter()
            .all(|r| r.source == Some(RecordSource::Pdf) && r.account_type.is_none()));
    }

    #[tokio::test]
    async fn test_no_lines_is_success_with_zero() {
        let pages = StaticPages(vec![page(1, &[("Thank you for banking with us", 500.0)])]);
        let report = StatementProcessor::default().process_document(&pages).await;

        assert!(report.success);
        assert_eq!(report.count, 0);
    }

    /// Pages that arrive only once the test releases them.
    struct GatedPages {
        release: RefCell<Option<oneshot::Receiver<()>>>,
        pages: Vec<PageFragments>,
    }

    impl DocumentSource for GatedPages {
        async fn load_pages(&self) -> Result<Vec<PageFragments>, TxError> {
            let gate = self.release.borrow_mut().take();
            if let Some(gate) = gate {
                gate.await
                    .map_err(|_| SourceError::Unavailable("gate dropped".to_string()))?;
            }
            Ok(self.pages.clone())
        }
    }

    #[tokio::test]
    async fn test_overlapping_call_is_rejected() {
        let (release, gate) = oneshot::channel();
        let slow = GatedPages {
            release: RefCell::new(Some(gate)),
            pages: vec![page(1, &[("Oct 21, 2025 Coffee Shop $4.50", 700.0)])],
        };
        let processor = StatementProcessor::default();

        let (first, second) = tokio::join!(processor.process_document(&slow), async {
            tokio::task::yield_now().await;
            let second = processor.process_document(&StaticPages::default()).await;
            let _ = release.send(());
            second
        });

        assert!(second.is_busy());
        assert!(first.success);
        assert_eq!(first.count, 1);

        // The flag is released once the first call finishes.
        let third = processor.process_document(&StaticPages::default()).await;
        assert!(third.success);
    }

    #[tokio::test]
    async fn test_source_failure_is_reported() {
        struct Unreachable;
        impl DocumentSource for Unreachable {
            async fn load_pages(&self) -> Result<Vec<PageFragments>, TxError> {
                Err(SourceError::Unavailable("fetch failed".to_string()).into())
            }
        }

        let report = StatementProcessor::default().process_document(&Unreachable).await;
        assert!(!report.success);
        assert!(report.error.unwrap().contains("fetch failed"));
    }
}
