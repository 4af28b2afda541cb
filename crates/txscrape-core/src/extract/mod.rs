//! Web extraction orchestrator.
//!
//! One pass: read the expected-count hint, expand the list through the
//! load-more control, settle, then run the strategy cascade over the
//! authoritative container.

mod loader;
mod metadata;

pub use loader::{load_all, LoadOutcome};

use std::sync::atomic::AtomicBool;

use tracing::{debug, info, warn};

use crate::busy::BusyGuard;
use crate::error::{SourceError, TxError};
use crate::models::config::LayoutConfig;
use crate::models::{CountReport, ExtractionReport, ScrapeConfig, TransactionRecord};
use crate::source::{DomNode, DomSource, IncrementalSource};
use crate::transaction::{
    RowParser, Strategy, StructuredRowParser, TabularRowParser, TextLineParser,
};

/// Rows with fewer cells are not counted as transaction units.
const MIN_UNIT_CELLS: usize = 2;

/// State owned by one extraction call.
#[derive(Debug, Default)]
pub struct ExtractionContext {
    /// Records in structural order.
    pub records: Vec<TransactionRecord>,
    /// Units that failed to parse.
    pub skipped: usize,
}

impl ExtractionContext {
    /// Parse every unit, isolating failures to the unit.
    fn parse_units<'a, P, I>(&mut self, parser: &P, units: I)
    where
        P: RowParser,
        I: IntoIterator<Item = &'a DomNode>,
    {
        for unit in units {
            match parser.parse_unit(unit) {
                Ok(Some(record)) => self.records.push(record),
                Ok(None) => {}
                Err(e) => {
                    debug!("Skipping unit: {}", e);
                    self.skipped += 1;
                }
            }
        }
    }
}

fn parseable_rows(rows: &[DomNode]) -> usize {
    rows.iter()
        .filter(|r| r.cells().len() >= MIN_UNIT_CELLS)
        .count()
}

/// Rows of the authoritative container, or page-wide structural rows when
/// no container holds any.
///
/// The container with the most parseable rows wins; ties keep the first.
pub(crate) fn structural_units<S: DomSource>(
    source: &S,
    layout: &LayoutConfig,
) -> Result<Vec<DomNode>, SourceError> {
    let groups = source.query_within(&layout.container_selector, &layout.row_selector)?;
    let containers = groups.len();

    let mut best: Option<(usize, Vec<DomNode>)> = None;
    for rows in groups {
        let count = parseable_rows(&rows);
        if count > 0 && best.as_ref().is_none_or(|(n, _)| count > *n) {
            best = Some((count, rows));
        }
    }

    if let Some((count, rows)) = best {
        debug!(
            "Authoritative container: {} parseable rows of {} containers",
            count, containers
        );
        return Ok(rows);
    }

    let rows = source.query(&layout.row_selector)?;
    if parseable_rows(&rows) == 0 {
        return Ok(Vec::new());
    }
    Ok(rows)
}

/// Parseable structural units currently on the page.
pub(crate) fn count_structural_units<S: DomSource>(
    source: &S,
    layout: &LayoutConfig,
) -> Result<usize, SourceError> {
    Ok(parseable_rows(&structural_units(source, layout)?))
}

/// Drives extraction against a web page.
pub struct Extractor {
    config: ScrapeConfig,
    busy: AtomicBool,
}

impl Extractor {
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Full extraction. Never fails: errors come back in the report.
    pub async fn extract<S: IncrementalSource>(&self, source: &S) -> ExtractionReport {
        match self.try_extract(source).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                ExtractionReport::failed(&e)
            }
        }
    }

    /// Full extraction, with errors as `Err`.
    pub async fn try_extract<S: IncrementalSource>(&self, source: &S) -> Result<ExtractionReport, TxError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let layout = &self.config.layout;

        let expected_count = metadata::expected_count(source, layout);
        if let Some(n) = expected_count {
            info!("Page reports {} transactions", n);
        }

        let outcome = load_all(source, &self.config.load, layout).await?;
        debug!("Load loop: {:?}", outcome);
        source.wait(self.config.load.settle_delay()).await;

        let mut context = ExtractionContext::default();
        let strategy = self.run_cascade(source, &mut context)?;

        let mut report = ExtractionReport::succeeded(context.records);
        report.strategy = strategy;
        report.skipped = context.skipped;
        report.expected_count = expected_count;
        report.account_info = metadata::account_info(source, layout);

        info!(
            "Extracted {} transactions via {}",
            report.count,
            strategy.map(|s| s.as_str()).unwrap_or("no strategy")
        );
        if let Some(expected) = expected_count {
            if expected != report.count {
                debug!("Expected {} transactions, found {}", expected, report.count);
            }
        }
        Ok(report)
    }

    /// Number of structural units currently on the page, without parsing.
    pub fn count_units<S: DomSource>(&self, source: &S) -> CountReport {
        match count_structural_units(source, &self.config.layout) {
            Ok(count) => CountReport {
                success: true,
                count,
            },
            Err(e) => {
                warn!("Unit count failed: {}", e);
                CountReport {
                    success: false,
                    count: 0,
                }
            }
        }
    }

    /// Try each strategy in order; the first that matches wins.
    fn run_cascade<S: DomSource>(
        &self,
        source: &S,
        context: &mut ExtractionContext,
    ) -> Result<Option<Strategy>, TxError> {
        for strategy in Strategy::CASCADE {
            let matched = match strategy {
                Strategy::Structured => self.structured(source, context)?,
                Strategy::Tabular => self.tabular(source, context)?,
                Strategy::FreeText => self.free_text(source, context)?,
                Strategy::PageText => self.page_text(source, context),
            };
            if matched {
                return Ok(Some(strategy));
            }
            debug!("Strategy {} found nothing", strategy);
        }
        Ok(None)
    }

    /// Matches whenever structural rows exist, even if none is valid.
    fn structured<S: DomSource>(
        &self,
        source: &S,
        context: &mut ExtractionContext,
    ) -> Result<bool, SourceError> {
        let units = structural_units(source, &self.config.layout)?;
        if units.is_empty() {
            return Ok(false);
        }
        let parser = StructuredRowParser::new(&self.config.layout);
        context.parse_units(&parser, &units);
        Ok(true)
    }

    fn tabular<S: DomSource>(
        &self,
        source: &S,
        context: &mut ExtractionContext,
    ) -> Result<bool, SourceError> {
        let rows = source.query(&self.config.layout.table_row_selector)?;
        let mut parser = TabularRowParser::new();
        let before = context.records.len();

        for row in &rows {
            if parser.observe_header(row) {
                continue;
            }
            context.parse_units(&parser, std::iter::once(row));
        }
        Ok(context.records.len() > before)
    }

    fn free_text<S: DomSource>(
        &self,
        source: &S,
        context: &mut ExtractionContext,
    ) -> Result<bool, SourceError> {
        let mut nodes = source.query(&self.config.layout.text_line_selector)?;
        // Nested matches (`li > p`) repeat the same text.
        nodes.dedup_by(|a, b| a.text() == b.text());

        let before = context.records.len();
        context.parse_units(&TextLineParser::new(), &nodes);
        Ok(context.records.len() > before)
    }

    fn page_text<S: DomSource>(&self, source: &S, context: &mut ExtractionContext) -> bool {
        let text = source.page_text();
        let records = TextLineParser::new().parse_lines(text.lines());
        let matched = !records.is_empty();
        context.records.extend(records);
        matched
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ScrapeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// A page whose list grows by scripted amounts on each activation.
    struct SimulatedPage {
        rows: Cell<usize>,
        growth: RefCell<VecDeque<usize>>,
        activations: Cell<u32>,
    }

    impl SimulatedPage {
        fn new(initial: usize, growth: &[usize]) -> Self {
            Self {
                rows: Cell::new(initial),
                growth: RefCell::new(growth.iter().copied().collect()),
                activations: Cell::new(0),
            }
        }

        fn row(i: usize) -> DomNode {
            DomNode::new("tr")
                .with_attr("data-transaction-id", &format!("t{i}"))
                .with_child(
                    DomNode::new("td")
                        .with_attr("class", "date")
                        .with_attr("data-account-type", "credit")
                        .with_text("Oct 21, 2025"),
                )
                .with_child(
                    DomNode::new("td")
                        .with_attr("class", "description")
                        .with_text(&format!("MERCHANT {i}")),
                )
                .with_child(DomNode::new("td").with_attr("class", "withdraw").with_text("$1.00"))
                .with_child(DomNode::new("td").with_attr("class", "deposit"))
        }

        fn snapshot_rows(&self) -> Vec<DomNode> {
            (0..self.rows.get()).map(Self::row).collect()
        }
    }

    impl DomSource for SimulatedPage {
        fn query(&self, selector: &str) -> Result<Vec<DomNode>, SourceError> {
            let layout = LayoutConfig::default();
            let control = crate::models::config::LoadConfig::default().control_selector;
            Ok(if selector == layout.row_selector {
                self.snapshot_rows()
            } else if selector == control {
                vec![DomNode::new("button").with_text("Show more transactions")]
            } else {
                Vec::new()
            })
        }

        fn query_within(
            &self,
            container: &str,
            selector: &str,
        ) -> Result<Vec<Vec<DomNode>>, SourceError> {
            let layout = LayoutConfig::default();
            Ok(
                if container == layout.container_selector && selector == layout.row_selector {
                    vec![self.snapshot_rows()]
                } else {
                    Vec::new()
                },
            )
        }

        fn page_text(&self) -> String {
            String::new()
        }
    }

    impl IncrementalSource for SimulatedPage {
        async fn trigger(&self, _selector: &str, _index: usize) -> Result<bool, SourceError> {
            self.activations.set(self.activations.get() + 1);
            if let Some(n) = self.growth.borrow_mut().pop_front() {
                self.rows.set(self.rows.get() + n);
            }
            Ok(true)
        }

        async fn wait(&self, _duration: Duration) {
            tokio::task::yield_now().await;
        }
    }

    fn fast_config() -> ScrapeConfig {
        let mut config = ScrapeConfig::default();
        config.load.poll_interval_ms = 10;
        config.load.growth_timeout_ms = 50;
        config.load.settle_delay_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_load_loop_stops_at_first_stagnant_activation() {
        let page = SimulatedPage::new(3, &[2, 4]);
        let extractor = Extractor::new(fast_config());

        let report = extractor.extract(&page).await;

        assert!(report.success);
        assert_eq!(page.activations.get(), 3);
        assert_eq!(report.count, 9);
        assert_eq!(report.strategy, Some(Strategy::Structured));
    }

    #[tokio::test]
    async fn test_load_loop_respects_attempt_ceiling() {
        let page = SimulatedPage::new(1, &[1; 10]);
        let mut config = fast_config();
        config.load.max_attempts = 4;

        let report = Extractor::new(config).extract(&page).await;

        assert_eq!(page.activations.get(), 4);
        assert_eq!(report.count, 5);
    }

    #[tokio::test]
    async fn test_credit_rows_are_negative_purchases() {
        let page = SimulatedPage::new(2, &[]);
        let report = Extractor::new(fast_config()).extract(&page).await;

        assert_eq!(report.transactions.len(), 2);
        for record in &report.transactions {
            assert_eq!(record.account_type, Some(AccountType::Credit));
            assert_eq!(record.description, "Purchase");
            assert_eq!(record.amount, "-$1.00");
            assert_eq!(record.balance, "");
        }
        assert_eq!(report.transactions[1].vendor, "MERCHANT 1");
    }

    #[tokio::test]
    async fn test_overlapping_extract_is_rejected() {
        let page = SimulatedPage::new(2, &[1]);
        let extractor = Extractor::new(fast_config());

        let (first, second) = tokio::join!(extractor.extract(&page), async {
            tokio::task::yield_now().await;
            extractor.extract(&page).await
        });

        assert!(first.success);
        assert!(second.is_busy());
        assert!(second.transactions.is_empty());
    }

    #[test]
    fn test_count_units() {
        let page = SimulatedPage::new(7, &[]);
        assert_eq!(
            Extractor::default().count_units(&page),
            CountReport {
                success: true,
                count: 7
            }
        );
    }

    #[cfg(feature = "native")]
    mod html {
        use super::*;
        use crate::source::HtmlPage;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_free_text_fallback_is_success() {
            let page = HtmlPage::parse(
                r#"<div class="activity">
                     <p>Oct 21, 2025 Coffee Shop $4.50</p>
                     <p>Oct 22, 2025 Grocery Store $45.10</p>
                     <p>Need help? Call us.</p>
                   </div>"#,
            );
            let report = Extractor::new(fast_config()).extract(&page).await;

            assert!(report.success);
            assert_eq!(report.strategy, Some(Strategy::FreeText));
            assert_eq!(report.count, 2);
            assert_eq!(report.transactions[0].description, "Coffee Shop");
            assert_eq!(report.transactions[1].amount, "45.10");
        }

        #[tokio::test]
        async fn test_authoritative_container_has_most_rows() {
            let row = |id: &str| {
                format!(
                    r#"<tr data-transaction-id="{id}"><td class="date">10/21/2025</td><td class="description">Row {id}</td><td class="withdraw">$2.00</td></tr>"#
                )
            };
            let html = format!(
                r#"<table class="transaction-list" style="display:none">{}</table>
                   <table class="transaction-list">{}{}{}</table>"#,
                row("a"),
                row("b"),
                row("c"),
                row("d"),
            );
            let page = HtmlPage::parse(&html);
            let report = Extractor::new(fast_config()).extract(&page).await;

            assert_eq!(report.count, 3);
            let descriptions: Vec<&str> =
                report.transactions.iter().map(|r| r.description.as_str()).collect();
            assert_eq!(descriptions, vec!["Row b", "Row c", "Row d"]);
        }

        #[tokio::test]
        async fn test_tabular_fallback() {
            let page = HtmlPage::parse(
                r#"<table>
                     <tr><th>Date</th><th>Details</th><th>Amount</th><th>Balance</th></tr>
                     <tr><td>2025-10-21</td><td>Payroll deposit</td><td>$2,000.00</td><td>$3,000.00</td></tr>
                   </table>"#,
            );
            let report = Extractor::new(fast_config()).extract(&page).await;

            assert_eq!(report.strategy, Some(Strategy::Tabular));
            assert_eq!(report.transactions[0].balance, "$3,000.00");
        }

        #[tokio::test]
        async fn test_empty_page_is_success_with_zero() {
            let page = HtmlPage::parse("<p>No activity</p>");
            let report = Extractor::new(fast_config()).extract(&page).await;

            assert!(report.success);
            assert_eq!(report.count, 0);
            assert_eq!(report.strategy, None);
            assert!(report.error.is_none());
        }
    }
}
