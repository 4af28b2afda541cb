//! WASM bindings for bank transaction extraction.
//!
//! The browser packaging calls these against the live page DOM and against
//! pdf.js text content. Extraction state lives in one shared `Extractor` and
//! one shared `StatementProcessor`, so an overlapping call is rejected the same
//! way it is natively.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, NodeList};

use txscrape_core::source::collapse_whitespace;
use txscrape_core::transaction::rules;
use txscrape_core::{
    export_file_name, to_csv, DomNode, DomSource, Extractor, IncrementalSource, PageFragments,
    ScrapeConfig, SourceError, SourceLabel, StatementProcessor, StaticPages, TextFragment,
    TransactionRecord,
};

thread_local! {
    static EXTRACTOR: RefCell<Rc<Extractor>> = RefCell::new(Rc::new(Extractor::default()));
    static PROCESSOR: RefCell<Rc<StatementProcessor>> =
        RefCell::new(Rc::new(StatementProcessor::default()));
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn shared_extractor() -> Rc<Extractor> {
    EXTRACTOR.with(|e| Rc::clone(&e.borrow()))
}

fn shared_processor() -> Rc<StatementProcessor> {
    PROCESSOR.with(|p| Rc::clone(&p.borrow()))
}

/// Replace the shared configuration.
///
/// Calls already in flight finish with the configuration they started with.
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsValue> {
    let config: ScrapeConfig = from_js(config)?;
    PROCESSOR.with(|p| *p.borrow_mut() = Rc::new(StatementProcessor::new(config.pdf.clone())));
    EXTRACTOR.with(|e| *e.borrow_mut() = Rc::new(Extractor::new(config)));
    Ok(())
}

/// The live document, seen through the raw-source traits.
pub struct BrowserPage {
    document: Document,
}

impl BrowserPage {
    pub fn current() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        Ok(Self { document })
    }

    fn select_all(&self, selector: &str) -> Result<Vec<Element>, SourceError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| selector_error(selector, e))?;
        Ok(elements(&list))
    }
}

fn selector_error(selector: &str, e: JsValue) -> SourceError {
    SourceError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Snapshot an element subtree. Elements without layout boxes are hidden.
fn snapshot(element: &Element, parent_hidden: bool) -> DomNode {
    let hidden = parent_hidden || element.get_client_rects().length() == 0;

    let mut attrs = BTreeMap::new();
    for name in element
        .get_attribute_names()
        .iter()
        .filter_map(|n| n.as_string())
    {
        if let Some(value) = element.get_attribute(&name) {
            attrs.insert(name.to_ascii_lowercase(), value);
        }
    }

    let collection = element.children();
    let children = (0..collection.length())
        .filter_map(|i| collection.item(i))
        .map(|child| snapshot(&child, hidden))
        .collect();

    DomNode {
        tag: element.tag_name().to_ascii_lowercase(),
        attrs,
        text: collapse_whitespace(&element.text_content().unwrap_or_default()),
        children,
        hidden,
    }
}

impl DomSource for BrowserPage {
    fn query(&self, selector: &str) -> Result<Vec<DomNode>, SourceError> {
        Ok(self
            .select_all(selector)?
            .iter()
            .map(|el| snapshot(el, false))
            .collect())
    }

    fn query_within(
        &self,
        container: &str,
        selector: &str,
    ) -> Result<Vec<Vec<DomNode>>, SourceError> {
        self.select_all(container)?
            .iter()
            .map(|c| {
                let list = c
                    .query_selector_all(selector)
                    .map_err(|e| selector_error(selector, e))?;
                Ok(elements(&list).iter().map(|el| snapshot(el, false)).collect())
            })
            .collect()
    }

    fn page_text(&self) -> String {
        self.document
            .body()
            .map(|body| body.inner_text())
            .unwrap_or_default()
    }
}

impl IncrementalSource for BrowserPage {
    async fn trigger(&self, selector: &str, index: usize) -> Result<bool, SourceError> {
        let Some(element) = self.select_all(selector)?.into_iter().nth(index) else {
            return Ok(false);
        };
        let control = element
            .dyn_into::<HtmlElement>()
            .map_err(|_| SourceError::Trigger(format!("`{}` is not clickable", selector)))?;
        control.click();
        Ok(true)
    }

    async fn wait(&self, duration: Duration) {
        let millis = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
            } else {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}

/// Extract every transaction on the current page, loading more rows first.
///
/// Resolves to an extraction report; failures are reported, not thrown.
#[wasm_bindgen(js_name = extractPage)]
pub async fn extract_page() -> Result<JsValue, JsValue> {
    let page = BrowserPage::current()?;
    let extractor = shared_extractor();
    let report = extractor.extract(&page).await;
    to_js(&report)
}

/// Count transaction rows on the current page without parsing them.
#[wasm_bindgen(js_name = countUnits)]
pub fn count_units() -> Result<JsValue, JsValue> {
    let page = BrowserPage::current()?;
    to_js(&shared_extractor().count_units(&page))
}

/// One pdf.js text item. Marked-content items carry neither field.
#[derive(Debug, Deserialize)]
struct PdfJsItem {
    #[serde(default)]
    str: String,
    #[serde(default)]
    transform: Vec<f32>,
}

/// The shape returned by pdf.js `page.getTextContent()`.
#[derive(Debug, Deserialize)]
struct PdfJsPage {
    #[serde(default)]
    items: Vec<PdfJsItem>,
}

fn pages_from_pdfjs(pages: Vec<PdfJsPage>) -> Vec<PageFragments> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| PageFragments {
            number: i as u32 + 1,
            fragments: page
                .items
                .into_iter()
                .filter(|item| !item.str.trim().is_empty())
                .map(|item| {
                    let y = item.transform.get(5).copied().unwrap_or(0.0);
                    TextFragment::new(item.str, y)
                })
                .collect(),
        })
        .collect()
}

/// Extract transactions from pdf.js text content, one entry per page.
#[wasm_bindgen(js_name = processDocument)]
pub async fn process_document(pages: JsValue) -> Result<JsValue, JsValue> {
    let pages = StaticPages(pages_from_pdfjs(from_js(pages)?));
    let processor = shared_processor();
    let report = processor.process_document(&pages).await;
    to_js(&report)
}

/// Serialize records with the export column rules.
#[wasm_bindgen(js_name = toCSV)]
pub fn to_csv_js(records: JsValue) -> Result<String, JsValue> {
    let records: Vec<TransactionRecord> = from_js(records)?;
    Ok(to_csv(&records))
}

/// Download name for today's export, `label` being `web` or `pdf`.
#[wasm_bindgen(js_name = exportFileName)]
pub fn export_file_name_js(label: &str) -> Result<String, JsValue> {
    let label = match label {
        "web" => SourceLabel::Web,
        "pdf" => SourceLabel::Pdf,
        other => return Err(JsValue::from_str(&format!("unknown source label: {}", other))),
    };

    let now = js_sys::Date::new_0();
    let today = chrono::NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("invalid local date"))?;

    let extractor = shared_extractor();
    Ok(export_file_name(
        &extractor.config().export.file_prefix,
        label,
        today,
    ))
}

#[wasm_bindgen(js_name = isDate)]
pub fn is_date(text: &str) -> bool {
    rules::is_date(text)
}

#[wasm_bindgen(js_name = isAmount)]
pub fn is_amount(text: &str) -> bool {
    rules::is_amount(text)
}

#[wasm_bindgen(js_name = normalizeDate)]
pub fn normalize_date(text: &str) -> String {
    rules::normalize_date(text)
}

#[wasm_bindgen(js_name = normalizeAmount)]
pub fn normalize_amount(text: &str) -> String {
    rules::normalize_amount(text)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_field_utilities() {
        assert!(is_date("Oct 21, 2025"));
        assert!(is_amount("$1,234.56"));
        assert_eq!(normalize_date("Oct 21, 2025"), "21/10/2025");
        assert_eq!(normalize_amount("$4.50"), "4.50");
    }

    #[wasm_bindgen_test]
    fn test_export_file_name_label() {
        let name = export_file_name_js("pdf").unwrap();
        assert!(name.starts_with("transactions_pdf_"));
        assert!(name.ends_with(".csv"));
        assert!(export_file_name_js("fax").is_err());
    }

    #[wasm_bindgen_test]
    fn test_query_within_scopes_rows_to_containers() {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();
        let host = document.create_element("div").unwrap();
        host.set_inner_html(
            r#"<table class="transaction-list"><tr class="transaction-row"><td>a</td><td>$1.00</td></tr></table>
               <table class="transaction-list"><tr class="transaction-row"><td>b</td><td>$2.00</td></tr>
                 <tr class="transaction-row"><td>c</td><td>$3.00</td></tr></table>"#,
        );
        body.append_child(&host).unwrap();

        let groups = BrowserPage::current()
            .unwrap()
            .query_within("table.transaction-list", "tr.transaction-row")
            .unwrap();
        body.remove_child(&host).unwrap();

        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 2]);
        assert_eq!(groups[1][1].cells()[0].text(), "c");
    }

    #[wasm_bindgen_test]
    fn test_to_csv_from_js_records() {
        let record = TransactionRecord {
            date: "21/10/2025".to_string(),
            description: "Coffee Shop".to_string(),
            amount: "4.50".to_string(),
            ..Default::default()
        };
        let csv = to_csv_js(to_js(&vec![record]).unwrap()).unwrap();
        assert_eq!(csv, "Date,Description,Amount\n\"21/10/2025\",Coffee Shop,4.50");
    }

    #[wasm_bindgen_test]
    async fn test_process_pdfjs_items() {
        let content = serde_json::json!([{
            "items": [
                { "str": "Oct 21, 2025 Coffee Shop $4.50", "transform": [1, 0, 0, 1, 72, 700] },
                { "type": "beginMarkedContent" },
                { "str": "Statement of account", "transform": [1, 0, 0, 1, 72, 780] }
            ]
        }]);
        let report = process_document(to_js(&content).unwrap()).await.unwrap();
        let report: serde_json::Value = from_js(report).unwrap();

        assert_eq!(report["success"], true);
        assert_eq!(report["count"], 1);
        assert_eq!(report["transactions"][0]["description"], "Coffee Shop");
    }
}
