//! Saved HTML page snapshots, parsed with scraper.

use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::{collapse_whitespace, DomNode, DomSource, IncrementalSource};
use crate::error::SourceError;

/// Tags that start a new line in rendered page text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "br", "dd", "div", "dl", "dt", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "section", "table",
    "tbody", "thead", "tfoot", "tr", "ul",
];

/// Tags whose text is never rendered.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A static page snapshot. It cannot load more rows.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let html = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Ok(Self::parse(&html))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SourceError> {
    Selector::parse(selector).map_err(|e| SourceError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn snapshot(el: ElementRef<'_>) -> DomNode {
    to_node(el, ancestor_hidden(el))
}

impl DomSource for HtmlPage {
    fn query(&self, selector: &str) -> Result<Vec<DomNode>, SourceError> {
        let parsed = parse_selector(selector)?;
        Ok(self.document.select(&parsed).map(snapshot).collect())
    }

    fn query_within(
        &self,
        container: &str,
        selector: &str,
    ) -> Result<Vec<Vec<DomNode>>, SourceError> {
        let containers = parse_selector(container)?;
        let rows = parse_selector(selector)?;
        Ok(self
            .document
            .select(&containers)
            .map(|c| c.select(&rows).map(snapshot).collect())
            .collect())
    }

    fn page_text(&self) -> String {
        let mut out = String::new();
        collect_text(self.document.root_element(), &mut out);
        out.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IncrementalSource for HtmlPage {
    async fn trigger(&self, selector: &str, index: usize) -> Result<bool, SourceError> {
        debug!("Static snapshot cannot activate {} #{}", selector, index);
        Ok(false)
    }

    async fn wait(&self, _duration: Duration) {}
}

fn hidden_by_attrs(el: ElementRef<'_>) -> bool {
    let value = el.value();
    if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
        return true;
    }
    let style: String = value
        .attr("style")
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    style.contains("display:none") || style.contains("visibility:hidden")
}

fn ancestor_hidden(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(hidden_by_attrs)
}

fn to_node(el: ElementRef<'_>, parent_hidden: bool) -> DomNode {
    let value = el.value();
    let hidden = parent_hidden || hidden_by_attrs(el);

    DomNode {
        tag: value.name().to_ascii_lowercase(),
        attrs: value
            .attrs()
            .map(|(name, v)| (name.to_ascii_lowercase(), v.to_string()))
            .collect(),
        text: collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")),
        children: el
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| to_node(child, hidden))
            .collect(),
        hidden,
    }
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if matches!(child_el.value().name(), "td" | "th") {
                out.push(' ');
            }
            collect_text(child_el, out);
        }
    }

    if block {
        out.push('\n');
    }
}
