//! Raw source abstraction for page scraping.
//!
//! Parsers only ever see `DomNode` snapshots, so they run the same against a
//! saved HTML file, a live browser document, or a hand-built test tree.

#[cfg(feature = "native")]
mod html;

#[cfg(feature = "native")]
pub use html::HtmlPage;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Owned snapshot of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes, lowercase names.
    pub attrs: BTreeMap<String, String>,
    /// Whitespace-collapsed text content of the whole subtree.
    pub text: String,
    /// Element children.
    pub children: Vec<DomNode>,
    /// Not rendered (hidden itself or through an ancestor).
    pub hidden: bool,
}

impl DomNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = collapse_whitespace(text);
        self
    }

    /// Append a child, extending this node's text with the child's.
    pub fn with_child(mut self, child: DomNode) -> Self {
        if !child.text.is_empty() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(&child.text);
        }
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Table cells (`td`/`th`) directly under this row.
    pub fn cells(&self) -> Vec<&DomNode> {
        self.children
            .iter()
            .filter(|c| c.tag == "td" || c.tag == "th")
            .collect()
    }

    /// Separate text blocks inside a cell: non-empty element children,
    /// or the node's own text when it has none.
    pub fn text_blocks(&self) -> Vec<&str> {
        let blocks: Vec<&str> = self
            .children
            .iter()
            .map(DomNode::text)
            .filter(|t| !t.is_empty())
            .collect();
        if blocks.is_empty() && !self.text().is_empty() {
            vec![self.text()]
        } else {
            blocks
        }
    }

    pub fn is_visible(&self) -> bool {
        if self.hidden || self.attr("hidden").is_some() {
            return false;
        }
        if self.attr("aria-hidden") == Some("true") {
            return false;
        }
        let style: String = self
            .attr("style")
            .unwrap_or("")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        !(style.contains("display:none") || style.contains("visibility:hidden"))
    }

    pub fn is_enabled(&self) -> bool {
        self.attr("disabled").is_none() && self.attr("aria-disabled") != Some("true")
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A queryable document.
pub trait DomSource {
    /// All elements matching a CSS selector, in document order.
    fn query(&self, selector: &str) -> Result<Vec<DomNode>, SourceError>;

    /// For each element matching `container`, its descendants matching
    /// `selector`. Groups and rows are in document order.
    fn query_within(
        &self,
        container: &str,
        selector: &str,
    ) -> Result<Vec<Vec<DomNode>>, SourceError>;

    /// Rendered page text, one block element per line.
    fn page_text(&self) -> String;
}

/// A document that can reveal more rows on request.
pub trait IncrementalSource: DomSource {
    /// Activate the `index`-th element matching `selector`.
    ///
    /// Returns `false` when the source cannot activate controls.
    fn trigger(
        &self,
        selector: &str,
        index: usize,
    ) -> impl Future<Output = Result<bool, SourceError>>;

    /// Suspend for `duration`.
    fn wait(&self, duration: Duration) -> impl Future<Output = ()>;
}
