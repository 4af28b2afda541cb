//! Best-effort page metadata: expected result count and account details.

use std::cell::OnceCell;

use tracing::debug;

use crate::models::config::LayoutConfig;
use crate::models::AccountInfo;
use crate::source::{DomNode, DomSource};
use crate::transaction::rules::patterns::{
    FIRST_INTEGER, LABELED_BALANCE, MASKED_ACCOUNT_NUMBER, RESULT_COUNT_TEXT,
};
use crate::transaction::rules::{AmountExtractor, FieldExtractor};

/// Counts at or above this are treated as noise (years, ids).
const MAX_PLAUSIBLE_COUNT: usize = 100_000;

fn plausible_count(raw: &str) -> Option<usize> {
    raw.replace(',', "")
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0 && *n < MAX_PLAUSIBLE_COUNT)
}

/// Elements for a selector, logging instead of failing.
fn query_quiet<S: DomSource>(source: &S, selector: &str) -> Vec<DomNode> {
    source.query(selector).unwrap_or_else(|e| {
        debug!("Metadata selector skipped: {}", e);
        Vec::new()
    })
}

/// First visible element, across a selector cascade, whose text `pick` accepts.
fn first_match<S, F>(source: &S, selectors: &[String], pick: F) -> Option<String>
where
    S: DomSource,
    F: Fn(&str) -> Option<String>,
{
    selectors.iter().find_map(|selector| {
        query_quiet(source, selector)
            .iter()
            .filter(|n| n.is_visible())
            .find_map(|n| pick(n.text()))
    })
}

/// The total the page says it holds, if it says.
pub(crate) fn expected_count<S: DomSource>(source: &S, layout: &LayoutConfig) -> Option<usize> {
    for node in query_quiet(source, &layout.result_count_selector) {
        let candidates = node
            .attr("data-result-count")
            .into_iter()
            .chain(std::iter::once(node.text()));

        for text in candidates {
            if let Some(n) = FIRST_INTEGER
                .find_iter(text)
                .find_map(|m| plausible_count(m.as_str()))
            {
                return Some(n);
            }
        }
    }

    let page = source.page_text();
    RESULT_COUNT_TEXT
        .captures_iter(&page)
        .find_map(|caps| plausible_count(&caps[1]))
}

/// Name, masked number and balance, each from its own selector cascade.
pub(crate) fn account_info<S: DomSource>(source: &S, layout: &LayoutConfig) -> Option<AccountInfo> {
    let page = OnceCell::new();
    let page_text = || page.get_or_init(|| source.page_text()).as_str();

    let name = first_match(source, &layout.account_name_selectors, |text| {
        (!text.is_empty()).then(|| text.to_string())
    });

    let number = first_match(source, &layout.account_number_selectors, |text| {
        MASKED_ACCOUNT_NUMBER.find(text).map(|m| m.as_str().to_string())
    })
    .or_else(|| {
        MASKED_ACCOUNT_NUMBER
            .find(page_text())
            .map(|m| m.as_str().to_string())
    });

    let amounts = AmountExtractor::new();
    let balance = first_match(source, &layout.account_balance_selectors, |text| {
        amounts.extract(text).map(|m| m.value)
    })
    .or_else(|| {
        LABELED_BALANCE
            .captures(page_text())
            .map(|caps| caps[1].to_string())
    });

    let info = AccountInfo {
        name,
        number,
        balance,
    };
    (!info.is_empty()).then_some(info)
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use crate::source::HtmlPage;

    #[test]
    fn test_expected_count_from_selector_then_text() {
        let layout = LayoutConfig::default();

        let page = HtmlPage::parse(r#"<div class="result-count">1,240 transactions</div>"#);
        assert_eq!(expected_count(&page, &layout), Some(1240));

        let page = HtmlPage::parse("<p>Viewing 1-25 of 312 transactions</p>");
        assert_eq!(expected_count(&page, &layout), Some(312));

        let page = HtmlPage::parse("<p>Nothing here</p>");
        assert_eq!(expected_count(&page, &layout), None);
    }

    #[test]
    fn test_account_info_cascades() {
        let page = HtmlPage::parse(
            r#"<h1 class="account-title">Everyday Chequing</h1>
               <span class="account-number">Account ****1234</span>
               <p>Current balance: $2,450.12</p>"#,
        );
        let info = account_info(&page, &LayoutConfig::default()).unwrap();

        assert_eq!(info.name.as_deref(), Some("Everyday Chequing"));
        assert_eq!(info.number.as_deref(), Some("****1234"));
        assert_eq!(info.balance.as_deref(), Some("$2,450.12"));
    }

    #[test]
    fn test_balance_element_amount_inside_text() {
        let page = HtmlPage::parse(
            r#"<div class="account-balance">Available: $1,020.55 CAD</div>"#,
        );
        let info = account_info(&page, &LayoutConfig::default()).unwrap();
        assert_eq!(info.balance.as_deref(), Some("$1,020.55"));
    }

    #[test]
    fn test_account_info_absent() {
        let page = HtmlPage::parse("<p>Hello</p>");
        assert_eq!(account_info(&page, &LayoutConfig::default()), None);
    }
}
