//! Amount classification, normalization and sign correction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_IN_TEXT, AMOUNT_SHAPES};
use super::{ExtractionMatch, FieldExtractor};

/// Whether the whole trimmed text is an amount.
///
/// Requires two decimals; `$123` and `123` are not amounts.
pub fn is_amount(text: &str) -> bool {
    let text = text.trim();
    AMOUNT_SHAPES.iter().any(|shape| shape.is_match(text))
}

/// Parse an amount, dropping currency symbols and thousands separators.
/// Parenthesized values are negative.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let negative_parens = trimmed.contains('(') && trimmed.contains(')');

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // A minus may sit on either side of the currency symbol.
    let negative_sign = cleaned.starts_with('-');
    let digits = cleaned.trim_start_matches('-');
    if digits.contains('-') {
        return None;
    }

    let value = Decimal::from_str(digits).ok()?;
    if negative_parens || negative_sign {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Normalize to a fixed two-decimal string.
///
/// Non-numeric input comes back unchanged. The sign follows the parsed
/// value; polarity corrections are applied separately.
pub fn normalize_amount(raw: &str) -> String {
    match parse_amount(raw) {
        Some(value) => format!("{:.2}", value.round_dp(2)),
        None => raw.to_string(),
    }
}

/// Force a charge negative, keeping the source's currency notation.
pub fn force_negative(raw: &str) -> String {
    let text = raw.trim();
    if text.starts_with('-') || text.starts_with("$-") || text.starts_with('(') {
        text.to_string()
    } else {
        format!("-{text}")
    }
}

/// Force a payment or refund positive by stripping a leading minus.
pub fn force_positive(raw: &str) -> String {
    let text = raw.trim();
    if let Some(rest) = text.strip_prefix('-') {
        rest.trim_start().to_string()
    } else if let Some(rest) = text.strip_prefix("$-") {
        format!("${rest}")
    } else if text.starts_with('(') && text.ends_with(')') {
        text[1..text.len() - 1].to_string()
    } else if let Some(inner) = text.strip_prefix("$(").and_then(|t| t.strip_suffix(')')) {
        format!("${inner}")
    } else {
        text.to_string()
    }
}

/// Remove thousands separators.
pub fn strip_thousands(raw: &str) -> String {
    raw.replace(',', "")
}

/// Finds amounts inside longer text.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT_IN_TEXT
            .find_iter(text)
            .map(|m| ExtractionMatch::new(m.as_str().trim().to_string(), m.as_str()))
            .collect()
    }
}
