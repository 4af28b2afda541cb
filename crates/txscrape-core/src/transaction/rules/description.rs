//! Description/vendor splitting and category inference.

/// Split a single free-text block into `(description, vendor)`.
///
/// Separators are tried in order: ` - ` (first segment / last segment),
/// ` from `, ` to ` (both case-insensitive). Without a separator the whole
/// text is the description.
pub fn parse_description_and_vendor(text: &str) -> (String, String) {
    let text = text.trim();

    if let (Some(first), Some(last)) = (text.find(" - "), text.rfind(" - ")) {
        let description = text[..first].trim();
        let vendor = text[last + 3..].trim();
        return (description.to_string(), vendor.to_string());
    }

    for separator in [" from ", " to "] {
        if let Some(idx) = find_ignore_ascii_case(text, separator) {
            let description = text[..idx].trim();
            let vendor = text[idx + separator.len()..].trim();
            return (description.to_string(), vendor.to_string());
        }
    }

    (text.to_string(), String::new())
}

/// Category label for a credit card posting, inferred from its text.
pub fn infer_credit_description(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("payment") {
        "Payment"
    } else if lower.contains("refund") {
        "Refund"
    } else {
        "Purchase"
    }
}

/// Byte offset of `needle` in `haystack`, ignoring ASCII case.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_dash_uses_first_and_last_segment() {
        assert_eq!(
            parse_description_and_vendor("Purchase - POS 1234 - TIM HORTONS #88"),
            ("Purchase".to_string(), "TIM HORTONS #88".to_string())
        );
    }

    #[test]
    fn test_split_on_from_and_to() {
        assert_eq!(
            parse_description_and_vendor("Interac e-Transfer From JANE DOE"),
            ("Interac e-Transfer".to_string(), "JANE DOE".to_string())
        );
        assert_eq!(
            parse_description_and_vendor("Transfer to Savings"),
            ("Transfer".to_string(), "Savings".to_string())
        );
    }

    #[test]
    fn test_no_separator() {
        assert_eq!(
            parse_description_and_vendor("  Monthly fee "),
            ("Monthly fee".to_string(), String::new())
        );
    }

    #[test]
    fn test_infer_credit_description() {
        assert_eq!(infer_credit_description("PAYMENT - THANK YOU"), "Payment");
        assert_eq!(infer_credit_description("Refund AMAZON.CA"), "Refund");
        assert_eq!(infer_credit_description("AMAZON.CA"), "Purchase");
    }
}
