//! Minimal completeness check for candidate records.

use crate::models::TransactionRecord;

/// A record is kept when it has a non-trivial description or any amount.
/// A missing date never invalidates a record.
pub fn is_valid_transaction(record: &TransactionRecord) -> bool {
    record.description.trim().chars().count() > 2 || !record.amount.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            description: description.to_string(),
            amount: amount.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_amount_alone_is_enough() {
        assert!(is_valid_transaction(&record("", "$10.00")));
    }

    #[test]
    fn test_description_length_boundary() {
        assert!(!is_valid_transaction(&record("ab", "")));
        assert!(is_valid_transaction(&record("abc", "")));
        assert!(!is_valid_transaction(&record("  ab  ", "   ")));
    }

    #[test]
    fn test_date_is_not_required() {
        let mut r = record("Purchase", "");
        r.date.clear();
        assert!(is_valid_transaction(&r));
    }
}
