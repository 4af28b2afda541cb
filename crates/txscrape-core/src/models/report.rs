//! Structured results returned across the library boundary.

use serde::{Deserialize, Serialize};

use super::transaction::{AccountInfo, TransactionRecord};
use crate::error::TxError;
use crate::transaction::Strategy;

/// Result of a full extraction pass (web or PDF).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// False only when the pass could not run.
    pub success: bool,

    /// Number of records; zero with `success` means "ran fine, nothing found".
    pub count: usize,

    pub transactions: Vec<TransactionRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_info: Option<AccountInfo>,

    /// Strategy that produced the records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Count advertised by the page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<usize>,

    /// Units skipped because they failed to parse.
    #[serde(default)]
    pub skipped: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Rejected because another pass was still running.
    #[serde(default)]
    pub busy: bool,
}

impl ExtractionReport {
    pub fn succeeded(transactions: Vec<TransactionRecord>) -> Self {
        Self {
            success: true,
            count: transactions.len(),
            transactions,
            ..Default::default()
        }
    }

    pub fn failed(error: &TxError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            busy: matches!(error, TxError::Busy),
            ..Default::default()
        }
    }

    /// Whether the failure was a rejected overlapping request.
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// Result of a cheap unit count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReport {
    pub success: bool,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_busy_is_carried_by_kind() {
        let busy = ExtractionReport::failed(&TxError::Busy);
        assert!(busy.is_busy());
        assert_eq!(serde_json::to_value(&busy).unwrap()["busy"], true);

        // Same message, different failure.
        let other = ExtractionReport::failed(&TxError::Config(TxError::Busy.to_string()));
        assert!(!other.is_busy());

        let unavailable =
            ExtractionReport::failed(&SourceError::Unavailable("no page".to_string()).into());
        assert!(!unavailable.is_busy());
        assert!(!ExtractionReport::succeeded(Vec::new()).is_busy());
    }
}
