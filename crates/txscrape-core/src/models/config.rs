//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::TxError;

/// Main configuration for the txscrape pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Incremental ("show more") loading.
    pub load: LoadConfig,

    /// Page layout markers for the supported provider.
    pub layout: LayoutConfig,

    /// PDF statement configuration.
    pub pdf: PdfConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Incremental-load loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Hard ceiling on load-more activations.
    pub max_attempts: u32,

    /// Interval between unit-count polls after a trigger.
    pub poll_interval_ms: u64,

    /// Longest wait for growth after a single trigger.
    pub growth_timeout_ms: u64,

    /// Delay after the loop settles, before parsing.
    pub settle_delay_ms: u64,

    /// Candidate controls for loading more rows.
    pub control_selector: String,

    /// Control texts (lowercase) that identify a load-more control.
    pub control_vocabulary: Vec<String>,
}

impl LoadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn growth_timeout(&self) -> Duration {
        Duration::from_millis(self.growth_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            poll_interval_ms: 250,
            growth_timeout_ms: 15_000,
            settle_delay_ms: 1_500,
            control_selector: "button, a[role=button], [role=button], a".to_string(),
            control_vocabulary: vec![
                "show more".to_string(),
                "load more".to_string(),
                "view more".to_string(),
                "more transactions".to_string(),
                "see more".to_string(),
            ],
        }
    }
}

/// Structural markers of the provider's transaction page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Candidate transaction containers (duplicates are expected).
    pub container_selector: String,

    /// Structural transaction rows, within a container or page-wide.
    pub row_selector: String,

    /// Leading-cell attribute carrying the debit/credit marker.
    pub account_type_attribute: String,

    /// Row attributes that may embed the posting date.
    pub row_id_attributes: Vec<String>,

    /// Generic table rows for the tabular fallback.
    pub table_row_selector: String,

    /// Elements whose text is tried as free-text transaction lines.
    pub text_line_selector: String,

    /// Elements holding the "N transactions" result count.
    pub result_count_selector: String,

    /// Account name cascade.
    pub account_name_selectors: Vec<String>,

    /// Masked account number cascade.
    pub account_number_selectors: Vec<String>,

    /// Current balance cascade.
    pub account_balance_selectors: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container_selector: "[data-transaction-list], table.transaction-list, .transactions-table"
                .to_string(),
            row_selector: "tr[data-transaction-id], tr.transaction-row".to_string(),
            account_type_attribute: "data-account-type".to_string(),
            row_id_attributes: vec!["data-transaction-id".to_string(), "id".to_string()],
            table_row_selector: "table tr".to_string(),
            text_line_selector: "li, p, .transaction, [data-transaction]".to_string(),
            result_count_selector: "[data-result-count], .result-count, .transaction-count"
                .to_string(),
            account_name_selectors: vec![
                "[data-account-name]".to_string(),
                ".account-name".to_string(),
                ".account-title".to_string(),
            ],
            account_number_selectors: vec![
                "[data-account-number]".to_string(),
                ".account-number".to_string(),
            ],
            account_balance_selectors: vec![
                "[data-current-balance]".to_string(),
                ".account-balance".to_string(),
                ".current-balance".to_string(),
            ],
        }
    }
}

/// PDF statement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Vertical distance under which fragments share a line.
    pub line_tolerance: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { line_tolerance: 2.0 }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Leading part of exported file names.
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "transactions".to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TxError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), TxError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| TxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ScrapeConfig =
            serde_json::from_str(r#"{ "load": { "max_attempts": 5 } }"#).unwrap();

        assert_eq!(config.load.max_attempts, 5);
        assert_eq!(config.load.growth_timeout_ms, 15_000);
        assert_eq!(config.pdf.line_tolerance, 2.0);
        assert_eq!(config.export.file_prefix, "transactions");
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = std::env::temp_dir().join(format!("txscrape-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "load": { "max_attempts": "many" } }"#).unwrap();

        let err = ScrapeConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, TxError::Config(_)), "got {err:?}");

        let missing = ScrapeConfig::from_file(&dir.join("absent.json")).unwrap_err();
        assert!(matches!(missing, TxError::Io(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("txscrape-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = ScrapeConfig::default();
        config.export.file_prefix = "rbc".to_string();
        config.save(&path).unwrap();

        let loaded = ScrapeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.export.file_prefix, "rbc");

        std::fs::remove_dir_all(&dir).ok();
    }
}
