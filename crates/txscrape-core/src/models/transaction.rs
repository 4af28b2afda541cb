//! Canonical transaction record produced by every extraction path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Posting context inferred from structural markers on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Chequing/savings posting.
    Debit,
    /// Credit card posting.
    Credit,
    /// Marker present but not recognized.
    Unknown,
}

impl AccountType {
    /// Classify a marker attribute value.
    pub fn from_marker(value: &str) -> Self {
        let value = value.to_ascii_lowercase();
        if value.contains("credit") || value.contains("card") {
            AccountType::Credit
        } else if value.contains("debit")
            || value.contains("chequing")
            || value.contains("checking")
            || value.contains("savings")
        {
            AccountType::Debit
        } else {
            AccountType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Debit => "debit",
            AccountType::Credit => "credit",
            AccountType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse secondary classification derived from the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Interac,
    Contactless,
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
}

impl TransactionType {
    /// Keyword priority order; the first keyword found wins.
    pub const PRIORITY: [TransactionType; 6] = [
        TransactionType::Interac,
        TransactionType::Contactless,
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Interac => "Interac",
            TransactionType::Contactless => "Contactless",
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Transfer => "Transfer",
            TransactionType::Payment => "Payment",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            TransactionType::Interac => "interac",
            TransactionType::Contactless => "contactless",
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
            TransactionType::Payment => "payment",
        }
    }

    /// Classify a description by keyword search.
    pub fn classify(description: &str) -> Option<Self> {
        let lower = description.to_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|kind| lower.contains(kind.keyword()))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record came from. Web records leave this unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Pdf,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Pdf => "pdf",
        }
    }
}

/// One normalized transaction.
///
/// Text fields use the empty string for "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// `DD/MM/YYYY` when normalization applied, otherwise the raw text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,

    /// Set only by the structural row strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,

    /// Short category label ("Purchase", "Payment", ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Merchant or payee.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,

    /// Signed amount text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub amount: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub balance: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RecordSource>,
}

impl TransactionRecord {
    /// Value of a column as it appears in exports.
    pub fn field(&self, column: Column) -> String {
        match column {
            Column::Date => self.date.clone(),
            Column::AccountType => self
                .account_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            Column::Description => self.description.clone(),
            Column::Vendor => self.vendor.clone(),
            Column::Type => self.kind.map(|t| t.as_str().to_string()).unwrap_or_default(),
            Column::Amount => self.amount.clone(),
            Column::Balance => self.balance.clone(),
            Column::Reference => self.reference.clone(),
            Column::Source => self.source.map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

/// Export columns in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    AccountType,
    Description,
    Vendor,
    Type,
    Amount,
    Balance,
    Reference,
    Source,
}

impl Column {
    pub const CANONICAL_ORDER: [Column; 9] = [
        Column::Date,
        Column::AccountType,
        Column::Description,
        Column::Vendor,
        Column::Type,
        Column::Amount,
        Column::Balance,
        Column::Reference,
        Column::Source,
    ];

    /// Record field name (as serialized).
    pub fn field_name(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::AccountType => "accountType",
            Column::Description => "description",
            Column::Vendor => "vendor",
            Column::Type => "type",
            Column::Amount => "amount",
            Column::Balance => "balance",
            Column::Reference => "reference",
            Column::Source => "source",
        }
    }

    /// Fixed header label, if the column has one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Column::Date => Some("Date"),
            Column::AccountType => Some("Account Type"),
            Column::Description => Some("Description"),
            Column::Vendor => Some("Vendor"),
            Column::Type => Some("Type"),
            Column::Amount => Some("Amount"),
            Column::Balance => Some("Balance"),
            Column::Reference => Some("Reference"),
            Column::Source => None,
        }
    }

    /// Header text: fixed label, else the capitalized field name.
    pub fn header(&self) -> String {
        match self.label() {
            Some(label) => label.to_string(),
            None => capitalize(self.field_name()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Best-effort account metadata scraped next to the transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Masked number such as `****1234`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.number.is_none() && self.balance.is_none()
    }
}
