//! Attribute-driven parsing of the provider's own transaction rows.

use chrono::NaiveDate;
use tracing::trace;

use crate::error::ExtractionError;
use crate::models::config::LayoutConfig;
use crate::models::{AccountType, TransactionRecord, TransactionType};
use crate::source::DomNode;

use super::rules::dates::CANONICAL_DATE_FORMAT;
use super::rules::patterns::DATE_IN_ROW_ID;
use super::rules::{
    force_negative, force_positive, infer_credit_description, is_amount, is_date,
    is_valid_transaction, normalize_date, parse_description_and_vendor, DateExtractor,
    FieldExtractor,
};
use super::{Result, RowParser};

/// Cells shorter than this are never picked as a fallback description.
const MIN_FALLBACK_DESCRIPTION: usize = 5;

/// What a cell holds, read from its layout markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellRole {
    Date,
    Description,
    Withdraw,
    Deposit,
    Balance,
    Reference,
}

impl CellRole {
    /// Keyword lookup over `class`, `headers`, `data-column` and `data-label`.
    fn of(cell: &DomNode) -> Option<Self> {
        let markers = ["class", "headers", "data-column", "data-label"]
            .iter()
            .filter_map(|name| cell.attr(name))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if markers.is_empty() {
            return None;
        }
        if markers.contains("balance") {
            Some(CellRole::Balance)
        } else if markers.contains("withdraw") || markers.contains("debit") {
            Some(CellRole::Withdraw)
        } else if markers.contains("deposit") || markers.contains("credit") {
            Some(CellRole::Deposit)
        } else if markers.contains("date") {
            Some(CellRole::Date)
        } else if ["desc", "merchant", "payee", "detail"]
            .iter()
            .any(|k| markers.contains(k))
        {
            Some(CellRole::Description)
        } else if markers.contains("ref") {
            Some(CellRole::Reference)
        } else {
            None
        }
    }
}

/// Cells of one row, indexed by role.
struct RoleMap<'a> {
    cells: Vec<&'a DomNode>,
    roles: Vec<Option<CellRole>>,
}

impl<'a> RoleMap<'a> {
    fn new(cells: Vec<&'a DomNode>) -> Self {
        let mut roles: Vec<Option<CellRole>> = cells.iter().map(|c| CellRole::of(c)).collect();

        let has_amount_role = roles.iter().any(|r| {
            matches!(
                r,
                Some(CellRole::Withdraw | CellRole::Deposit | CellRole::Balance)
            )
        });

        // Unmarked statement layout: ... | withdraw | deposit | balance,
        // only when those cells hold amounts or nothing.
        let n = cells.len();
        if !has_amount_role
            && n >= 4
            && cells[n - 3..]
                .iter()
                .all(|c| c.text().is_empty() || is_amount(c.text()))
        {
            roles[n - 3] = Some(CellRole::Withdraw);
            roles[n - 2] = Some(CellRole::Deposit);
            roles[n - 1] = Some(CellRole::Balance);
        }

        Self { cells, roles }
    }

    fn index(&self, role: CellRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == Some(role))
    }

    fn cell(&self, role: CellRole) -> Option<&'a DomNode> {
        self.index(role).map(|i| self.cells[i])
    }

    fn text(&self, role: CellRole) -> Option<&'a str> {
        self.cell(role).map(DomNode::text).filter(|t| !t.is_empty())
    }

    /// Amount column text with its cell index, if the cell holds an amount.
    fn amount_cell(&self, role: CellRole) -> Option<(usize, &'a str)> {
        let i = self.index(role)?;
        let text = self.cells[i].text();
        is_amount(text).then_some((i, text))
    }
}

/// Resolved amount and the cell it was read from.
struct Amount {
    text: String,
    cell: Option<usize>,
}

/// Parser for rows carrying the provider's structural markers.
pub struct StructuredRowParser {
    account_type_attribute: String,
    row_id_attributes: Vec<String>,
    dates: DateExtractor,
}

impl StructuredRowParser {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            account_type_attribute: layout.account_type_attribute.clone(),
            row_id_attributes: layout.row_id_attributes.clone(),
            dates: DateExtractor::new(),
        }
    }

    /// Marker on the leading cell, else on the row itself.
    fn account_type(&self, row: &DomNode, cells: &[&DomNode]) -> AccountType {
        cells
            .first()
            .and_then(|c| c.attr(&self.account_type_attribute))
            .or_else(|| row.attr(&self.account_type_attribute))
            .map(AccountType::from_marker)
            .unwrap_or(AccountType::Unknown)
    }

    /// Date cell, then a date inside a row identifier, then row text.
    fn date(&self, row: &DomNode, roles: &RoleMap<'_>) -> String {
        if let Some(text) = roles.text(CellRole::Date) {
            return normalize_date(text);
        }

        for name in &self.row_id_attributes {
            if let Some(date) = row.attr(name).and_then(date_from_row_id) {
                return date;
            }
        }

        self.dates
            .extract(row.text())
            .map(|m| m.value)
            .unwrap_or_default()
    }

    fn description_and_vendor(
        &self,
        account_type: AccountType,
        roles: &RoleMap<'_>,
    ) -> (String, String) {
        let blocks: Vec<String> = match roles.cell(CellRole::Description) {
            Some(cell) => cell.text_blocks().into_iter().map(str::to_string).collect(),
            None => fallback_description(&roles.cells).into_iter().collect(),
        };

        if account_type == AccountType::Credit {
            let vendor = blocks.join(" ");
            let description = infer_credit_description(&vendor).to_string();
            return (description, vendor);
        }

        match blocks.as_slice() {
            [] => (String::new(), String::new()),
            [single] => parse_description_and_vendor(single),
            [description, vendor, ..] => (description.clone(), vendor.clone()),
        }
    }

    fn amount(&self, account_type: AccountType, roles: &RoleMap<'_>) -> Amount {
        let withdraw = roles.amount_cell(CellRole::Withdraw);
        let deposit = roles.amount_cell(CellRole::Deposit);

        let from_columns = match account_type {
            AccountType::Credit => withdraw
                .map(|(i, t)| (i, force_negative(t)))
                .or_else(|| deposit.map(|(i, t)| (i, force_positive(t)))),
            _ => withdraw.or(deposit).map(|(i, t)| (i, t.to_string())),
        };

        from_columns
            .or_else(|| {
                roles
                    .cells
                    .iter()
                    .position(|c| is_amount(c.text()))
                    .map(|i| (i, roles.cells[i].text().to_string()))
            })
            .map(|(i, text)| Amount {
                text,
                cell: Some(i),
            })
            .unwrap_or(Amount {
                text: String::new(),
                cell: None,
            })
    }

    /// Balance column, else the last amount cell other than the one the
    /// amount came from.
    fn balance(&self, roles: &RoleMap<'_>, amount: &Amount) -> String {
        if let Some(text) = roles.text(CellRole::Balance) {
            return text.to_string();
        }
        let source_text = amount.cell.map(|i| roles.cells[i].text());
        roles
            .cells
            .iter()
            .enumerate()
            .filter(|(i, c)| {
                Some(*i) != amount.cell && is_amount(c.text()) && Some(c.text()) != source_text
            })
            .map(|(_, c)| c.text())
            .last()
            .map(str::to_string)
            .unwrap_or_default()
    }
}

impl RowParser for StructuredRowParser {
    fn parse_unit(&self, row: &DomNode) -> Result<Option<TransactionRecord>> {
        let cells = row.cells();
        if cells.is_empty() {
            return Err(ExtractionError::NoCells);
        }

        let account_type = self.account_type(row, &cells);
        let roles = RoleMap::new(cells);

        let date = self.date(row, &roles);
        let (description, vendor) = self.description_and_vendor(account_type, &roles);
        let amount = self.amount(account_type, &roles);
        let balance = self.balance(&roles, &amount);
        let amount = amount.text;
        let reference = roles
            .text(CellRole::Reference)
            .unwrap_or_default()
            .to_string();

        let record = TransactionRecord {
            date,
            account_type: Some(account_type),
            kind: TransactionType::classify(&description),
            description,
            vendor,
            amount,
            balance,
            reference,
            source: None,
        };

        if !is_valid_transaction(&record) {
            trace!("Discarding incomplete row: {:?}", row.text());
            return Ok(None);
        }
        Ok(Some(record))
    }
}

/// ISO or compact date inside an identifier such as `txn-20251021-0042`.
fn date_from_row_id(id: &str) -> Option<String> {
    DATE_IN_ROW_ID.captures_iter(id).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
    })
}

/// Longest cell that is neither a date nor an amount.
fn fallback_description(cells: &[&DomNode]) -> Option<String> {
    cells
        .iter()
        .map(|c| c.text())
        .filter(|t| t.chars().count() > MIN_FALLBACK_DESCRIPTION && !is_date(t) && !is_amount(t))
        .fold(None::<&str>, |best, t| match best {
            Some(b) if b.chars().count() >= t.chars().count() => Some(b),
            _ => Some(t),
        })
        .map(str::to_string)
}
