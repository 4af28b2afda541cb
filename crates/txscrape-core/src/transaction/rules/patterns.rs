//! Common regex patterns for transaction field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Month names, full or abbreviated, with an optional trailing period.
const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

/// Numeric dates inside free text (M/D/Y, M-D-Y, Y-M-D).
const DATE_NUMERIC_TEXT: &str = r"\d{1,2}/\d{1,2}/\d{4}|\d{1,2}-\d{1,2}-\d{4}|\d{4}-\d{2}-\d{2}";

/// Signed amount inside free text.
const AMOUNT_SIGNED_TEXT: &str =
    r"\(?-?\$?-?\(?\d{1,3}(?:,\d{3})*(?:\.\d{2})\)?|\(?-?\$?\d+\.\d{2}\)?";

/// Unsigned amount inside free text.
const AMOUNT_UNSIGNED_TEXT: &str = r"\$?\d{1,3}(?:,\d{3})*\.\d{2}|\$?\d+\.\d{2}";

lazy_static! {
    // Full-string date shapes (classifier)
    pub static ref DATE_SLASH: Regex = Regex::new(
        r"^\d{1,2}/\d{1,2}/\d{2,4}$"
    ).unwrap();

    pub static ref DATE_DASH: Regex = Regex::new(
        r"^\d{1,2}-\d{1,2}-\d{2,4}$"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"^\d{4}-\d{1,2}-\d{1,2}$"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        &format!(r"(?i)^{MONTH}\s+\d{{1,2}},?\s+\d{{4}}$")
    ).unwrap();

    // Capturing date shapes (normalizer), tried in this order
    pub static ref NORM_MONTH_NAME: Regex = Regex::new(
        &format!(r"(?i)^({MONTH})\s+(\d{{1,2}}),?\s+(\d{{4}})$")
    ).unwrap();

    pub static ref NORM_MDY_SLASH: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4})$"
    ).unwrap();

    pub static ref NORM_MDY_DASH: Regex = Regex::new(
        r"^(\d{1,2})-(\d{1,2})-(\d{4})$"
    ).unwrap();

    pub static ref NORM_YMD: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})$"
    ).unwrap();

    // Dates anywhere in a string
    pub static ref DATE_IN_TEXT: Regex = Regex::new(
        &format!(r"(?i)\b(?:{MONTH}\s+\d{{1,2}},?\s+\d{{4}}|{DATE_NUMERIC_TEXT})\b")
    ).unwrap();

    pub static ref LABELED_DATE: Regex = Regex::new(
        &format!(r"(?i)(?:date|posted|posting|on)\s*:?\s*({MONTH}\s+\d{{1,2}},?\s+\d{{4}}|{DATE_NUMERIC_TEXT})")
    ).unwrap();

    /// ISO or compact `YYYYMMDD` date embedded in a row identifier.
    pub static ref DATE_IN_ROW_ID: Regex = Regex::new(
        r"(\d{4})-?(\d{2})-?(\d{2})"
    ).unwrap();

    // Full-string amount shapes (classifier)
    pub static ref AMOUNT_SHAPES: [Regex; 7] = [
        // $1,234.56
        Regex::new(r"^\$?\d{1,3}(?:,\d{3})+\.\d{2}$").unwrap(),
        // $123.45
        Regex::new(r"^\$?\d+\.\d{2}$").unwrap(),
        // -$1,234.56
        Regex::new(r"^-\$?\d{1,3}(?:,\d{3})+\.\d{2}$").unwrap(),
        // -$123.45
        Regex::new(r"^-\$?\d+\.\d{2}$").unwrap(),
        // $-123.45
        Regex::new(r"^\$-\d{1,3}(?:,?\d{3})*\.\d{2}$").unwrap(),
        // (123.45) and ($123.45)
        Regex::new(r"^\(\$?\d{1,3}(?:,?\d{3})*\.\d{2}\)$").unwrap(),
        // $(123.45)
        Regex::new(r"^\$\(\d{1,3}(?:,?\d{3})*\.\d{2}\)$").unwrap(),
    ];

    /// Amounts anywhere in a string.
    pub static ref AMOUNT_IN_TEXT: Regex = Regex::new(
        r"-?\$?\(?-?\d{1,3}(?:,\d{3})*\.\d{2}\)?|-?\$?\(?\d+\.\d{2}\)?"
    ).unwrap();

    // Free-text line templates; numeric forms first, then month-name forms
    pub static ref LINE_TEMPLATES: Vec<(&'static str, Regex)> = {
        let numeric = format!("(?:{DATE_NUMERIC_TEXT})");
        let month = format!(r"(?:{MONTH}\s+\d{{1,2}},?\s+\d{{4}})");
        let signed = format!("(?:{AMOUNT_SIGNED_TEXT})");
        let unsigned = format!("(?:{AMOUNT_UNSIGNED_TEXT})");

        let layouts = |date: &str| {
            [
                format!(r"(?i)^(?P<date>{date})\s+(?P<amount>{signed})\s+(?P<desc>.+)$"),
                format!(r"(?i)^(?P<desc>.+?)\s+(?P<date>{date})\s+(?P<amount>{signed})$"),
                format!(r"(?i)^(?P<date>{date})\s+(?P<desc>.+?)\s+(?P<amount>{unsigned})$"),
            ]
        };

        let numeric_names = [
            "date-amount-description",
            "description-date-amount",
            "date-description-amount",
        ];
        let month_names = [
            "month-date-amount-description",
            "month-description-date-amount",
            "month-date-description-amount",
        ];

        let mut templates = Vec::with_capacity(6);
        for (name, pattern) in numeric_names.into_iter().zip(layouts(&numeric)) {
            templates.push((name, Regex::new(&pattern).unwrap()));
        }
        for (name, pattern) in month_names.into_iter().zip(layouts(&month)) {
            templates.push((name, Regex::new(&pattern).unwrap()));
        }
        templates
    };

    // Page metadata
    pub static ref RESULT_COUNT_TEXT: Regex = Regex::new(
        r"(?i)(?:of\s+)?(\d{1,3}(?:,\d{3})*|\d+)\s+(?:transactions|results|items|entries)\b"
    ).unwrap();

    pub static ref FIRST_INTEGER: Regex = Regex::new(
        r"\d{1,3}(?:,\d{3})+|\d+"
    ).unwrap();

    pub static ref MASKED_ACCOUNT_NUMBER: Regex = Regex::new(
        r"(?:[*•xX]{2,}[\s-]?)+\d{3,4}\b"
    ).unwrap();

    pub static ref LABELED_BALANCE: Regex = Regex::new(
        r"(?i)(?:current|available|account)\s+balance\s*:?\s*(-?\$?\d{1,3}(?:,\d{3})*\.\d{2}|-?\$?\d+\.\d{2})"
    ).unwrap();
}
