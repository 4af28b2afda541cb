//! Date classification and normalization.

use chrono::NaiveDate;

use super::patterns::{
    DATE_DASH, DATE_IN_TEXT, DATE_ISO, DATE_MONTH_NAME, DATE_SLASH, LABELED_DATE, NORM_MDY_DASH,
    NORM_MDY_SLASH, NORM_MONTH_NAME, NORM_YMD,
};
use super::{ExtractionMatch, FieldExtractor};

/// Canonical output format.
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Whether the whole trimmed text is a date.
pub fn is_date(text: &str) -> bool {
    let text = text.trim();
    DATE_SLASH.is_match(text)
        || DATE_DASH.is_match(text)
        || DATE_ISO.is_match(text)
        || DATE_MONTH_NAME.is_match(text)
}

/// Normalize a date to `DD/MM/YYYY`.
///
/// Unrecognized input comes back unchanged; callers treat an unchanged value
/// as "normalization did not apply".
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw)
        .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Parse any supported shape. First matching shape wins.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();

    if let Some(caps) = NORM_MONTH_NAME.captures(text) {
        let month = month_to_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = NORM_MDY_SLASH
        .captures(text)
        .or_else(|| NORM_MDY_DASH.captures(text))
    {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = NORM_YMD.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn month_to_number(month: &str) -> Option<u32> {
    let month = month.trim_end_matches('.').to_lowercase();
    let number = match month.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

/// Finds dates inside longer text and normalizes them.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Prefer a date introduced by a keyword ("Date:", "Posted"), then any date.
    pub fn extract_labeled(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = LABELED_DATE.captures(text)?;
        let m = caps.get(1)?;
        Some(ExtractionMatch::new(normalize_date(m.as_str()), m.as_str()))
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_labeled(text)
            .or_else(|| self.extract_all(text).into_iter().next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_IN_TEXT
            .find_iter(text)
            .filter(|m| parse_date(m.as_str()).is_some())
            .map(|m| ExtractionMatch::new(normalize_date(m.as_str()), m.as_str()))
            .collect()
    }
}
