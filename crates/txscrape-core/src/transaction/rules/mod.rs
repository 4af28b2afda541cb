//! Rule-based field classifiers and normalizers.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod patterns;
pub mod validate;

pub use amounts::{
    force_negative, force_positive, is_amount, normalize_amount, parse_amount, strip_thousands,
    AmountExtractor,
};
pub use dates::{is_date, normalize_date, parse_date, DateExtractor};
pub use description::{infer_credit_description, parse_description_and_vendor};
pub use validate::is_valid_transaction;

/// Trait for field extractors that search inside longer text.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found inside text, with the text it was read from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}
