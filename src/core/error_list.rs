use serde::{Deserialize, Serialize};

use super::text::{Locale, Text};

/// Severity of an error-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorLevel {
    /// A value was defaulted or truncated; conversion continues.
    Warn,
    /// Mandatory data is missing or inconsistent; the document is not produced.
    Error,
}

/// A single entry recorded during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Path of the source field (e.g. `InvoiceLine[2]/Price/PriceAmount`).
    pub field: String,
    pub level: ErrorLevel,
    /// Catalogue key of the message.
    pub text: Text,
    /// Message rendered in the caller's locale.
    pub message: String,
}

impl ErrorEntry {
    pub fn is_error(&self) -> bool {
        self.level == ErrorLevel::Error
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.level {
            ErrorLevel::Warn => "WARN",
            ErrorLevel::Error => "ERROR",
        };
        write!(f, "[{level}] {}: {} ({})", self.field, self.message, self.text)
    }
}

/// Ordered, append-only list of conversion findings.
///
/// Converters require an empty list on entry. At least one
/// [`ErrorLevel::Error`] entry means the conversion produced no document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    entries: Vec<ErrorEntry>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry whose message is rendered from `text` in `locale`.
    pub fn add(
        &mut self,
        level: ErrorLevel,
        field: impl Into<String>,
        text: Text,
        locale: Locale,
        args: &[&str],
    ) {
        let entry = ErrorEntry {
            field: field.into(),
            level,
            text,
            message: text.format(locale, args),
        };
        tracing::trace!(
            field = %entry.field,
            level = ?entry.level,
            key = %entry.text,
            "{}",
            entry.message
        );
        self.entries.push(entry);
    }

    pub fn warn(&mut self, field: impl Into<String>, text: Text, locale: Locale, args: &[&str]) {
        self.add(ErrorLevel::Warn, field, text, locale, args);
    }

    pub fn error(&mut self, field: impl Into<String>, text: Text, locale: Locale, args: &[&str]) {
        self.add(ErrorLevel::Error, field, text, locale, args);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_errors(&self) -> bool {
        self.entries.iter().any(ErrorEntry::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter().filter(|e| e.level == ErrorLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter().filter(|e| e.level == ErrorLevel::Warn)
    }

    /// True if an entry with the given catalogue key was recorded.
    pub fn contains_text(&self, text: Text) -> bool {
        self.entries.iter().any(|e| e.text == text)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[ErrorEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut list = ErrorList::new();
        list.warn("A", Text::MissingQuantity, Locale::English, &[]);
        list.error("B", Text::MissingInvoiceNumber, Locale::English, &[]);
        list.warn("C", Text::MissingQuantityUnit, Locale::English, &["C62"]);

        let fields: Vec<_> = list.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["A", "B", "C"]);
        assert_eq!(list.error_count(), 1);
        assert_eq!(list.warning_count(), 2);
        assert!(list.contains_errors());
        assert!(list.contains_text(Text::MissingQuantityUnit));
    }

    #[test]
    fn warnings_only_is_not_an_error() {
        let mut list = ErrorList::new();
        list.warn("ID", Text::InvalidPositionNumber, Locale::German, &["x", "1"]);
        assert!(!list.contains_errors());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn display_includes_level_and_key() {
        let mut list = ErrorList::new();
        list.error("ID", Text::MissingInvoiceNumber, Locale::English, &[]);
        let s = list.as_slice()[0].to_string();
        assert_eq!(
            s,
            "[ERROR] ID: The invoice number is missing. (MISSING_INVOICE_NUMBER)"
        );
    }
}
