use thiserror::Error;

/// Errors that abort a call before or outside the field mapping.
///
/// Business-rule problems found while mapping never show up here; they
/// are recorded in the caller's [`ErrorList`](super::ErrorList).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// XML reading or writing failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// The root element is neither a UBL Invoice nor a UBL CreditNote.
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),

    /// The root namespace does not belong to a supported ebInterface version.
    #[error("unknown ebInterface namespace: {0}")]
    UnknownNamespace(String),

    /// The caller broke an API precondition (e.g. passed a non-empty error list).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A derived amount left the `Decimal` range while writing.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Settings could not be loaded.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ConversionError::Xml("unexpected EOF".into()).to_string(),
            "XML error: unexpected EOF"
        );
        assert_eq!(
            ConversionError::Precondition("error list must be empty".into()).to_string(),
            "precondition violated: error list must be empty"
        );
        assert_eq!(
            ConversionError::AmountOutOfRange("ListLineItem[1]/TaxItem".into()).to_string(),
            "amount out of range: ListLineItem[1]/TaxItem"
        );
    }

    #[test]
    fn settings_error_from_serde() {
        let err: ConversionError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ConversionError::Settings(_)));
    }
}
