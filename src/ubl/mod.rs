//! OASIS UBL 2.x Invoice and CreditNote model, with XML reading and writing.

#[cfg(feature = "xml")]
mod parse;
mod types;
#[cfg(feature = "xml")]
mod write;

#[cfg(feature = "xml")]
pub use parse::from_ubl_xml;
pub use types::*;
#[cfg(feature = "xml")]
pub use write::to_ubl_xml;

/// UBL 2.1 namespace URIs.
pub mod ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
