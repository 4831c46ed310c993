//! # ubl-ebinterface
//!
//! Mapping between OASIS UBL 2.1 Invoice/CreditNote documents and the
//! Austrian ebInterface invoice format, versions 4.0 to 6.0.
//!
//! Business rule violations never abort a conversion. They are collected
//! in an [`ErrorList`] as WARN or ERROR entries with German or English
//! messages; a document is only produced when no ERROR was recorded.
//! All monetary values use [`rust_decimal::Decimal`], rounded HALF_UP.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "xml")] {
//! use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
//! use ubl_ebinterface::ebinterface::{self, EbVersion};
//! use ubl_ebinterface::to_ebinterface::ToEbInterfaceConverter;
//! use ubl_ebinterface::ubl;
//!
//! let xml = r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//!     xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
//!   <cbc:ID>INV1</cbc:ID>
//! </Invoice>"#;
//! let doc = ubl::from_ubl_xml(xml).unwrap();
//!
//! let converter = ToEbInterfaceConverter::new(
//!     EbVersion::V6_0,
//!     Locale::English,
//!     ToEbInterfaceSettings::default(),
//! );
//! let mut errors = ErrorList::new();
//! match converter.convert(&doc, &mut errors).unwrap() {
//!     Some(invoice) => println!("{}", ebinterface::to_xml(&invoice).unwrap()),
//!     None => assert!(errors.contains_errors()),
//! }
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `xml` (default) | UBL and ebInterface XML readers/writers |
//!
//! Without `xml` the crate still offers the document models and both
//! converters on in-memory values.

pub mod core;

pub mod ebinterface;

pub mod ubl;

pub mod to_ebinterface;

pub mod to_ubl;

#[cfg(feature = "xml")]
pub(crate) mod xml_utils;

// Re-export the most used types at crate root
pub use crate::core::{ConversionError, ErrorLevel, ErrorList, Locale, Text, ToEbInterfaceSettings};
pub use crate::ebinterface::EbVersion;
pub use crate::to_ebinterface::ToEbInterfaceConverter;
pub use crate::to_ubl::ToUblConverter;
