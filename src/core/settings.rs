//! Configuration for the UBL → ebInterface direction.

use serde::{Deserialize, Serialize};

use super::error::ConversionError;

/// Flags consulted read-only while converting to ebInterface.
///
/// The defaults are the most lenient variant: nothing beyond what the
/// ebInterface schema itself requires is enforced.
///
/// ```
/// use ubl_ebinterface::core::ToEbInterfaceSettings;
///
/// let settings = ToEbInterfaceSettings::from_json(
///     r#"{ "order_reference_id_mandatory": true, "order_reference_id_max_length": 10 }"#,
/// ).unwrap();
/// assert!(settings.order_reference_id_mandatory);
/// assert!(!settings.invoice_delivery_date_mandatory);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToEbInterfaceSettings {
    /// A missing UBL ProfileID is an error.
    pub profile_id_mandatory: bool,

    /// A delivery date or delivery period must be present.
    pub invoice_delivery_date_mandatory: bool,

    /// The customer's order reference ID must be present.
    pub order_reference_id_mandatory: bool,

    /// Maximum length of the order reference ID, if limited.
    pub order_reference_id_max_length: Option<usize>,

    /// The supplier ID assigned by the customer (UBL CustomerAssignedAccountID)
    /// must be present.
    pub invoice_recipients_biller_id_mandatory: bool,

    /// The supplier must have an email address.
    pub enforce_supplier_email_address: bool,

    /// Email address used when the supplier has none and enforcement is on.
    pub enforced_supplier_email_address: Option<String>,
}

impl ToEbInterfaceSettings {
    /// Load settings from JSON. Missing keys keep their default.
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Preset for invoices addressed to the Austrian federal government.
    pub fn federal_government() -> Self {
        Self {
            profile_id_mandatory: false,
            invoice_delivery_date_mandatory: true,
            order_reference_id_mandatory: true,
            order_reference_id_max_length: None,
            invoice_recipients_biller_id_mandatory: true,
            enforce_supplier_email_address: true,
            enforced_supplier_email_address: None,
        }
    }

    pub fn with_profile_id_mandatory(mut self, value: bool) -> Self {
        self.profile_id_mandatory = value;
        self
    }

    pub fn with_invoice_delivery_date_mandatory(mut self, value: bool) -> Self {
        self.invoice_delivery_date_mandatory = value;
        self
    }

    pub fn with_order_reference_id_mandatory(mut self, value: bool) -> Self {
        self.order_reference_id_mandatory = value;
        self
    }

    pub fn with_order_reference_id_max_length(mut self, max: usize) -> Self {
        self.order_reference_id_max_length = Some(max);
        self
    }

    pub fn with_invoice_recipients_biller_id_mandatory(mut self, value: bool) -> Self {
        self.invoice_recipients_biller_id_mandatory = value;
        self
    }

    /// Require a supplier email address, optionally substituting `fallback`.
    pub fn with_enforced_supplier_email(mut self, fallback: Option<String>) -> Self {
        self.enforce_supplier_email_address = true;
        self.enforced_supplier_email_address = fallback;
        self
    }
}
