//! Bilingual message catalogue for error-list entries.
//!
//! Every entry the converters record points at one [`Text`]. The key is
//! stable (`MISSING_INVOICE_NUMBER`, ...) and can be matched on; the
//! rendered message depends on the caller's [`Locale`]. Templates use
//! positional placeholders `{0}`, `{1}`, ...

use serde::{Deserialize, Serialize};

/// Display language for error messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    German,
    English,
}

macro_rules! texts {
    ($( $(#[$doc:meta])* $variant:ident => $key:literal, $de:literal, $en:literal; )+) => {
        /// Message keys used in error-list entries.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[non_exhaustive]
        pub enum Text {
            $( $(#[$doc])* $variant, )+
        }

        impl Text {
            /// Stable catalogue key.
            pub fn key(self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )+
                }
            }

            /// Raw template for `locale`.
            pub fn template(self, locale: Locale) -> &'static str {
                match (self, locale) {
                    $(
                        (Self::$variant, Locale::German) => $de,
                        (Self::$variant, Locale::English) => $en,
                    )+
                }
            }

            #[cfg(test)]
            pub(crate) const ALL: &'static [Text] = &[ $( Self::$variant, )+ ];
        }
    };
}

texts! {
    // Amounts
    AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
        "Der Betrag in '{0}' liegt außerhalb des darstellbaren Bereichs.",
        "The amount at '{0}' is out of range.";

    // Consistency
    InvalidUblVersionId => "INVALID_UBL_VERSION_ID",
        "Ungültige UBL-Version '{0}'. Unterstützt werden: {1}.",
        "Invalid UBL version '{0}'. Supported versions: {1}.";
    MissingProfileId => "MISSING_PROFILE_ID",
        "Die Profil-ID fehlt.",
        "The profile ID is missing.";
    UnknownProfileId => "UNKNOWN_PROFILE_ID",
        "Die Profil-ID '{0}' ist nicht bekannt.",
        "The profile ID '{0}' is not known.";
    MissingInvoiceTypeCode => "MISSING_INVOICE_TYPE_CODE",
        "Der Rechnungstyp-Code fehlt. Es wird eine Rechnung angenommen.",
        "The invoice type code is missing. Assuming a regular invoice.";
    InvalidInvoiceTypeCode => "INVALID_INVOICE_TYPE_CODE",
        "Ungültiger Rechnungstyp-Code '{0}'. Unterstützt werden: {1}.",
        "Invalid invoice type code '{0}'. Supported codes: {1}.";
    InvalidCreditNoteTypeCode => "INVALID_CREDIT_NOTE_TYPE_CODE",
        "Ungültiger Gutschriftstyp-Code '{0}'. Unterstützt werden: {1}.",
        "Invalid credit note type code '{0}'. Supported codes: {1}.";

    // Header
    MissingInvoiceNumber => "MISSING_INVOICE_NUMBER",
        "Die Rechnungsnummer fehlt.",
        "The invoice number is missing.";
    MissingInvoiceDate => "MISSING_INVOICE_DATE",
        "Das Rechnungsdatum fehlt.",
        "The invoice date is missing.";
    MissingCurrency => "MISSING_CURRENCY",
        "Die Rechnungswährung fehlt.",
        "The invoice currency is missing.";
    InvalidCurrency => "INVALID_CURRENCY",
        "Die Währung '{0}' ist kein gültiger ISO 4217 Code.",
        "The currency '{0}' is not a valid ISO 4217 code.";
    MissingTotalGrossAmount => "MISSING_TOTAL_GROSS_AMOUNT",
        "Der Gesamtbetrag inklusive Steuern fehlt.",
        "The total amount including taxes is missing.";

    // Parties
    MissingSupplierParty => "MISSING_SUPPLIER_PARTY",
        "Der Rechnungssteller fehlt.",
        "The supplier party is missing.";
    MissingCustomerParty => "MISSING_CUSTOMER_PARTY",
        "Der Rechnungsempfänger fehlt.",
        "The customer party is missing.";
    MissingPartyName => "MISSING_PARTY_NAME",
        "Der Name fehlt.",
        "The name is missing.";
    MissingAddress => "MISSING_ADDRESS",
        "Die Postadresse fehlt.",
        "The postal address is missing.";
    MissingAddressStreet => "MISSING_ADDRESS_STREET",
        "Die Straße fehlt.",
        "The street is missing.";
    MissingAddressTown => "MISSING_ADDRESS_TOWN",
        "Der Ort fehlt.",
        "The town is missing.";
    MissingAddressZip => "MISSING_ADDRESS_ZIP",
        "Die Postleitzahl fehlt.",
        "The ZIP code is missing.";
    MissingAddressCountry => "MISSING_ADDRESS_COUNTRY",
        "Das Land fehlt.",
        "The country is missing.";
    UnknownCountryCode => "UNKNOWN_COUNTRY_CODE",
        "Der Ländercode '{0}' ist unbekannt und wird nicht übernommen.",
        "The country code '{0}' is unknown and is not mapped.";
    MissingBillerVatId => "MISSING_BILLER_VAT_ID",
        "Die UID-Nummer des Rechnungsstellers fehlt. Es wird '{0}' verwendet.",
        "The supplier VAT ID is missing. Using '{0}' instead.";
    MissingRecipientVatId => "MISSING_RECIPIENT_VAT_ID",
        "Die UID-Nummer des Rechnungsempfängers fehlt. Es wird '{0}' verwendet.",
        "The customer VAT ID is missing. Using '{0}' instead.";
    MissingInvoiceRecipientsBillerId => "MISSING_INVOICE_RECIPIENTS_BILLER_ID",
        "Die Lieferantennummer beim Rechnungsempfänger fehlt.",
        "The supplier ID assigned by the customer is missing.";
    MissingSupplierEmail => "MISSING_SUPPLIER_EMAIL",
        "Die E-Mail-Adresse des Rechnungsstellers fehlt.",
        "The supplier email address is missing.";
    EnforcedSupplierEmail => "ENFORCED_SUPPLIER_EMAIL",
        "Die E-Mail-Adresse des Rechnungsstellers fehlt. Es wird '{0}' verwendet.",
        "The supplier email address is missing. Using '{0}' instead.";
    MissingOrderReferenceId => "MISSING_ORDER_REFERENCE_ID",
        "Die Auftragsreferenz fehlt.",
        "The order reference ID is missing.";
    OrderReferenceIdTooLong => "ORDER_REFERENCE_ID_TOO_LONG",
        "Die Auftragsreferenz '{0}' ist länger als {1} Zeichen.",
        "The order reference ID '{0}' is longer than {1} characters.";

    // Delivery
    MissingDeliveryDate => "MISSING_DELIVERY_DATE",
        "Das Lieferdatum bzw. der Leistungszeitraum fehlt.",
        "The delivery date or delivery period is missing.";
    IncompleteDeliveryPeriod => "INCOMPLETE_DELIVERY_PERIOD",
        "Der Leistungszeitraum hat kein Ende. Das Startdatum wird als Lieferdatum verwendet.",
        "The delivery period has no end date. Using the start date as delivery date.";
    MultipleDeliveries => "MULTIPLE_DELIVERIES",
        "Es sind {0} Lieferungen angegeben. Nur die erste wird übernommen.",
        "{0} deliveries are present. Only the first one is used.";

    // Tax
    MissingTaxSchemeId => "MISSING_TAX_SCHEME_ID",
        "Die Steuerart fehlt.",
        "The tax scheme ID is missing.";
    TaxSubtotalIncomplete => "TAX_SUBTOTAL_INCOMPLETE",
        "Von Steuerbasis, Steuerbetrag und Steuersatz müssen mindestens zwei Werte angegeben sein.",
        "At least two of taxable amount, tax amount and percentage must be present.";
    MissingVatSubtotal => "MISSING_VAT_SUBTOTAL",
        "Es ist keine Umsatzsteuer-Aufschlüsselung vorhanden.",
        "No VAT tax subtotal is present.";
    DefaultTaxExemptionReason => "DEFAULT_TAX_EXEMPTION_REASON",
        "Steuerbefreit (Kategorie {0})",
        "Exempt from tax (category {0})";

    // Lines
    MissingInvoiceLines => "MISSING_INVOICE_LINES",
        "Die Rechnung enthält keine Positionen.",
        "The invoice contains no lines.";
    InvalidPositionNumber => "INVALID_POSITION_NUMBER",
        "Die Positionsnummer '{0}' ist keine positive Zahl. Es wird {1} verwendet.",
        "The line ID '{0}' is not a positive number. Using {1} instead.";
    MissingQuantity => "MISSING_QUANTITY",
        "Die Menge fehlt. Es wird 1 verwendet.",
        "The quantity is missing. Using 1 instead.";
    MissingQuantityUnit => "MISSING_QUANTITY_UNIT",
        "Die Mengeneinheit fehlt. Es wird '{0}' verwendet.",
        "The quantity unit code is missing. Using '{0}' instead.";
    MissingUnitPrice => "MISSING_UNIT_PRICE",
        "Der Einzelpreis fehlt und kann nicht berechnet werden.",
        "The unit price is missing and cannot be derived.";
    ZeroQuantityUnitPrice => "ZERO_QUANTITY_UNIT_PRICE",
        "Der Einzelpreis kann bei Menge 0 und Positionsbetrag {0} nicht berechnet werden.",
        "The unit price is missing and cannot be derived from quantity 0 and line amount {0}.";
    MissingLineVatRate => "MISSING_LINE_VAT_RATE",
        "Der Steuersatz der Position fehlt und kann nicht ermittelt werden.",
        "The line tax rate is missing and cannot be determined.";
    MissingAllowanceChargeAmount => "MISSING_ALLOWANCE_CHARGE_AMOUNT",
        "Der Betrag des Zu-/Abschlags fehlt.",
        "The allowance/charge amount is missing.";

    // Payment
    UnsupportedPaymentMeansCode => "UNSUPPORTED_PAYMENT_MEANS_CODE",
        "Der Zahlungsart-Code '{0}' wird nicht unterstützt und ignoriert.",
        "The payment means code '{0}' is not supported and is ignored.";
    MissingIban => "MISSING_IBAN",
        "Für die Überweisung fehlt die IBAN.",
        "The IBAN for the bank transfer is missing.";
    IbanTooLong => "IBAN_TOO_LONG",
        "Die IBAN '{0}' ist länger als {1} Zeichen und wird gekürzt.",
        "The IBAN '{0}' is longer than {1} characters and is truncated.";
    InvalidBic => "INVALID_BIC",
        "Der BIC '{0}' ist ungültig.",
        "The BIC '{0}' is invalid.";
    PaymentReferenceTooLong => "PAYMENT_REFERENCE_TOO_LONG",
        "Die Zahlungsreferenz '{0}' ist länger als {1} Zeichen und wird gekürzt.",
        "The payment reference '{0}' is longer than {1} characters and is truncated.";
    MultipleDueDates => "MULTIPLE_DUE_DATES",
        "Es sind unterschiedliche Fälligkeitsdaten angegeben. Es wird {0} verwendet.",
        "Different due dates are present. Using {0}.";
    PenaltyNotSupported => "PENALTY_NOT_SUPPORTED",
        "Verzugszuschläge können in ebInterface nicht abgebildet werden.",
        "Penalty surcharges cannot be expressed in ebInterface.";
    DiscountWithoutDueDate => "DISCOUNT_WITHOUT_DUE_DATE",
        "Skonto ist nur mit einem Fälligkeitsdatum möglich.",
        "Discounts require a payment due date.";

    // Reverse direction
    MissingTaxCategoryCode => "MISSING_TAX_CATEGORY_CODE",
        "Die Steuerkategorie fehlt. Es wird '{0}' verwendet.",
        "The tax category code is missing. Using '{0}' instead.";
}

impl Text {
    /// Render the template for `locale`, substituting `{0}`, `{1}`, ... with `args`.
    ///
    /// Arguments are inserted verbatim; placeholders inside an argument stay as they are.
    /// A placeholder without a matching argument is kept.
    pub fn format(self, locale: Locale, args: &[&str]) -> String {
        let template = self.template(locale);
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open + 1..];
            let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
            let arg = (digits > 0 && tail[digits..].starts_with('}'))
                .then(|| tail[..digits].parse::<usize>().ok())
                .flatten()
                .and_then(|i| args.get(i));
            match arg {
                Some(arg) => {
                    out.push_str(arg);
                    rest = &tail[digits + 1..];
                }
                None => {
                    out.push('{');
                    rest = tail;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
