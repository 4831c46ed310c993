//! UBL 2.1 Invoice/CreditNote → ebInterface conversion.
//!
//! The converter runs every rule even after the first ERROR so the caller
//! sees all problems at once. The document is only returned when the
//! error list holds no ERROR entry.

mod consistency;
mod delivery;
mod lines;
mod party;
mod payment;
mod tax;

pub use tax::TaxCategoryKey;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{ConversionError, ErrorList, Locale, Text, ToEbInterfaceSettings};
use crate::ebinterface::{self, DocumentType, EbVersion, ReductionKind, ReductionOrSurcharge};
use crate::ubl::{Document, DocumentKind};

/// Placeholder used when a party has no VAT identification number.
pub const UNKNOWN_VAT_ID: &str = "00000000";

/// Software name written to `GeneratingSystem`.
pub const GENERATING_SYSTEM: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Converts UBL documents to one ebInterface version.
///
/// ```
/// use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
/// use ubl_ebinterface::ebinterface::EbVersion;
/// use ubl_ebinterface::to_ebinterface::ToEbInterfaceConverter;
/// use ubl_ebinterface::ubl::Document;
///
/// let converter = ToEbInterfaceConverter::new(
///     EbVersion::V4_3,
///     Locale::English,
///     ToEbInterfaceSettings::default(),
/// );
/// let mut errors = ErrorList::new();
/// let result = converter.convert(&Document::default(), &mut errors).unwrap();
/// assert!(result.is_none());
/// assert!(errors.contains_errors());
/// ```
#[derive(Debug, Clone)]
pub struct ToEbInterfaceConverter {
    version: EbVersion,
    locale: Locale,
    settings: ToEbInterfaceSettings,
}

impl ToEbInterfaceConverter {
    pub fn new(version: EbVersion, locale: Locale, settings: ToEbInterfaceSettings) -> Self {
        Self {
            version,
            locale,
            settings,
        }
    }

    pub fn version(&self) -> EbVersion {
        self.version
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn settings(&self) -> &ToEbInterfaceSettings {
        &self.settings
    }

    /// Convert an Invoice or a CreditNote, depending on `doc.kind`.
    pub fn convert(
        &self,
        doc: &Document,
        errors: &mut ErrorList,
    ) -> Result<Option<ebinterface::Invoice>, ConversionError> {
        match doc.kind {
            DocumentKind::Invoice => self.convert_invoice(doc, errors),
            DocumentKind::CreditNote => self.convert_credit_note(doc, errors),
        }
    }

    /// Convert a UBL Invoice.
    ///
    /// `errors` must be empty. Returns `Ok(None)` if an ERROR was recorded.
    pub fn convert_invoice(
        &self,
        doc: &Document,
        errors: &mut ErrorList,
    ) -> Result<Option<ebinterface::Invoice>, ConversionError> {
        if doc.kind != DocumentKind::Invoice {
            return Err(ConversionError::Precondition(
                "convert_invoice expects a UBL Invoice".into(),
            ));
        }
        self.run(doc, errors)
    }

    /// Convert a UBL CreditNote into an ebInterface `CreditMemo`.
    pub fn convert_credit_note(
        &self,
        doc: &Document,
        errors: &mut ErrorList,
    ) -> Result<Option<ebinterface::Invoice>, ConversionError> {
        if doc.kind != DocumentKind::CreditNote {
            return Err(ConversionError::Precondition(
                "convert_credit_note expects a UBL CreditNote".into(),
            ));
        }
        self.run(doc, errors)
    }

    fn run(
        &self,
        doc: &Document,
        errors: &mut ErrorList,
    ) -> Result<Option<ebinterface::Invoice>, ConversionError> {
        if !errors.is_empty() {
            return Err(ConversionError::Precondition(
                "the error list must be empty".into(),
            ));
        }
        debug!(
            id = ?doc.id,
            kind = ?doc.kind,
            version = %self.version,
            "converting to ebInterface"
        );

        let mut ctx = Context {
            version: self.version,
            locale: self.locale,
            settings: &self.settings,
            errors,
        };

        consistency::check(doc, &mut ctx);

        let number = header_number(doc, &mut ctx);
        let date = header_date(doc, &mut ctx);
        let currency = header_currency(doc, &mut ctx);
        let document_type = document_type(doc);

        let biller = party::convert_biller(doc, &mut ctx);
        let invoice_recipient = party::convert_invoice_recipient(doc, &mut ctx);
        let ordering_party = party::convert_ordering_party(doc, &mut ctx);
        let delivery = delivery::convert_delivery(doc, &mut ctx);

        let tax_summary = tax::convert_tax(doc, &mut ctx);
        let details = lines::convert_lines(doc, &tax_summary, &mut ctx);
        let reductions_and_surcharges = document_allowances(doc, &mut ctx);
        let totals = totals(doc, &mut ctx);

        let payment_method = payment::convert_payment_method(doc, &mut ctx);
        let payment_conditions = payment::convert_payment_conditions(doc, &mut ctx);

        let comment = non_empty_join(&doc.notes);

        if ctx.errors.contains_errors() {
            debug!(
                id = ?doc.id,
                errors = ctx.errors.error_count(),
                warnings = ctx.errors.warning_count(),
                "conversion failed"
            );
            return Ok(None);
        }

        let (
            Some(invoice_number),
            Some(invoice_date),
            Some(currency),
            Some(biller),
            Some(invoice_recipient),
            Some(totals),
        ) = (number, date, currency, biller, invoice_recipient, totals)
        else {
            return Ok(None);
        };

        let invoice = ebinterface::Invoice {
            version: self.version,
            generating_system: GENERATING_SYSTEM.to_string(),
            document_type,
            currency,
            invoice_number,
            invoice_date,
            delivery,
            biller,
            invoice_recipient,
            ordering_party,
            details,
            reductions_and_surcharges,
            tax: tax_summary.tax,
            total_gross_amount: totals.gross,
            net_amount: totals.net,
            prepaid_amount: totals.prepaid,
            payable_amount: totals.payable,
            payment_method: Some(payment_method),
            payment_conditions,
            comment,
        };
        debug!(
            number = %invoice.invoice_number,
            lines = invoice.details.len(),
            warnings = ctx.errors.warning_count(),
            "conversion succeeded"
        );
        Ok(Some(invoice))
    }
}

/// Per-call conversion state shared by the rule modules.
pub(crate) struct Context<'a> {
    pub version: EbVersion,
    pub locale: Locale,
    pub settings: &'a ToEbInterfaceSettings,
    pub errors: &'a mut ErrorList,
}

impl Context<'_> {
    pub fn warn(&mut self, field: impl Into<String>, text: Text, args: &[&str]) {
        self.errors.warn(field, text, self.locale, args);
    }

    pub fn error(&mut self, field: impl Into<String>, text: Text, args: &[&str]) {
        self.errors.error(field, text, self.locale, args);
    }

    /// Record an ERROR for an amount at `field` that left the `Decimal` range.
    pub fn out_of_range(&mut self, field: impl Into<String>) {
        let field = field.into();
        self.errors.error(field.clone(), Text::AmountOutOfRange, self.locale, &[field.as_str()]);
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Non-blank entries joined by newline.
pub(crate) fn non_empty_join(values: &[String]) -> Option<String> {
    let parts: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

fn header_number(doc: &Document, ctx: &mut Context<'_>) -> Option<String> {
    let number = trimmed(doc.id.as_deref()).map(str::to_string);
    if number.is_none() {
        ctx.error("ID", Text::MissingInvoiceNumber, &[]);
    }
    number
}

fn header_date(doc: &Document, ctx: &mut Context<'_>) -> Option<NaiveDate> {
    if doc.issue_date.is_none() {
        ctx.error("IssueDate", Text::MissingInvoiceDate, &[]);
    }
    doc.issue_date
}

fn header_currency(doc: &Document, ctx: &mut Context<'_>) -> Option<String> {
    match trimmed(doc.document_currency_code.as_deref()) {
        None => {
            ctx.error("DocumentCurrencyCode", Text::MissingCurrency, &[]);
            None
        }
        Some(code) if !crate::core::codes::is_iso_currency(code) => {
            ctx.error("DocumentCurrencyCode", Text::InvalidCurrency, &[code]);
            None
        }
        Some(code) => Some(code.to_string()),
    }
}

fn document_type(doc: &Document) -> DocumentType {
    if doc.kind == DocumentKind::CreditNote {
        return DocumentType::CreditMemo;
    }
    match trimmed(doc.type_code.as_deref()) {
        Some("386") => DocumentType::InvoiceForAdvancePayment,
        Some("326") => DocumentType::InvoiceForPartialDelivery,
        Some("389") => DocumentType::SelfBilling,
        _ => DocumentType::Invoice,
    }
}

fn document_allowances(doc: &Document, ctx: &mut Context<'_>) -> Vec<ReductionOrSurcharge> {
    let mut out = Vec::new();
    for (i, ac) in doc.allowance_charges.iter().enumerate() {
        let field = format!("AllowanceCharge[{}]", i + 1);
        let Some(amount) = ac.amount else {
            ctx.error(format!("{field}/Amount"), Text::MissingAllowanceChargeAmount, &[]);
            continue;
        };
        let base_amount = ac
            .base_amount
            .or(doc.monetary_total.line_extension_amount)
            .unwrap_or(amount);
        let mut comment_parts = ac.reasons.clone();
        if comment_parts.is_empty() {
            comment_parts.extend(ac.reason_code.clone());
        }
        out.push(ReductionOrSurcharge {
            kind: if ac.charge_indicator {
                ReductionKind::Surcharge
            } else {
                ReductionKind::Reduction
            },
            base_amount,
            percentage: ac.multiplier_factor,
            amount: Some(amount),
            comment: non_empty_join(&comment_parts),
            vat_rate: ac.tax_categories.iter().find_map(|c| c.percent),
        });
    }
    out
}

struct Totals {
    gross: Decimal,
    prepaid: Option<Decimal>,
    payable: Option<Decimal>,
    net: Option<Decimal>,
}

fn totals(doc: &Document, ctx: &mut Context<'_>) -> Option<Totals> {
    let mt = &doc.monetary_total;
    let prepaid = mt.prepaid_amount.unwrap_or(Decimal::ZERO);
    let gross = match (mt.tax_inclusive_amount, mt.payable_amount) {
        (Some(gross), _) => gross,
        (None, Some(payable)) => {
            let Some(gross) = payable.checked_add(prepaid) else {
                ctx.out_of_range("LegalMonetaryTotal/TaxInclusiveAmount");
                return None;
            };
            gross
        }
        (None, None) => {
            ctx.error(
                "LegalMonetaryTotal/TaxInclusiveAmount",
                Text::MissingTotalGrossAmount,
                &[],
            );
            return None;
        }
    };
    let v = ctx.version;
    let payable = match (v.supports_payable_amount(), mt.payable_amount) {
        (false, _) => None,
        (true, Some(payable)) => Some(payable),
        (true, None) => {
            let Some(payable) = gross.checked_sub(prepaid) else {
                ctx.out_of_range("LegalMonetaryTotal/PayableAmount");
                return None;
            };
            Some(payable)
        }
    };
    Some(Totals {
        gross,
        prepaid: mt.prepaid_amount.filter(|_| v.supports_prepaid_amount()),
        payable,
        net: mt.tax_exclusive_amount.filter(|_| v.supports_net_amount()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ubl::{AllowanceCharge, MonetaryTotal};
    use rust_decimal_macros::dec;

    fn ctx_parts() -> (ToEbInterfaceSettings, ErrorList) {
        (ToEbInterfaceSettings::default(), ErrorList::new())
    }

    #[test]
    fn document_type_mapping() {
        let mut doc = Document::default();
        for (code, expected) in [
            ("380", DocumentType::Invoice),
            ("384", DocumentType::Invoice),
            ("386", DocumentType::InvoiceForAdvancePayment),
            ("326", DocumentType::InvoiceForPartialDelivery),
            ("389", DocumentType::SelfBilling),
        ] {
            doc.type_code = Some(code.into());
            assert_eq!(document_type(&doc), expected, "{code}");
        }
        doc.kind = DocumentKind::CreditNote;
        assert_eq!(document_type(&doc), DocumentType::CreditMemo);
    }

    #[test]
    fn gross_falls_back_to_payable_plus_prepaid() {
        let (settings, mut errors) = ctx_parts();
        let mut ctx = Context {
            version: EbVersion::V4_3,
            locale: Locale::English,
            settings: &settings,
            errors: &mut errors,
        };
        let doc = Document {
            monetary_total: MonetaryTotal {
                payable_amount: Some(dec!(80)),
                prepaid_amount: Some(dec!(40)),
                ..Default::default()
            },
            ..Default::default()
        };
        let t = totals(&doc, &mut ctx).unwrap();
        assert_eq!(t.gross, dec!(120));
        assert_eq!(t.payable, Some(dec!(80)));
        assert_eq!(t.prepaid, Some(dec!(40)));
        assert_eq!(t.net, None);
    }

    #[test]
    fn totals_respect_version() {
        let (settings, mut errors) = ctx_parts();
        let mut ctx = Context {
            version: EbVersion::V4_0,
            locale: Locale::English,
            settings: &settings,
            errors: &mut errors,
        };
        let doc = Document {
            monetary_total: MonetaryTotal {
                tax_inclusive_amount: Some(dec!(120)),
                prepaid_amount: Some(dec!(20)),
                ..Default::default()
            },
            ..Default::default()
        };
        let t = totals(&doc, &mut ctx).unwrap();
        assert_eq!(t.payable, None);
        assert_eq!(t.prepaid, None);
    }

    #[test]
    fn totals_out_of_range_is_error() {
        let (settings, mut errors) = ctx_parts();
        let mut ctx = Context {
            version: EbVersion::V6_0,
            locale: Locale::English,
            settings: &settings,
            errors: &mut errors,
        };
        let doc = Document {
            monetary_total: MonetaryTotal {
                payable_amount: Some(Decimal::MAX),
                prepaid_amount: Some(dec!(1)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(totals(&doc, &mut ctx).is_none());

        let doc = Document {
            monetary_total: MonetaryTotal {
                tax_inclusive_amount: Some(Decimal::MIN),
                prepaid_amount: Some(dec!(1)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(totals(&doc, &mut ctx).is_none());
        assert_eq!(errors.error_count(), 2);
        assert!(errors.iter().all(|e| e.text == Text::AmountOutOfRange));
    }

    #[test]
    fn missing_gross_is_error() {
        let (settings, mut errors) = ctx_parts();
        let mut ctx = Context {
            version: EbVersion::V6_0,
            locale: Locale::German,
            settings: &settings,
            errors: &mut errors,
        };
        assert!(totals(&Document::default(), &mut ctx).is_none());
        assert!(errors.contains_text(Text::MissingTotalGrossAmount));
    }

    #[test]
    fn document_allowance_uses_reason_as_comment() {
        let (settings, mut errors) = ctx_parts();
        let mut ctx = Context {
            version: EbVersion::V6_0,
            locale: Locale::English,
            settings: &settings,
            errors: &mut errors,
        };
        let doc = Document {
            allowance_charges: vec![
                AllowanceCharge {
                    charge_indicator: false,
                    reasons: vec!["Rabatt".into()],
                    amount: Some(dec!(10)),
                    base_amount: Some(dec!(100)),
                    multiplier_factor: Some(dec!(10)),
                    ..Default::default()
                },
                AllowanceCharge {
                    charge_indicator: true,
                    reason_code: Some("FC".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let out = document_allowances(&doc, &mut ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ReductionKind::Reduction);
        assert_eq!(out[0].comment.as_deref(), Some("Rabatt"));
        assert_eq!(out[0].percentage, Some(dec!(10)));
        assert!(errors.contains_text(Text::MissingAllowanceChargeAmount));
    }

    #[test]
    fn non_empty_join_skips_blank() {
        let v = vec!["a".to_string(), "  ".to_string(), " b ".to_string()];
        assert_eq!(non_empty_join(&v).as_deref(), Some("a\nb"));
        assert_eq!(non_empty_join(&[]), None);
    }

    #[test]
    fn rejects_non_empty_error_list() {
        let conv = ToEbInterfaceConverter::new(
            EbVersion::V6_0,
            Locale::English,
            ToEbInterfaceSettings::default(),
        );
        let mut errors = ErrorList::new();
        errors.warn("x", Text::MissingQuantity, Locale::English, &[]);
        let err = conv.convert(&Document::default(), &mut errors).unwrap_err();
        assert!(matches!(err, ConversionError::Precondition(_)));
    }

    #[test]
    fn rejects_wrong_document_kind() {
        let conv = ToEbInterfaceConverter::new(
            EbVersion::V6_0,
            Locale::English,
            ToEbInterfaceSettings::default(),
        );
        let doc = Document {
            kind: DocumentKind::CreditNote,
            ..Default::default()
        };
        let err = conv.convert_invoice(&doc, &mut ErrorList::new()).unwrap_err();
        assert!(matches!(err, ConversionError::Precondition(_)));
    }
}
