//! ebInterface → UBL 2.1 Invoice/CreditNote conversion.
//!
//! The reverse direction is lossless for everything ebInterface can
//! express in UBL. Gaps are filled with defaults and reported as WARN.

use rust_decimal::Decimal;
use tracing::debug;

use crate::core::rounding::checked_sum;
use crate::core::{ConversionError, ErrorList, Locale, Text};
use crate::ebinterface::{
    self, AddressIdentifierType, ArticleNumberType, DeliveryTime, DocumentType, PaymentKind,
    ReductionKind, ReductionOrSurcharge, TaxRate,
};
use crate::to_ebinterface::UNKNOWN_VAT_ID;
use crate::ubl::{self, Document, DocumentKind, SchemedId};

/// EAS scheme of a GLN endpoint.
pub const SCHEME_GLN: &str = "0088";
/// EAS scheme of a DUNS endpoint.
pub const SCHEME_DUNS: &str = "0060";
pub const UBL_VERSION: &str = "2.1";

const VAT: &str = "VAT";

/// Converts ebInterface invoices to UBL documents.
///
/// A `CreditMemo` becomes a UBL CreditNote, every other document type a
/// UBL Invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToUblConverter {
    locale: Locale,
}

impl ToUblConverter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Convert `invoice`. `errors` must be empty.
    ///
    /// Returns `Ok(None)` if an ERROR was recorded. The only ERROR the
    /// reverse rules record is an amount sum leaving the `Decimal` range.
    pub fn convert(
        &self,
        invoice: &ebinterface::Invoice,
        errors: &mut ErrorList,
    ) -> Result<Option<Document>, ConversionError> {
        if !errors.is_empty() {
            return Err(ConversionError::Precondition(
                "the error list must be empty".into(),
            ));
        }
        debug!(
            number = %invoice.invoice_number,
            version = %invoice.version,
            "converting to UBL"
        );

        let mut out = Out {
            locale: self.locale,
            errors,
        };
        let doc = out.document(invoice);

        if out.errors.contains_errors() {
            return Ok(None);
        }
        debug!(
            number = %invoice.invoice_number,
            kind = ?doc.kind,
            lines = doc.lines.len(),
            "UBL conversion succeeded"
        );
        Ok(Some(doc))
    }
}

/// UNCL 1001 type code for an ebInterface document type.
pub fn type_code(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::CreditMemo => "381",
        DocumentType::InvoiceForAdvancePayment => "386",
        DocumentType::InvoiceForPartialDelivery => "326",
        DocumentType::SelfBilling => "389",
        _ => "380",
    }
}

struct Out<'a> {
    locale: Locale,
    errors: &'a mut ErrorList,
}

impl Out<'_> {
    fn document(&mut self, inv: &ebinterface::Invoice) -> Document {
        let kind = if inv.document_type == DocumentType::CreditMemo {
            DocumentKind::CreditNote
        } else {
            DocumentKind::Invoice
        };
        let lines = inv
            .details
            .iter()
            .enumerate()
            .map(|(i, item)| self.line(item, i))
            .collect();
        let tax_totals = self.tax_total(&inv.tax);

        Document {
            kind,
            ubl_version_id: Some(UBL_VERSION.into()),
            id: Some(inv.invoice_number.clone()),
            issue_date: Some(inv.invoice_date),
            due_date: inv.payment_conditions.as_ref().and_then(|c| c.due_date),
            type_code: Some(type_code(inv.document_type).into()),
            notes: inv.comment.iter().cloned().collect(),
            document_currency_code: Some(inv.currency.clone()),
            invoice_period: inv.delivery.as_ref().and_then(|d| match d.when {
                DeliveryTime::Period { from, to } => Some(ubl::Period {
                    start_date: Some(from),
                    end_date: Some(to),
                }),
                DeliveryTime::Date(_) => None,
            }),
            order_reference: inv.invoice_recipient.order_reference.as_ref().map(|o| {
                ubl::OrderReference {
                    id: Some(o.order_id.clone()),
                    issue_date: o.reference_date,
                }
            }),
            supplier: Some(ubl::AccountingParty {
                assigned_account_id: inv.biller.invoice_recipients_biller_id.clone(),
                party: Some(party(&inv.biller.address, &inv.biller.vat_id)),
            }),
            customer: Some(ubl::AccountingParty {
                assigned_account_id: inv.invoice_recipient.billers_invoice_recipient_id.clone(),
                party: Some(party(
                    &inv.invoice_recipient.address,
                    &inv.invoice_recipient.vat_id,
                )),
            }),
            buyer_customer: inv
                .ordering_party
                .as_ref()
                .map(|o| party(&o.address, &o.vat_id)),
            deliveries: inv.delivery.iter().filter_map(delivery).collect(),
            payment_means: payment_means(inv),
            payment_terms: payment_terms(inv),
            allowance_charges: inv
                .reductions_and_surcharges
                .iter()
                .map(allowance_charge)
                .collect(),
            tax_totals,
            monetary_total: self.monetary_total(inv),
            lines,
            ..Default::default()
        }
    }

    fn line(&mut self, item: &ebinterface::ListLineItem, index: usize) -> ubl::Line {
        let field = format!("Details/ItemList/ListLineItem[{}]", index + 1);
        let article = |kind: ArticleNumberType| {
            item.article_numbers
                .iter()
                .find(|a| a.kind == kind)
                .map(|a| a.value.clone())
        };
        ubl::Line {
            id: Some(item.position_number.to_string()),
            quantity: Some(ubl::Quantity {
                value: Some(item.quantity.value),
                unit_code: Some(item.quantity.unit.clone()),
            }),
            line_extension_amount: Some(item.line_item_amount),
            order_line_id: item.order_reference.as_ref().and_then(|r| r.position.clone()),
            deliveries: item.delivery.iter().filter_map(delivery).collect(),
            allowance_charges: item
                .reductions_and_surcharges
                .iter()
                .map(allowance_charge)
                .collect(),
            item: ubl::Item {
                name: item.descriptions.first().cloned(),
                descriptions: if item.descriptions.len() > 1 {
                    item.descriptions.clone()
                } else {
                    Vec::new()
                },
                sellers_item_id: article(ArticleNumberType::BillersArticleNumber),
                buyers_item_id: article(ArticleNumberType::InvoiceRecipientsArticleNumber),
                standard_item_id: article(ArticleNumberType::Gtin)
                    .map(|v| SchemedId::with_scheme("0160", v)),
                classified_tax_categories: vec![self.tax_category(&item.tax, &field)],
            },
            price: Some(ubl::Price {
                amount: Some(item.unit_price),
                base_quantity: None,
            }),
            ..Default::default()
        }
    }

    fn tax_category(&mut self, rate: &TaxRate, field: &str) -> ubl::TaxCategory {
        let code = match rate.category_code.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                let fallback = default_category(rate.percent);
                self.errors.warn(
                    format!("{field}/TaxCategoryCode"),
                    Text::MissingTaxCategoryCode,
                    self.locale,
                    &[fallback],
                );
                fallback.to_string()
            }
        };
        ubl::TaxCategory {
            id: Some(SchemedId::new(code)),
            percent: Some(rate.percent),
            exemption_reason_code: rate.exemption.as_ref().and_then(|e| e.code.clone()),
            exemption_reasons: rate.exemption.iter().map(|e| e.reason.clone()).collect(),
            tax_scheme_id: Some(SchemedId::new(VAT)),
        }
    }

    fn tax_total(&mut self, tax: &ebinterface::Tax) -> Vec<ubl::TaxTotal> {
        let mut subtotals: Vec<ubl::TaxSubtotal> = Vec::new();
        for (i, item) in tax.items.iter().enumerate() {
            let field = format!("Tax/TaxItem[{}]", i + 1);
            subtotals.push(ubl::TaxSubtotal {
                taxable_amount: Some(item.taxable_amount),
                tax_amount: Some(item.tax_amount),
                percent: None,
                category: self.tax_category(&item.rate, &field),
            });
        }
        // ebInterface carries no base for other taxes
        for other in &tax.other_taxes {
            subtotals.push(ubl::TaxSubtotal {
                taxable_amount: Some(Decimal::ZERO),
                tax_amount: Some(other.amount),
                percent: None,
                category: ubl::TaxCategory {
                    id: Some(SchemedId::new("S")),
                    tax_scheme_id: Some(SchemedId::new(other.comment.clone())),
                    ..Default::default()
                },
            });
        }
        if subtotals.is_empty() {
            return Vec::new();
        }
        let total = self.sum(subtotals.iter().filter_map(|s| s.tax_amount), "Tax");
        vec![ubl::TaxTotal {
            tax_amount: total,
            subtotals,
        }]
    }

    fn monetary_total(&mut self, inv: &ebinterface::Invoice) -> ubl::MonetaryTotal {
        let line_total = self.sum(inv.details.iter().map(|l| l.line_item_amount), "Details");
        let tax_amounts = inv.tax.items.iter().map(|t| t.tax_amount);
        let other_amounts = inv.tax.other_taxes.iter().map(|t| t.amount);
        let tax_total = self.sum(tax_amounts.chain(other_amounts), "Tax");
        let net = match (inv.net_amount, tax_total) {
            (Some(net), _) => Some(net),
            (None, Some(tax)) => {
                self.in_range(inv.total_gross_amount.checked_sub(tax), "NetAmount")
            }
            (None, None) => None,
        };
        let prepaid = inv.prepaid_amount;
        let payable = match inv.payable_amount {
            Some(payable) => Some(payable),
            None => {
                let remaining = inv
                    .total_gross_amount
                    .checked_sub(prepaid.unwrap_or(Decimal::ZERO));
                self.in_range(remaining, "PayableAmount")
            }
        };
        ubl::MonetaryTotal {
            line_extension_amount: line_total,
            tax_exclusive_amount: net,
            tax_inclusive_amount: Some(inv.total_gross_amount),
            allowance_total_amount: self.reduction_total(inv, ReductionKind::Reduction),
            charge_total_amount: self.reduction_total(inv, ReductionKind::Surcharge),
            prepaid_amount: prepaid,
            payable_rounding_amount: None,
            payable_amount: payable,
        }
    }

    /// Sum of the document-level entries of `kind`, `None` without any.
    fn reduction_total(
        &mut self,
        inv: &ebinterface::Invoice,
        kind: ReductionKind,
    ) -> Option<Decimal> {
        let amounts: Vec<Decimal> = inv
            .reductions_and_surcharges
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.amount)
            .collect();
        if amounts.is_empty() {
            return None;
        }
        self.sum(amounts, "ReductionAndSurchargeDetails")
    }

    fn sum(&mut self, values: impl IntoIterator<Item = Decimal>, field: &str) -> Option<Decimal> {
        self.in_range(checked_sum(values), field)
    }

    /// Records an ERROR at `field` when `value` left the `Decimal` range.
    fn in_range(&mut self, value: Option<Decimal>, field: &str) -> Option<Decimal> {
        if value.is_none() {
            self.errors.error(field, Text::AmountOutOfRange, self.locale, &[field]);
        }
        value
    }
}

/// A negative amount is the folded opposite direction.
fn allowance_charge(r: &ReductionOrSurcharge) -> ubl::AllowanceCharge {
    let mut charge = r.kind == ReductionKind::Surcharge;
    let mut amount = r.amount;
    if let Some(a) = amount.filter(|a| a.is_sign_negative()) {
        charge = !charge;
        amount = Some(-a);
    }
    ubl::AllowanceCharge {
        charge_indicator: charge,
        reason_code: None,
        reasons: r.comment.iter().cloned().collect(),
        multiplier_factor: r.percentage,
        amount,
        base_amount: Some(r.base_amount),
        tax_categories: r
            .vat_rate
            .map(|p| {
                vec![ubl::TaxCategory {
                    id: Some(SchemedId::new(default_category(p))),
                    percent: Some(p),
                    tax_scheme_id: Some(SchemedId::new(VAT)),
                    ..Default::default()
                }]
            })
            .unwrap_or_default(),
    }
}

fn default_category(percent: Decimal) -> &'static str {
    if percent.is_zero() { "Z" } else { "S" }
}

fn party(address: &ebinterface::Address, vat_id: &str) -> ubl::Party {
    let endpoint_id = address.identifiers.first().map(|id| {
        let scheme = match id.kind {
            AddressIdentifierType::Gln => SCHEME_GLN,
            AddressIdentifierType::Duns => SCHEME_DUNS,
        };
        SchemedId::with_scheme(scheme, id.value.clone())
    });
    let vat_id = vat_id.trim();
    let tax_schemes = if vat_id.is_empty() || vat_id == UNKNOWN_VAT_ID {
        Vec::new()
    } else {
        vec![ubl::PartyTaxScheme {
            company_id: Some(vat_id.to_string()),
            tax_scheme_id: Some(SchemedId::new(VAT)),
        }]
    };
    let contact = (address.contact.is_some() || address.phone.is_some() || address.email.is_some())
        .then(|| ubl::Contact {
            name: address.contact.clone(),
            telephone: address.phone.clone(),
            email: address.email.clone(),
        });
    ubl::Party {
        endpoint_id,
        identifications: Vec::new(),
        names: vec![address.name.clone()],
        postal_address: Some(postal_address(address)),
        tax_schemes,
        legal_entities: vec![ubl::PartyLegalEntity {
            registration_name: Some(address.name.clone()),
            company_id: None,
        }],
        contact,
        person: None,
    }
}

fn postal_address(address: &ebinterface::Address) -> ubl::Address {
    ubl::Address {
        street_name: address.street.clone(),
        city_name: Some(address.town.clone()),
        postal_zone: Some(address.zip.clone()),
        country: address.country.as_ref().map(|c| ubl::Country {
            code: c.code.clone(),
            name: (!c.name.is_empty()).then(|| c.name.clone()),
        }),
        ..Default::default()
    }
}

/// Only a single delivery date is a UBL Delivery; a period goes to InvoicePeriod.
fn delivery(d: &ebinterface::Delivery) -> Option<ubl::Delivery> {
    let date = match d.when {
        DeliveryTime::Date(date) => Some(date),
        DeliveryTime::Period { .. } => None,
    };
    if date.is_none() && d.address.is_none() {
        return None;
    }
    Some(ubl::Delivery {
        actual_delivery_date: date,
        address: d.address.as_ref().map(postal_address),
        party: d.address.as_ref().map(|a| ubl::Party {
            names: vec![a.name.clone()],
            ..Default::default()
        }),
    })
}

fn payment_means(inv: &ebinterface::Invoice) -> Vec<ubl::PaymentMeans> {
    let Some(method) = &inv.payment_method else {
        return Vec::new();
    };
    let notes: Vec<String> = method.comment.iter().cloned().collect();
    let due_date = inv.payment_conditions.as_ref().and_then(|c| c.due_date);
    let base = |code: &str| ubl::PaymentMeans {
        code: Some(code.into()),
        due_date,
        instruction_notes: notes.clone(),
        ..Default::default()
    };
    match &method.kind {
        PaymentKind::DirectDebit => vec![base("59")],
        PaymentKind::NoPayment => vec![base("ZZZ")],
        PaymentKind::UniversalBankTransaction(t) => {
            let payment_ids: Vec<String> = t.payment_reference.iter().cloned().collect();
            if t.accounts.is_empty() {
                return vec![ubl::PaymentMeans {
                    payment_ids,
                    ..base("58")
                }];
            }
            t.accounts
                .iter()
                .map(|a| ubl::PaymentMeans {
                    payment_ids: payment_ids.clone(),
                    payee_account: Some(ubl::FinancialAccount {
                        id: a.iban.clone().map(SchemedId::new),
                        name: a.owner.clone(),
                        branch_id: a.bic.clone(),
                        institution_id: None,
                    }),
                    ..base("58")
                })
                .collect()
        }
    }
}

fn payment_terms(inv: &ebinterface::Invoice) -> Vec<ubl::PaymentTerms> {
    let Some(cond) = &inv.payment_conditions else {
        return Vec::new();
    };
    let notes: Vec<String> = cond.comment.iter().cloned().collect();
    if cond.discounts.is_empty() {
        return vec![ubl::PaymentTerms {
            notes,
            payment_due_date: cond.due_date,
            ..Default::default()
        }];
    }
    cond.discounts
        .iter()
        .enumerate()
        .map(|(i, d)| ubl::PaymentTerms {
            notes: if i == 0 { notes.clone() } else { Vec::new() },
            payment_due_date: cond.due_date,
            settlement_discount_percent: d.percentage,
            settlement_discount_amount: d.amount,
            settlement_period: Some(ubl::Period {
                start_date: None,
                end_date: Some(d.payment_date),
            }),
            ..Default::default()
        })
        .collect()
}
