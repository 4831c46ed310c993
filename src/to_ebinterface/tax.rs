//! Header tax subtotals → ebInterface tax items.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Context;
use crate::core::Text;
use crate::core::rounding::{HUNDRED, SCALE_PRICE, divide, percent_of, percentage_of};
use crate::ebinterface::{OtherTax, Tax, TaxExemption, TaxItem, TaxRate};
use crate::ubl::{Document, SchemedId, TaxCategory};

/// VAT categories that are written as tax exemptions.
pub(crate) const EXEMPTION_CATEGORIES: &[&str] = &["AE", "E", "O"];

/// Identifies a tax category within a tax scheme, e.g. `(VAT, S)`.
///
/// Equality covers both scheme IDs and values, so `S` and
/// `S` with `schemeID="UNCL5305"` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxCategoryKey {
    pub tax_scheme: SchemedId,
    pub tax_category: SchemedId,
}

impl TaxCategoryKey {
    pub fn new(tax_scheme: SchemedId, tax_category: SchemedId) -> Self {
        Self {
            tax_scheme,
            tax_category,
        }
    }

    /// Key of a UBL TaxCategory, or `None` without a tax scheme ID.
    pub fn from_category(cat: &TaxCategory) -> Option<Self> {
        let scheme = cat.tax_scheme_id.as_ref().filter(|s| !s.value.trim().is_empty())?;
        Some(Self::new(
            scheme.clone(),
            cat.id.clone().unwrap_or_default(),
        ))
    }

    pub fn is_vat(&self) -> bool {
        is_vat_scheme(&self.tax_scheme.value)
    }
}

pub(crate) fn is_vat_scheme(id: &str) -> bool {
    id.trim().eq_ignore_ascii_case("VAT")
}

pub(crate) fn is_exemption_category(code: &str) -> bool {
    EXEMPTION_CATEGORIES.contains(&code.trim().to_ascii_uppercase().as_str())
}

/// Result of the header tax mapping, consulted again by the line mapping.
#[derive(Debug, Default)]
pub(super) struct TaxSummary {
    pub tax: Tax,
    pub percentages: HashMap<TaxCategoryKey, Decimal>,
    pub exemptions: HashMap<TaxCategoryKey, TaxExemption>,
    /// Distinct VAT percentages in document order.
    pub vat_percentages: Vec<Decimal>,
}

impl TaxSummary {
    /// The header VAT percentage, if the document uses exactly one.
    pub fn single_vat_percentage(&self) -> Option<Decimal> {
        match self.vat_percentages.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

pub(super) fn convert_tax(doc: &Document, ctx: &mut Context<'_>) -> TaxSummary {
    let mut summary = TaxSummary::default();
    let mut vat_subtotals = 0usize;

    for (t, total) in doc.tax_totals.iter().enumerate() {
        for (s, sub) in total.subtotals.iter().enumerate() {
            let field = format!("TaxTotal[{}]/TaxSubtotal[{}]", t + 1, s + 1);
            let Some(key) = TaxCategoryKey::from_category(&sub.category) else {
                ctx.error(
                    format!("{field}/TaxCategory/TaxScheme/ID"),
                    Text::MissingTaxSchemeId,
                    &[],
                );
                continue;
            };
            if key.is_vat() {
                vat_subtotals += 1;
            }

            let percent = sub.category.percent.or(sub.percent);
            let completion = complete_subtotal(sub.taxable_amount, percent, sub.tax_amount);
            let (taxable, percent, amount) = match completion {
                Completion::Complete(t, p, a) => (t, p, a),
                Completion::Incomplete => {
                    ctx.error(field, Text::TaxSubtotalIncomplete, &[]);
                    continue;
                }
                Completion::OutOfRange => {
                    ctx.out_of_range(field);
                    continue;
                }
            };
            summary.percentages.insert(key.clone(), percent);

            if !key.is_vat() {
                summary.tax.other_taxes.push(OtherTax {
                    comment: key.tax_scheme.value.trim().to_string(),
                    amount,
                });
                continue;
            }

            if !summary.vat_percentages.contains(&percent) {
                summary.vat_percentages.push(percent);
            }
            let code = key.tax_category.value.trim().to_ascii_uppercase();
            let exemption =
                is_exemption_category(&code).then(|| exemption(&sub.category, &code, ctx));
            if let Some(ex) = &exemption {
                summary.exemptions.insert(key.clone(), ex.clone());
            }
            summary.tax.items.push(TaxItem {
                taxable_amount: taxable,
                rate: TaxRate {
                    percent,
                    category_code: (!code.is_empty()).then_some(code),
                    exemption,
                },
                tax_amount: amount,
            });
        }
    }

    if vat_subtotals == 0 {
        ctx.error("TaxTotal/TaxSubtotal", Text::MissingVatSubtotal, &[]);
    }
    summary
}

/// Result of [`complete_subtotal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Taxable amount, percentage, tax amount.
    Complete(Decimal, Decimal, Decimal),
    /// Fewer than two values, or a taxable amount that needs a division by
    /// a zero percentage.
    Incomplete,
    /// The derived value leaves the `Decimal` range.
    OutOfRange,
}

/// Fill in the missing one of (taxable amount, percentage, tax amount).
pub(crate) fn complete_subtotal(
    taxable: Option<Decimal>,
    percent: Option<Decimal>,
    amount: Option<Decimal>,
) -> Completion {
    let derived = |value: Option<Decimal>| value.ok_or(Completion::OutOfRange);
    let result = match (taxable, percent, amount) {
        (Some(t), Some(p), Some(a)) => Ok((t, p, a)),
        (Some(t), None, Some(a)) if t.is_zero() => Ok((t, Decimal::ZERO, a)),
        (Some(t), None, Some(a)) => derived(percentage_of(a, t)).map(|p| (t, p, a)),
        (None, Some(p), Some(_)) if p.is_zero() => Err(Completion::Incomplete),
        (None, Some(p), Some(a)) => derived(a.checked_mul(HUNDRED))
            .and_then(|n| derived(divide(n, p, SCALE_PRICE)))
            .map(|t| (t, p, a)),
        (Some(t), Some(p), None) => derived(percent_of(t, p, SCALE_PRICE)).map(|a| (t, p, a)),
        _ => Err(Completion::Incomplete),
    };
    match result {
        Ok((t, p, a)) => Completion::Complete(t, p, a),
        Err(outcome) => outcome,
    }
}

/// Exemption reason: TaxExemptionReason, else its code, else a default text.
pub(crate) fn exemption(cat: &TaxCategory, code: &str, ctx: &Context<'_>) -> TaxExemption {
    let reason_code = cat
        .exemption_reason_code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let reason = cat
        .exemption_reasons
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .or(reason_code)
        .map(str::to_string)
        .unwrap_or_else(|| Text::DefaultTaxExemptionReason.format(ctx.locale, &[code]));
    TaxExemption {
        reason,
        code: reason_code.map(str::to_string),
    }
}
