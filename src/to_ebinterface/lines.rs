//! Invoice/credit note lines → ebInterface `ListLineItem`s.

use rust_decimal::Decimal;

use super::tax::{TaxCategoryKey, TaxSummary, exemption, is_exemption_category, is_vat_scheme};
use super::{Context, delivery, non_empty_join, trimmed};
use crate::core::Text;
use crate::core::rounding::{SCALE_AMOUNT, SCALE_PRICE, divide, half_up, multiply};
use crate::ebinterface::{
    ArticleNumber, ArticleNumberType, ListLineItem, OrderLineReference, Quantity, ReductionKind,
    ReductionOrSurcharge, TaxRate,
};
use crate::ubl::{self, Document, TaxCategory};

/// Unit code used when a quantity has none ("one", UN/ECE Rec 20).
pub const DEFAULT_UNIT_CODE: &str = "C62";

pub(super) fn convert_lines(
    doc: &Document,
    taxes: &TaxSummary,
    ctx: &mut Context<'_>,
) -> Vec<ListLineItem> {
    let line_name = doc.kind.line_name();
    if doc.lines.is_empty() {
        ctx.error(line_name, Text::MissingInvoiceLines, &[]);
        return Vec::new();
    }

    let mut out = Vec::with_capacity(doc.lines.len());
    for (i, line) in doc.lines.iter().enumerate() {
        let field = format!("{line_name}[{}]", i + 1);
        if let Some(item) = convert_line(doc, line, i, &field, taxes, ctx) {
            out.push(item);
        }
    }
    out
}

fn convert_line(
    doc: &Document,
    line: &ubl::Line,
    index: usize,
    field: &str,
    taxes: &TaxSummary,
    ctx: &mut Context<'_>,
) -> Option<ListLineItem> {
    let position_number = position_number(line.id.as_deref(), index, field, ctx);
    let quantity_field = format!("{field}/{}", doc.kind.quantity_name());
    let quantity = quantity(line, &quantity_field, ctx);
    let unit_price = unit_price(line, quantity.value, field, &quantity_field, ctx);
    let tax = tax_rate(line, taxes, field, ctx);

    let descriptions = descriptions(&line.item);
    let article_numbers = article_numbers(&line.item);
    let delivery = delivery::convert_line_delivery(doc, line, field, ctx);
    let order_reference = order_reference(doc, line);

    let unit_price = unit_price?;
    let Some(base) = multiply(quantity.value, unit_price, SCALE_AMOUNT) else {
        ctx.out_of_range(format!("{field}/LineExtensionAmount"));
        return None;
    };
    let (reductions_and_surcharges, running_base) =
        fold_allowances(&line.allowance_charges, base, field, ctx);
    let line_item_amount = match (line.line_extension_amount, running_base) {
        (Some(amount), _) => amount,
        (None, Some(running)) => half_up(running, SCALE_AMOUNT),
        (None, None) => return None,
    };

    Some(ListLineItem {
        position_number,
        descriptions,
        article_numbers,
        quantity,
        unit_price,
        tax: tax?,
        reductions_and_surcharges,
        delivery,
        order_reference,
        line_item_amount,
    })
}

/// Line ID as a positive integer, else the 1-based index.
pub(crate) fn position_number(
    id: Option<&str>,
    index: usize,
    field: &str,
    ctx: &mut Context<'_>,
) -> u32 {
    let fallback = u32::try_from(index + 1).unwrap_or(u32::MAX);
    match trimmed(id).map(|s| (s, s.parse::<u32>())) {
        Some((_, Ok(n))) if n > 0 => n,
        other => {
            let shown = other.map(|(s, _)| s).unwrap_or_default();
            ctx.warn(
                format!("{field}/ID"),
                Text::InvalidPositionNumber,
                &[shown, fallback.to_string().as_str()],
            );
            fallback
        }
    }
}

/// `field` is the path of the quantity element itself.
fn quantity(line: &ubl::Line, field: &str, ctx: &mut Context<'_>) -> Quantity {
    let q = line.quantity.as_ref();
    let value = match q.and_then(|q| q.value) {
        Some(v) => v,
        None => {
            ctx.warn(field, Text::MissingQuantity, &[]);
            Decimal::ONE
        }
    };
    let unit = match trimmed(q.and_then(|q| q.unit_code.as_deref())) {
        Some(u) => u.to_string(),
        None => {
            ctx.warn(
                format!("{field}/@unitCode"),
                Text::MissingQuantityUnit,
                &[DEFAULT_UNIT_CODE],
            );
            DEFAULT_UNIT_CODE.to_string()
        }
    };
    Quantity { unit, value }
}

/// PriceAmount per BaseQuantity, else LineExtensionAmount / quantity.
///
/// A zero quantity with a zero line amount gives a zero price.
fn unit_price(
    line: &ubl::Line,
    quantity: Decimal,
    field: &str,
    quantity_field: &str,
    ctx: &mut Context<'_>,
) -> Option<Decimal> {
    let price_field = format!("{field}/Price/PriceAmount");
    if let Some(price) = line.price.as_ref().and_then(|p| p.amount.map(|a| (a, p.base_quantity))) {
        return match price {
            (amount, Some(base)) if !base.is_zero() => {
                let per_unit = divide(amount, base, SCALE_PRICE);
                if per_unit.is_none() {
                    ctx.out_of_range(price_field);
                }
                per_unit
            }
            (amount, _) => Some(amount),
        };
    }
    let Some(amount) = line.line_extension_amount else {
        ctx.error(price_field, Text::MissingUnitPrice, &[]);
        return None;
    };
    if quantity.is_zero() {
        if amount.is_zero() {
            return Some(Decimal::ZERO);
        }
        ctx.error(
            quantity_field,
            Text::ZeroQuantityUnitPrice,
            &[amount.to_string().as_str()],
        );
        return None;
    }
    let derived = divide(amount, quantity, SCALE_PRICE);
    if derived.is_none() {
        ctx.out_of_range(price_field);
    }
    derived
}

/// The category a line is taxed with: ClassifiedTaxCategory, else the
/// category of the line's own tax subtotal.
fn line_category(line: &ubl::Line) -> Option<&TaxCategory> {
    line.item.classified_tax_categories.first().or_else(|| {
        line.tax_totals
            .iter()
            .flat_map(|t| t.subtotals.iter())
            .map(|s| &s.category)
            .next()
    })
}

fn tax_rate(
    line: &ubl::Line,
    taxes: &TaxSummary,
    field: &str,
    ctx: &mut Context<'_>,
) -> Option<TaxRate> {
    let category = line_category(line);
    let key = category.and_then(TaxCategoryKey::from_category);

    let percent = category
        .and_then(|c| c.percent)
        .or_else(|| key.as_ref().and_then(|k| taxes.percentages.get(k).copied()))
        .or_else(|| taxes.single_vat_percentage());
    let Some(percent) = percent else {
        ctx.error(
            format!("{field}/Item/ClassifiedTaxCategory/Percent"),
            Text::MissingLineVatRate,
            &[],
        );
        return None;
    };

    let code = category
        .and_then(|c| c.id.as_ref())
        .map(|id| id.value.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty());
    let vat = key.as_ref().is_none_or(|k| is_vat_scheme(&k.tax_scheme.value));
    let exemption = match (&code, category) {
        (Some(c), Some(cat)) if vat && is_exemption_category(c) => Some(
            key.as_ref()
                .and_then(|k| taxes.exemptions.get(k).cloned())
                .unwrap_or_else(|| exemption(cat, c, ctx)),
        ),
        _ => None,
    };
    Some(TaxRate {
        percent,
        category_code: code,
        exemption,
    })
}

fn descriptions(item: &ubl::Item) -> Vec<String> {
    let from_desc: Vec<String> = item
        .descriptions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !from_desc.is_empty() {
        return from_desc;
    }
    trimmed(item.name.as_deref())
        .map(|n| vec![n.to_string()])
        .unwrap_or_default()
}

fn article_numbers(item: &ubl::Item) -> Vec<ArticleNumber> {
    let candidates = [
        (ArticleNumberType::BillersArticleNumber, item.sellers_item_id.as_deref()),
        (
            ArticleNumberType::InvoiceRecipientsArticleNumber,
            item.buyers_item_id.as_deref(),
        ),
        (
            ArticleNumberType::Gtin,
            item.standard_item_id.as_ref().map(|id| id.value.as_str()),
        ),
    ];
    candidates
        .into_iter()
        .filter_map(|(kind, value)| {
            trimmed(value).map(|v| ArticleNumber {
                kind,
                value: v.to_string(),
            })
        })
        .collect()
}

fn order_reference(doc: &Document, line: &ubl::Line) -> Option<OrderLineReference> {
    let order_id = trimmed(doc.order_reference.as_ref().and_then(|o| o.id.as_deref()))?;
    Some(OrderLineReference {
        order_id: order_id.to_string(),
        position: trimmed(line.order_line_id.as_deref()).map(str::to_string),
    })
}

/// Fold line allowances/charges into one direction.
///
/// The first entry decides whether the line carries reductions or
/// surcharges; later entries of the other kind get a negated amount.
/// Returns the entries and the running base after all of them, or no base
/// once it leaves the `Decimal` range.
pub(crate) fn fold_allowances(
    entries: &[ubl::AllowanceCharge],
    start: Decimal,
    field: &str,
    ctx: &mut Context<'_>,
) -> (Vec<ReductionOrSurcharge>, Option<Decimal>) {
    let mut running = start;
    let mut out = Vec::new();
    let Some(first) = entries.first() else {
        return (out, Some(running));
    };
    let kind = if first.charge_indicator {
        ReductionKind::Surcharge
    } else {
        ReductionKind::Reduction
    };

    for (i, ac) in entries.iter().enumerate() {
        let Some(amount) = ac.amount else {
            ctx.error(
                format!("{field}/AllowanceCharge[{}]/Amount", i + 1),
                Text::MissingAllowanceChargeAmount,
                &[],
            );
            continue;
        };
        let base_amount = ac.base_amount.unwrap_or(running);
        let next = if ac.charge_indicator {
            running.checked_add(amount)
        } else {
            running.checked_sub(amount)
        };
        let Some(next) = next else {
            ctx.out_of_range(format!("{field}/AllowanceCharge[{}]/Amount", i + 1));
            return (out, None);
        };
        running = next;
        let amount = if ac.charge_indicator == first.charge_indicator {
            amount
        } else {
            -amount
        };
        let mut reasons = ac.reasons.clone();
        if reasons.is_empty() {
            reasons.extend(ac.reason_code.clone());
        }
        out.push(ReductionOrSurcharge {
            kind,
            base_amount,
            percentage: ac.multiplier_factor,
            amount: Some(amount),
            comment: non_empty_join(&reasons),
            vat_rate: None,
        });
    }
    (out, Some(running))
}
