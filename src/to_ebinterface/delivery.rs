//! Delivery date/period and delivery address.

use super::Context;
use super::party::map_address;
use crate::core::Text;
use crate::ebinterface::{Delivery, DeliveryTime};
use crate::ubl::{self, Document};

/// Header-level delivery.
///
/// The first UBL Delivery's ActualDeliveryDate wins; without it the
/// InvoicePeriod is used.
pub(super) fn convert_delivery(doc: &Document, ctx: &mut Context<'_>) -> Option<Delivery> {
    if doc.deliveries.len() > 1 {
        ctx.warn(
            "Delivery",
            Text::MultipleDeliveries,
            &[doc.deliveries.len().to_string().as_str()],
        );
    }
    let first = doc.deliveries.first();

    let when = match first.and_then(|d| d.actual_delivery_date) {
        Some(date) => Some(DeliveryTime::Date(date)),
        None => period(doc, ctx),
    };
    let Some(when) = when else {
        if ctx.settings.invoice_delivery_date_mandatory {
            ctx.error("Delivery/ActualDeliveryDate", Text::MissingDeliveryDate, &[]);
        }
        return None;
    };

    let address = first.and_then(|d| delivery_address(doc, d, "Delivery", true, ctx));
    Some(Delivery { when, address })
}

fn period(doc: &Document, ctx: &mut Context<'_>) -> Option<DeliveryTime> {
    let p = doc.invoice_period.as_ref()?;
    match (p.start_date, p.end_date) {
        (Some(from), Some(to)) => Some(DeliveryTime::Period { from, to }),
        (Some(from), None) => {
            ctx.warn("InvoicePeriod/EndDate", Text::IncompleteDeliveryPeriod, &[]);
            Some(DeliveryTime::Date(from))
        }
        (None, Some(to)) => Some(DeliveryTime::Date(to)),
        (None, None) => None,
    }
}

/// Line-level delivery; only mapped when the line states a delivery date.
pub(super) fn convert_line_delivery(
    doc: &Document,
    line: &ubl::Line,
    field: &str,
    ctx: &mut Context<'_>,
) -> Option<Delivery> {
    let d = line.deliveries.first()?;
    let date = d.actual_delivery_date?;
    Some(Delivery {
        when: DeliveryTime::Date(date),
        address: delivery_address(doc, d, &format!("{field}/Delivery"), false, ctx),
    })
}

/// DeliveryLocation/Address named after the delivery party, else the customer.
fn delivery_address(
    doc: &Document,
    d: &ubl::Delivery,
    field: &str,
    validate: bool,
    ctx: &mut Context<'_>,
) -> Option<crate::ebinterface::Address> {
    let postal = d.address.as_ref()?;
    let name = d
        .party
        .as_ref()
        .and_then(|p| p.display_name())
        .or_else(|| {
            doc.customer
                .as_ref()
                .and_then(|c| c.party.as_ref())
                .and_then(|p| p.display_name())
        });
    Some(map_address(
        name,
        Some(postal),
        &format!("{field}/DeliveryLocation"),
        validate,
        ctx,
    ))
}
