use rust_decimal::Decimal;

use super::types::*;
use super::EbVersion;
use crate::core::ConversionError;
use crate::core::rounding::{SCALE_AMOUNT, percent_of};
use crate::xml_utils::{XmlResult, XmlWriter, format_decimal};

/// Serialize an ebInterface invoice in the layout of `invoice.version`.
///
/// Fields the target version does not know (e.g. `PrepaidAmount` before
/// 4.3) are left out.
pub fn to_xml(invoice: &Invoice) -> XmlResult {
    let v = invoice.version;
    let mut w = XmlWriter::new()?;
    w.start_with_attrs(
        "Invoice",
        &[
            ("xmlns", v.namespace()),
            ("GeneratingSystem", invoice.generating_system.as_str()),
            ("DocumentType", invoice.document_type.as_str()),
            ("InvoiceCurrency", invoice.currency.as_str()),
        ],
    )?;

    w.text("InvoiceNumber", &invoice.invoice_number)?;
    w.date("InvoiceDate", invoice.invoice_date)?;
    if let Some(d) = &invoice.delivery {
        write_delivery(&mut w, d, v)?;
    }

    // Biller
    w.start("Biller")?;
    w.text("VATIdentificationNumber", &invoice.biller.vat_id)?;
    w.opt_text(
        "InvoiceRecipientsBillerID",
        invoice.biller.invoice_recipients_biller_id.as_deref(),
    )?;
    write_address(&mut w, &invoice.biller.address, v)?;
    w.end("Biller")?;

    // InvoiceRecipient
    let rcpt = &invoice.invoice_recipient;
    w.start("InvoiceRecipient")?;
    w.text("VATIdentificationNumber", &rcpt.vat_id)?;
    w.opt_text("BillersInvoiceRecipientID", rcpt.billers_invoice_recipient_id.as_deref())?;
    if let Some(or) = &rcpt.order_reference {
        w.start("OrderReference")?;
        w.text("OrderID", &or.order_id)?;
        if let Some(d) = or.reference_date {
            w.date("ReferenceDate", d)?;
        }
        w.end("OrderReference")?;
    }
    write_address(&mut w, &rcpt.address, v)?;
    w.end("InvoiceRecipient")?;

    if let Some(op) = &invoice.ordering_party {
        w.start("OrderingParty")?;
        w.text("VATIdentificationNumber", &op.vat_id)?;
        write_address(&mut w, &op.address, v)?;
        w.opt_text("BillersOrderingPartyID", op.billers_ordering_party_id.as_deref())?;
        w.end("OrderingParty")?;
    }

    w.start("Details")?;
    w.start("ItemList")?;
    for item in &invoice.details {
        write_line_item(&mut w, item, v)?;
    }
    w.end("ItemList")?;
    w.end("Details")?;

    if !invoice.reductions_and_surcharges.is_empty() {
        w.start("ReductionAndSurchargeDetails")?;
        for rs in &invoice.reductions_and_surcharges {
            write_document_reduction(&mut w, rs, v)?;
        }
        w.end("ReductionAndSurchargeDetails")?;
    }

    if let (Some(net), true) = (invoice.net_amount, v.supports_net_amount()) {
        w.decimal("NetAmount", net)?;
    }

    write_tax(&mut w, &invoice.tax, v)?;

    w.decimal("TotalGrossAmount", invoice.total_gross_amount)?;
    if let (Some(prepaid), true) = (invoice.prepaid_amount, v.supports_prepaid_amount()) {
        w.decimal("PrepaidAmount", prepaid)?;
    }
    if let (Some(payable), true) = (invoice.payable_amount, v.supports_payable_amount()) {
        w.decimal("PayableAmount", payable)?;
    }

    if let Some(pm) = &invoice.payment_method {
        write_payment_method(&mut w, pm, v)?;
    }
    if let Some(pc) = &invoice.payment_conditions {
        write_payment_conditions(&mut w, pc)?;
    }
    w.opt_text("Comment", invoice.comment.as_deref())?;

    w.end("Invoice")?;
    w.into_string()
}

fn write_address(w: &mut XmlWriter, a: &Address, v: EbVersion) -> Result<(), ConversionError> {
    w.start("Address")?;
    for id in &a.identifiers {
        w.text_with_attrs(
            "AddressIdentifier",
            &id.value,
            &[("AddressIdentifierType", id.kind.as_str())],
        )?;
    }
    w.text("Name", &a.name)?;
    w.opt_text("Street", a.street.as_deref())?;
    w.text("Town", &a.town)?;
    w.text("ZIP", &a.zip)?;
    if let Some(c) = &a.country {
        match &c.code {
            Some(code) => w.text_with_attrs("Country", &c.name, &[("CountryCode", code.as_str())])?,
            None => w.text("Country", &c.name)?,
        };
    }
    w.opt_text("Phone", a.phone.as_deref())?;
    w.opt_text("Email", a.email.as_deref())?;
    if !v.has_separate_contact() {
        w.opt_text("Contact", a.contact.as_deref())?;
    }
    w.end("Address")?;

    if let (Some(contact), true) = (&a.contact, v.has_separate_contact()) {
        w.start("Contact")?;
        w.text("Name", contact)?;
        w.end("Contact")?;
    }
    Ok(())
}

fn write_delivery(w: &mut XmlWriter, d: &Delivery, v: EbVersion) -> Result<(), ConversionError> {
    w.start("Delivery")?;
    match d.when {
        DeliveryTime::Date(date) => {
            w.date("Date", date)?;
        }
        DeliveryTime::Period { from, to } => {
            w.start("Period")?;
            w.date("FromDate", from)?;
            w.date("ToDate", to)?;
            w.end("Period")?;
        }
    }
    if let Some(a) = &d.address {
        write_address(w, a, v)?;
    }
    w.end("Delivery")?;
    Ok(())
}

fn tax_amount(taxable: Decimal, percent: Decimal, field: &str) -> Result<Decimal, ConversionError> {
    percent_of(taxable, percent, SCALE_AMOUNT)
        .ok_or_else(|| ConversionError::AmountOutOfRange(format!("{field}/TaxItem/TaxAmount")))
}

/// `TaxItem` block of 5.0+.
fn write_tax_item(
    w: &mut XmlWriter,
    taxable: Decimal,
    rate: &TaxRate,
    amount: Decimal,
) -> Result<(), ConversionError> {
    let category = rate.category_code.as_deref().unwrap_or("S");
    w.start("TaxItem")?;
    w.decimal("TaxableAmount", taxable)?;
    w.text_with_attrs(
        "TaxPercent",
        &format_decimal(rate.percent),
        &[("TaxCategoryCode", category)],
    )?;
    w.decimal("TaxAmount", amount)?;
    if let Some(ex) = &rate.exemption {
        w.text("Comment", &ex.reason)?;
    }
    w.end("TaxItem")?;
    Ok(())
}

/// `VATRate` or `TaxExemption` of 4.x.
fn write_vat_rate(w: &mut XmlWriter, rate: &TaxRate) -> Result<(), ConversionError> {
    match &rate.exemption {
        Some(ex) => match &ex.code {
            Some(code) => w.text_with_attrs(
                "TaxExemption",
                &ex.reason,
                &[("TaxExemptionCode", code.as_str())],
            )?,
            None => w.text("TaxExemption", &ex.reason)?,
        },
        None => w.decimal("VATRate", rate.percent)?,
    };
    Ok(())
}

fn write_line_item(
    w: &mut XmlWriter,
    item: &ListLineItem,
    v: EbVersion,
) -> Result<(), ConversionError> {
    w.start("ListLineItem")?;
    w.text("PositionNumber", &item.position_number.to_string())?;
    for d in &item.descriptions {
        w.text("Description", d)?;
    }
    for an in &item.article_numbers {
        w.text_with_attrs("ArticleNumber", &an.value, &[("ArticleNumberType", an.kind.as_str())])?;
    }
    w.text_with_attrs(
        "Quantity",
        &format_decimal(item.quantity.value),
        &[("Unit", item.quantity.unit.as_str())],
    )?;
    w.decimal("UnitPrice", item.unit_price)?;

    if v.uses_tax_items() {
        let amount = if item.tax.exemption.is_some() {
            Decimal::ZERO
        } else {
            let field = format!("ListLineItem[{}]", item.position_number);
            tax_amount(item.line_item_amount, item.tax.percent, &field)?
        };
        write_tax_item(w, item.line_item_amount, &item.tax, amount)?;
    } else {
        write_vat_rate(w, &item.tax)?;
    }

    if !item.reductions_and_surcharges.is_empty() {
        w.start("ReductionAndSurchargeListLineItemDetails")?;
        for rs in &item.reductions_and_surcharges {
            let tag = match rs.kind {
                ReductionKind::Reduction => "ReductionListLineItem",
                ReductionKind::Surcharge => "SurchargeListLineItem",
            };
            w.start(tag)?;
            w.decimal("BaseAmount", rs.base_amount)?;
            if let Some(p) = rs.percentage {
                w.decimal("Percentage", p)?;
            }
            if let Some(a) = rs.amount {
                w.decimal("Amount", a)?;
            }
            w.opt_text("Comment", rs.comment.as_deref())?;
            w.end(tag)?;
        }
        w.end("ReductionAndSurchargeListLineItemDetails")?;
    }

    if let Some(d) = &item.delivery {
        write_delivery(w, d, v)?;
    }
    if let Some(or) = &item.order_reference {
        w.start("InvoiceRecipientsOrderReference")?;
        w.text("OrderID", &or.order_id)?;
        w.opt_text("OrderPositionNumber", or.position.as_deref())?;
        w.end("InvoiceRecipientsOrderReference")?;
    }
    w.decimal("LineItemAmount", item.line_item_amount)?;
    w.end("ListLineItem")?;
    Ok(())
}

fn write_document_reduction(
    w: &mut XmlWriter,
    rs: &ReductionOrSurcharge,
    v: EbVersion,
) -> Result<(), ConversionError> {
    let tag = match rs.kind {
        ReductionKind::Reduction => "Reduction",
        ReductionKind::Surcharge => "Surcharge",
    };
    w.start(tag)?;
    w.decimal("BaseAmount", rs.base_amount)?;
    if let Some(p) = rs.percentage {
        w.decimal("Percentage", p)?;
    }
    if let Some(a) = rs.amount {
        w.decimal("Amount", a)?;
    }
    w.opt_text("Comment", rs.comment.as_deref())?;
    if let Some(rate) = rs.vat_rate {
        if v.uses_tax_items() {
            let taxable = rs.amount.unwrap_or(rs.base_amount);
            let tax_rate = TaxRate {
                percent: rate,
                ..Default::default()
            };
            let amount = tax_amount(taxable, rate, tag)?;
            write_tax_item(w, taxable, &tax_rate, amount)?;
        } else {
            w.decimal("VATRate", rate)?;
        }
    }
    w.end(tag)?;
    Ok(())
}

fn write_tax(w: &mut XmlWriter, tax: &Tax, v: EbVersion) -> Result<(), ConversionError> {
    w.start("Tax")?;
    if v.uses_tax_items() {
        for item in &tax.items {
            write_tax_item(w, item.taxable_amount, &item.rate, item.tax_amount)?;
        }
    } else {
        w.start("VAT")?;
        for item in &tax.items {
            w.start("Item")?;
            w.decimal("TaxedAmount", item.taxable_amount)?;
            write_vat_rate(w, &item.rate)?;
            w.decimal("Amount", item.tax_amount)?;
            w.end("Item")?;
        }
        w.end("VAT")?;
    }
    for other in &tax.other_taxes {
        w.start("OtherTax")?;
        w.text("Comment", &other.comment)?;
        w.decimal("Amount", other.amount)?;
        w.end("OtherTax")?;
    }
    w.end("Tax")?;
    Ok(())
}

fn write_payment_method(
    w: &mut XmlWriter,
    pm: &PaymentMethod,
    v: EbVersion,
) -> Result<(), ConversionError> {
    w.start("PaymentMethod")?;
    if v.supports_payment_comment() {
        w.opt_text("Comment", pm.comment.as_deref())?;
    }
    match &pm.kind {
        PaymentKind::UniversalBankTransaction(bt) => {
            let consolidator = if bt.consolidator_payable { "true" } else { "false" };
            w.start_with_attrs(
                "UniversalBankTransaction",
                &[("ConsolidatorPayable", consolidator)],
            )?;
            for acc in &bt.accounts {
                w.start("BeneficiaryAccount")?;
                w.opt_text("BIC", acc.bic.as_deref())?;
                w.opt_text("IBAN", acc.iban.as_deref())?;
                w.opt_text("BankAccountOwner", acc.owner.as_deref())?;
                w.end("BeneficiaryAccount")?;
            }
            w.opt_text("PaymentReference", bt.payment_reference.as_deref())?;
            w.end("UniversalBankTransaction")?;
        }
        PaymentKind::DirectDebit => {
            w.empty("DirectDebit")?;
        }
        PaymentKind::NoPayment => {
            w.empty("NoPayment")?;
        }
    }
    w.end("PaymentMethod")?;
    Ok(())
}

fn write_payment_conditions(
    w: &mut XmlWriter,
    pc: &PaymentConditions,
) -> Result<(), ConversionError> {
    w.start("PaymentConditions")?;
    if let Some(d) = pc.due_date {
        w.date("DueDate", d)?;
    }
    for disc in &pc.discounts {
        w.start("Discount")?;
        w.date("PaymentDate", disc.payment_date)?;
        if let Some(p) = disc.percentage {
            w.decimal("Percentage", p)?;
        }
        if let Some(a) = disc.amount {
            w.decimal("Amount", a)?;
        }
        w.end("Discount")?;
    }
    w.opt_text("Comment", pc.comment.as_deref())?;
    w.end("PaymentConditions")?;
    Ok(())
}
