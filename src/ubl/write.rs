use rust_decimal::Decimal;

use super::types::*;
use super::ns;
use crate::core::ConversionError;
use crate::xml_utils::{XmlResult, XmlWriter};

/// Serialize a UBL document as Invoice or CreditNote XML, depending on its kind.
///
/// Absent optional fields are omitted. Amounts carry the document
/// currency as `currencyID` (EUR if the document has none).
pub fn to_ubl_xml(doc: &Document) -> XmlResult {
    let currency = doc.document_currency_code.as_deref().unwrap_or("EUR");
    let is_credit_note = doc.kind == DocumentKind::CreditNote;
    let root_tag = if is_credit_note {
        "ubl:CreditNote"
    } else {
        "ubl:Invoice"
    };
    let root_ns = if is_credit_note {
        ns::CREDIT_NOTE
    } else {
        ns::INVOICE
    };

    let mut w = XmlWriter::new()?;
    w.start_with_attrs(
        root_tag,
        &[("xmlns:ubl", root_ns), ("xmlns:cac", ns::CAC), ("xmlns:cbc", ns::CBC)],
    )?;

    w.opt_text("cbc:UBLVersionID", doc.ubl_version_id.as_deref())?;
    w.opt_text("cbc:CustomizationID", doc.customization_id.as_deref())?;
    w.opt_text("cbc:ProfileID", doc.profile_id.as_deref())?;
    w.opt_text("cbc:ID", doc.id.as_deref())?;
    if let Some(d) = doc.issue_date {
        w.date("cbc:IssueDate", d)?;
    }
    // CreditNote has no root DueDate in UBL 2.1
    if let (Some(d), false) = (doc.due_date, is_credit_note) {
        w.date("cbc:DueDate", d)?;
    }
    let type_tag = if is_credit_note {
        "cbc:CreditNoteTypeCode"
    } else {
        "cbc:InvoiceTypeCode"
    };
    w.opt_text(type_tag, doc.type_code.as_deref())?;
    for note in &doc.notes {
        w.text("cbc:Note", note)?;
    }
    if let Some(d) = doc.tax_point_date {
        w.date("cbc:TaxPointDate", d)?;
    }
    w.opt_text("cbc:DocumentCurrencyCode", doc.document_currency_code.as_deref())?;
    w.opt_text("cbc:BuyerReference", doc.buyer_reference.as_deref())?;

    if let Some(period) = &doc.invoice_period {
        write_period(&mut w, "cac:InvoicePeriod", period)?;
    }
    if let Some(or) = &doc.order_reference {
        w.start("cac:OrderReference")?;
        w.text("cbc:ID", or.id.as_deref().unwrap_or_default())?;
        if let Some(d) = or.issue_date {
            w.date("cbc:IssueDate", d)?;
        }
        w.end("cac:OrderReference")?;
    }

    if let Some(supplier) = &doc.supplier {
        write_accounting_party(
            &mut w,
            "cac:AccountingSupplierParty",
            "cbc:CustomerAssignedAccountID",
            supplier,
        )?;
    }
    if let Some(customer) = &doc.customer {
        write_accounting_party(
            &mut w,
            "cac:AccountingCustomerParty",
            "cbc:SupplierAssignedAccountID",
            customer,
        )?;
    }
    if let Some(payee) = &doc.payee {
        write_party(&mut w, "cac:PayeeParty", payee)?;
    }
    if let Some(buyer) = &doc.buyer_customer {
        w.start("cac:BuyerCustomerParty")?;
        write_party(&mut w, "cac:Party", buyer)?;
        w.end("cac:BuyerCustomerParty")?;
    }

    for delivery in &doc.deliveries {
        write_delivery(&mut w, delivery)?;
    }
    for pm in &doc.payment_means {
        write_payment_means(&mut w, pm)?;
    }
    for pt in &doc.payment_terms {
        write_payment_terms(&mut w, pt, currency)?;
    }
    for ac in &doc.allowance_charges {
        write_allowance_charge(&mut w, ac, currency)?;
    }
    for tt in &doc.tax_totals {
        write_tax_total(&mut w, tt, currency)?;
    }

    let total_tag = if is_credit_note && doc.ubl_version_id.as_deref() == Some("2.0") {
        "cac:RequestedMonetaryTotal"
    } else {
        "cac:LegalMonetaryTotal"
    };
    write_monetary_total(&mut w, total_tag, &doc.monetary_total, currency)?;

    let line_tag = format!("cac:{}", doc.kind.line_name());
    let qty_tag = format!("cbc:{}", doc.kind.quantity_name());
    for line in &doc.lines {
        write_line(&mut w, &line_tag, &qty_tag, line, currency)?;
    }

    w.end(root_tag)?;
    w.into_string()
}

fn write_schemed(w: &mut XmlWriter, name: &str, id: &SchemedId) -> Result<(), ConversionError> {
    match &id.scheme_id {
        Some(scheme) => w.text_with_attrs(name, &id.value, &[("schemeID", scheme.as_str())])?,
        None => w.text(name, &id.value)?,
    };
    Ok(())
}

fn write_opt_amount(
    w: &mut XmlWriter,
    name: &str,
    amount: Option<Decimal>,
    currency: &str,
) -> Result<(), ConversionError> {
    if let Some(a) = amount {
        w.amount(name, a, currency)?;
    }
    Ok(())
}

fn write_period(w: &mut XmlWriter, tag: &str, period: &Period) -> Result<(), ConversionError> {
    w.start(tag)?;
    if let Some(d) = period.start_date {
        w.date("cbc:StartDate", d)?;
    }
    if let Some(d) = period.end_date {
        w.date("cbc:EndDate", d)?;
    }
    w.end(tag)?;
    Ok(())
}

fn write_accounting_party(
    w: &mut XmlWriter,
    tag: &str,
    account_tag: &str,
    ap: &AccountingParty,
) -> Result<(), ConversionError> {
    w.start(tag)?;
    w.opt_text(account_tag, ap.assigned_account_id.as_deref())?;
    if let Some(party) = &ap.party {
        write_party(w, "cac:Party", party)?;
    }
    w.end(tag)?;
    Ok(())
}

fn write_party(w: &mut XmlWriter, tag: &str, party: &Party) -> Result<(), ConversionError> {
    w.start(tag)?;
    if let Some(ep) = &party.endpoint_id {
        write_schemed(w, "cbc:EndpointID", ep)?;
    }
    for id in &party.identifications {
        w.start("cac:PartyIdentification")?;
        write_schemed(w, "cbc:ID", id)?;
        w.end("cac:PartyIdentification")?;
    }
    for name in &party.names {
        w.start("cac:PartyName")?;
        w.text("cbc:Name", name)?;
        w.end("cac:PartyName")?;
    }
    if let Some(addr) = &party.postal_address {
        write_address(w, "cac:PostalAddress", addr)?;
    }
    for pts in &party.tax_schemes {
        w.start("cac:PartyTaxScheme")?;
        w.opt_text("cbc:CompanyID", pts.company_id.as_deref())?;
        if let Some(scheme) = &pts.tax_scheme_id {
            w.start("cac:TaxScheme")?;
            write_schemed(w, "cbc:ID", scheme)?;
            w.end("cac:TaxScheme")?;
        }
        w.end("cac:PartyTaxScheme")?;
    }
    for le in &party.legal_entities {
        w.start("cac:PartyLegalEntity")?;
        w.opt_text("cbc:RegistrationName", le.registration_name.as_deref())?;
        if let Some(id) = &le.company_id {
            write_schemed(w, "cbc:CompanyID", id)?;
        }
        w.end("cac:PartyLegalEntity")?;
    }
    if let Some(c) = &party.contact {
        w.start("cac:Contact")?;
        w.opt_text("cbc:Name", c.name.as_deref())?;
        w.opt_text("cbc:Telephone", c.telephone.as_deref())?;
        w.opt_text("cbc:ElectronicMail", c.email.as_deref())?;
        w.end("cac:Contact")?;
    }
    if let Some(p) = &party.person {
        w.start("cac:Person")?;
        w.opt_text("cbc:FirstName", p.first_name.as_deref())?;
        w.opt_text("cbc:FamilyName", p.family_name.as_deref())?;
        w.opt_text("cbc:MiddleName", p.middle_name.as_deref())?;
        w.end("cac:Person")?;
    }
    w.end(tag)?;
    Ok(())
}

fn write_address(w: &mut XmlWriter, tag: &str, addr: &Address) -> Result<(), ConversionError> {
    w.start(tag)?;
    w.opt_text("cbc:StreetName", addr.street_name.as_deref())?;
    w.opt_text("cbc:AdditionalStreetName", addr.additional_street_name.as_deref())?;
    w.opt_text("cbc:BuildingNumber", addr.building_number.as_deref())?;
    w.opt_text("cbc:CityName", addr.city_name.as_deref())?;
    w.opt_text("cbc:PostalZone", addr.postal_zone.as_deref())?;
    w.opt_text("cbc:CountrySubentity", addr.country_subentity.as_deref())?;
    for line in &addr.address_lines {
        w.start("cac:AddressLine")?;
        w.text("cbc:Line", line)?;
        w.end("cac:AddressLine")?;
    }
    if let Some(country) = &addr.country {
        w.start("cac:Country")?;
        w.opt_text("cbc:IdentificationCode", country.code.as_deref())?;
        w.opt_text("cbc:Name", country.name.as_deref())?;
        w.end("cac:Country")?;
    }
    w.end(tag)?;
    Ok(())
}

fn write_delivery(w: &mut XmlWriter, d: &Delivery) -> Result<(), ConversionError> {
    w.start("cac:Delivery")?;
    if let Some(date) = d.actual_delivery_date {
        w.date("cbc:ActualDeliveryDate", date)?;
    }
    if let Some(addr) = &d.address {
        w.start("cac:DeliveryLocation")?;
        write_address(w, "cac:Address", addr)?;
        w.end("cac:DeliveryLocation")?;
    }
    if let Some(party) = &d.party {
        write_party(w, "cac:DeliveryParty", party)?;
    }
    w.end("cac:Delivery")?;
    Ok(())
}

fn write_payment_means(w: &mut XmlWriter, pm: &PaymentMeans) -> Result<(), ConversionError> {
    w.start("cac:PaymentMeans")?;
    w.opt_text("cbc:PaymentMeansCode", pm.code.as_deref())?;
    if let Some(d) = pm.due_date {
        w.date("cbc:PaymentDueDate", d)?;
    }
    for note in &pm.instruction_notes {
        w.text("cbc:InstructionNote", note)?;
    }
    for id in &pm.payment_ids {
        w.text("cbc:PaymentID", id)?;
    }
    if let Some(acc) = &pm.payee_account {
        w.start("cac:PayeeFinancialAccount")?;
        if let Some(id) = &acc.id {
            write_schemed(w, "cbc:ID", id)?;
        }
        w.opt_text("cbc:Name", acc.name.as_deref())?;
        if acc.branch_id.is_some() || acc.institution_id.is_some() {
            w.start("cac:FinancialInstitutionBranch")?;
            w.opt_text("cbc:ID", acc.branch_id.as_deref())?;
            if let Some(inst) = &acc.institution_id {
                w.start("cac:FinancialInstitution")?;
                w.text("cbc:ID", inst)?;
                w.end("cac:FinancialInstitution")?;
            }
            w.end("cac:FinancialInstitutionBranch")?;
        }
        w.end("cac:PayeeFinancialAccount")?;
    }
    if pm.mandate_id.is_some() || pm.payer_account_id.is_some() {
        w.start("cac:PaymentMandate")?;
        w.opt_text("cbc:ID", pm.mandate_id.as_deref())?;
        if let Some(payer) = &pm.payer_account_id {
            w.start("cac:PayerFinancialAccount")?;
            w.text("cbc:ID", payer)?;
            w.end("cac:PayerFinancialAccount")?;
        }
        w.end("cac:PaymentMandate")?;
    }
    w.end("cac:PaymentMeans")?;
    Ok(())
}

fn write_payment_terms(
    w: &mut XmlWriter,
    pt: &PaymentTerms,
    currency: &str,
) -> Result<(), ConversionError> {
    w.start("cac:PaymentTerms")?;
    for note in &pt.notes {
        w.text("cbc:Note", note)?;
    }
    if let Some(p) = pt.settlement_discount_percent {
        w.decimal("cbc:SettlementDiscountPercent", p)?;
    }
    if let Some(p) = pt.penalty_surcharge_percent {
        w.decimal("cbc:PenaltySurchargePercent", p)?;
    }
    write_opt_amount(w, "cbc:SettlementDiscountAmount", pt.settlement_discount_amount, currency)?;
    write_opt_amount(w, "cbc:PenaltyAmount", pt.penalty_amount, currency)?;
    if let Some(d) = pt.payment_due_date {
        w.date("cbc:PaymentDueDate", d)?;
    }
    if let Some(p) = &pt.settlement_period {
        write_period(w, "cac:SettlementPeriod", p)?;
    }
    if let Some(p) = &pt.penalty_period {
        write_period(w, "cac:PenaltyPeriod", p)?;
    }
    w.end("cac:PaymentTerms")?;
    Ok(())
}

fn write_allowance_charge(
    w: &mut XmlWriter,
    ac: &AllowanceCharge,
    currency: &str,
) -> Result<(), ConversionError> {
    w.start("cac:AllowanceCharge")?;
    w.text("cbc:ChargeIndicator", if ac.charge_indicator { "true" } else { "false" })?;
    w.opt_text("cbc:AllowanceChargeReasonCode", ac.reason_code.as_deref())?;
    for reason in &ac.reasons {
        w.text("cbc:AllowanceChargeReason", reason)?;
    }
    if let Some(f) = ac.multiplier_factor {
        w.decimal("cbc:MultiplierFactorNumeric", f)?;
    }
    write_opt_amount(w, "cbc:Amount", ac.amount, currency)?;
    write_opt_amount(w, "cbc:BaseAmount", ac.base_amount, currency)?;
    for cat in &ac.tax_categories {
        write_tax_category(w, "cac:TaxCategory", cat)?;
    }
    w.end("cac:AllowanceCharge")?;
    Ok(())
}

fn write_tax_category(
    w: &mut XmlWriter,
    tag: &str,
    cat: &TaxCategory,
) -> Result<(), ConversionError> {
    w.start(tag)?;
    if let Some(id) = &cat.id {
        write_schemed(w, "cbc:ID", id)?;
    }
    if let Some(p) = cat.percent {
        w.decimal("cbc:Percent", p)?;
    }
    w.opt_text("cbc:TaxExemptionReasonCode", cat.exemption_reason_code.as_deref())?;
    for reason in &cat.exemption_reasons {
        w.text("cbc:TaxExemptionReason", reason)?;
    }
    if let Some(scheme) = &cat.tax_scheme_id {
        w.start("cac:TaxScheme")?;
        write_schemed(w, "cbc:ID", scheme)?;
        w.end("cac:TaxScheme")?;
    }
    w.end(tag)?;
    Ok(())
}

fn write_tax_total(
    w: &mut XmlWriter,
    tt: &TaxTotal,
    currency: &str,
) -> Result<(), ConversionError> {
    w.start("cac:TaxTotal")?;
    write_opt_amount(w, "cbc:TaxAmount", tt.tax_amount, currency)?;
    for sub in &tt.subtotals {
        w.start("cac:TaxSubtotal")?;
        write_opt_amount(w, "cbc:TaxableAmount", sub.taxable_amount, currency)?;
        write_opt_amount(w, "cbc:TaxAmount", sub.tax_amount, currency)?;
        if let Some(p) = sub.percent {
            w.decimal("cbc:Percent", p)?;
        }
        write_tax_category(w, "cac:TaxCategory", &sub.category)?;
        w.end("cac:TaxSubtotal")?;
    }
    w.end("cac:TaxTotal")?;
    Ok(())
}

fn write_monetary_total(
    w: &mut XmlWriter,
    tag: &str,
    t: &MonetaryTotal,
    currency: &str,
) -> Result<(), ConversionError> {
    w.start(tag)?;
    write_opt_amount(w, "cbc:LineExtensionAmount", t.line_extension_amount, currency)?;
    write_opt_amount(w, "cbc:TaxExclusiveAmount", t.tax_exclusive_amount, currency)?;
    write_opt_amount(w, "cbc:TaxInclusiveAmount", t.tax_inclusive_amount, currency)?;
    write_opt_amount(w, "cbc:AllowanceTotalAmount", t.allowance_total_amount, currency)?;
    write_opt_amount(w, "cbc:ChargeTotalAmount", t.charge_total_amount, currency)?;
    write_opt_amount(w, "cbc:PrepaidAmount", t.prepaid_amount, currency)?;
    write_opt_amount(w, "cbc:PayableRoundingAmount", t.payable_rounding_amount, currency)?;
    write_opt_amount(w, "cbc:PayableAmount", t.payable_amount, currency)?;
    w.end(tag)?;
    Ok(())
}

fn write_line(
    w: &mut XmlWriter,
    tag: &str,
    qty_tag: &str,
    line: &Line,
    currency: &str,
) -> Result<(), ConversionError> {
    w.start(tag)?;
    w.opt_text("cbc:ID", line.id.as_deref())?;
    for note in &line.notes {
        w.text("cbc:Note", note)?;
    }
    if let Some(q) = &line.quantity {
        if let Some(value) = q.value {
            let value = crate::xml_utils::format_decimal(value);
            match &q.unit_code {
                Some(unit) => w.text_with_attrs(qty_tag, &value, &[("unitCode", unit.as_str())])?,
                None => w.text(qty_tag, &value)?,
            };
        }
    }
    write_opt_amount(w, "cbc:LineExtensionAmount", line.line_extension_amount, currency)?;
    if let Some(id) = &line.order_line_id {
        w.start("cac:OrderLineReference")?;
        w.text("cbc:LineID", id)?;
        w.end("cac:OrderLineReference")?;
    }
    for d in &line.deliveries {
        write_delivery(w, d)?;
    }
    for ac in &line.allowance_charges {
        write_allowance_charge(w, ac, currency)?;
    }
    for tt in &line.tax_totals {
        write_tax_total(w, tt, currency)?;
    }

    let item = &line.item;
    w.start("cac:Item")?;
    for desc in &item.descriptions {
        w.text("cbc:Description", desc)?;
    }
    w.opt_text("cbc:Name", item.name.as_deref())?;
    if let Some(id) = &item.buyers_item_id {
        w.start("cac:BuyersItemIdentification")?;
        w.text("cbc:ID", id)?;
        w.end("cac:BuyersItemIdentification")?;
    }
    if let Some(id) = &item.sellers_item_id {
        w.start("cac:SellersItemIdentification")?;
        w.text("cbc:ID", id)?;
        w.end("cac:SellersItemIdentification")?;
    }
    if let Some(id) = &item.standard_item_id {
        w.start("cac:StandardItemIdentification")?;
        write_schemed(w, "cbc:ID", id)?;
        w.end("cac:StandardItemIdentification")?;
    }
    for cat in &item.classified_tax_categories {
        write_tax_category(w, "cac:ClassifiedTaxCategory", cat)?;
    }
    w.end("cac:Item")?;

    if let Some(price) = &line.price {
        w.start("cac:Price")?;
        write_opt_amount(w, "cbc:PriceAmount", price.amount, currency)?;
        if let Some(bq) = price.base_quantity {
            w.decimal("cbc:BaseQuantity", bq)?;
        }
        w.end("cac:Price")?;
    }
    w.end(tag)?;
    Ok(())
}
