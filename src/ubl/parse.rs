use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::*;
use crate::core::ConversionError;
use crate::xml_utils::{XmlEvent, attr, parse_date, parse_decimal, walk_xml};

type Attrs = [(String, String)];

/// Parse a UBL 2.x Invoice or CreditNote XML string.
///
/// Elements are matched by local name, so any namespace prefix works.
/// Unknown elements are skipped. Malformed dates and decimals are errors.
pub fn from_ubl_xml(xml: &str) -> Result<Document, ConversionError> {
    let mut reader = UblReader::default();
    let mut last_attrs: Vec<(String, String)> = Vec::new();

    walk_xml(xml, |path, event| {
        let p: Vec<&str> = path.iter().map(String::as_str).collect();
        match event {
            XmlEvent::Start { attrs } => {
                if p.len() == 1 {
                    reader.doc.kind = match p[0] {
                        "Invoice" => DocumentKind::Invoice,
                        "CreditNote" => DocumentKind::CreditNote,
                        other => {
                            return Err(ConversionError::UnsupportedDocument(format!(
                                "root element <{other}> is neither Invoice nor CreditNote"
                            )));
                        }
                    };
                    reader.root_seen = true;
                }
                last_attrs = attrs.to_vec();
                reader.on_start(&p, attrs);
                Ok(())
            }
            XmlEvent::Text(text) => {
                let ctx = Ctx {
                    field: path.join("/"),
                    attrs: &last_attrs,
                    text,
                };
                reader.on_text(&p, &ctx)
            }
            XmlEvent::End => Ok(()),
        }
    })?;

    if !reader.root_seen {
        return Err(ConversionError::UnsupportedDocument("empty document".into()));
    }
    tracing::debug!(
        id = ?reader.doc.id,
        kind = ?reader.doc.kind,
        lines = reader.doc.lines.len(),
        "parsed UBL document"
    );
    Ok(reader.doc)
}

#[derive(Default)]
struct UblReader {
    doc: Document,
    root_seen: bool,
}

/// Text node with the attributes of its element.
struct Ctx<'a> {
    field: String,
    attrs: &'a Attrs,
    text: &'a str,
}

impl Ctx<'_> {
    fn string(&self) -> String {
        self.text.to_string()
    }

    fn some(&self) -> Option<String> {
        Some(self.string())
    }

    fn decimal(&self) -> Result<Option<Decimal>, ConversionError> {
        parse_decimal(&self.field, self.text).map(Some)
    }

    fn date(&self) -> Result<Option<NaiveDate>, ConversionError> {
        parse_date(&self.field, self.text).map(Some)
    }

    fn schemed(&self) -> SchemedId {
        SchemedId {
            scheme_id: attr(self.attrs, "schemeID").map(str::to_string),
            value: self.string(),
        }
    }

    fn boolean(&self) -> bool {
        self.text.trim().eq_ignore_ascii_case("true")
    }
}

/// Last element of `v`, pushing a default one if `v` is empty.
fn last<T: Default>(v: &mut Vec<T>) -> &mut T {
    if v.is_empty() {
        v.push(T::default());
    }
    let idx = v.len() - 1;
    &mut v[idx]
}

fn is_line(name: &str) -> bool {
    name == "InvoiceLine" || name == "CreditNoteLine"
}

impl UblReader {
    fn on_start(&mut self, p: &[&str], attrs: &Attrs) {
        let doc = &mut self.doc;
        match p {
            [_, "AccountingSupplierParty", "Party", rest @ ..] => {
                let party = doc
                    .supplier
                    .get_or_insert_with(Default::default)
                    .party
                    .get_or_insert_with(Default::default);
                party_start(party, rest);
            }
            [_, "AccountingCustomerParty", "Party", rest @ ..] => {
                let party = doc
                    .customer
                    .get_or_insert_with(Default::default)
                    .party
                    .get_or_insert_with(Default::default);
                party_start(party, rest);
            }
            [_, "BuyerCustomerParty", "Party", rest @ ..] => {
                party_start(doc.buyer_customer.get_or_insert_with(Default::default), rest);
            }
            [_, "PayeeParty", rest @ ..] => {
                party_start(doc.payee.get_or_insert_with(Default::default), rest);
            }
            [_, "Delivery"] => doc.deliveries.push(Delivery::default()),
            [_, "Delivery", rest @ ..] => delivery_start(last(&mut doc.deliveries), rest),
            [_, "PaymentMeans"] => doc.payment_means.push(PaymentMeans::default()),
            [_, "PaymentTerms"] => doc.payment_terms.push(PaymentTerms::default()),
            [_, "AllowanceCharge"] => doc.allowance_charges.push(AllowanceCharge::default()),
            [_, "AllowanceCharge", rest @ ..] => {
                allowance_charge_start(last(&mut doc.allowance_charges), rest)
            }
            [_, "TaxTotal"] => doc.tax_totals.push(TaxTotal::default()),
            [_, "TaxTotal", rest @ ..] => tax_total_start(last(&mut doc.tax_totals), rest),
            [_, line] if is_line(line) => doc.lines.push(Line::default()),
            [_, line, rest @ ..] if is_line(line) => line_start(last(&mut doc.lines), rest, attrs),
            _ => {}
        }
    }

    fn on_text(&mut self, p: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
        let doc = &mut self.doc;
        match p {
            [_, "UBLVersionID"] => doc.ubl_version_id = c.some(),
            [_, "CustomizationID"] => doc.customization_id = c.some(),
            [_, "ProfileID"] => doc.profile_id = c.some(),
            [_, "ID"] => doc.id = c.some(),
            [_, "IssueDate"] => doc.issue_date = c.date()?,
            [_, "DueDate"] => doc.due_date = c.date()?,
            [_, "InvoiceTypeCode" | "CreditNoteTypeCode"] => doc.type_code = c.some(),
            [_, "Note"] => doc.notes.push(c.string()),
            [_, "TaxPointDate"] => doc.tax_point_date = c.date()?,
            [_, "DocumentCurrencyCode"] => doc.document_currency_code = c.some(),
            [_, "BuyerReference"] => doc.buyer_reference = c.some(),
            [_, "InvoicePeriod", rest @ ..] => {
                period_text(doc.invoice_period.get_or_insert_with(Default::default), rest, c)?
            }
            [_, "OrderReference", "ID"] => {
                doc.order_reference.get_or_insert_with(Default::default).id = c.some()
            }
            [_, "OrderReference", "IssueDate"] => {
                doc.order_reference.get_or_insert_with(Default::default).issue_date = c.date()?
            }
            [_, "AccountingSupplierParty", "CustomerAssignedAccountID"] => {
                doc.supplier.get_or_insert_with(Default::default).assigned_account_id = c.some()
            }
            [_, "AccountingSupplierParty", "Party", rest @ ..] => {
                let party = doc
                    .supplier
                    .get_or_insert_with(Default::default)
                    .party
                    .get_or_insert_with(Default::default);
                party_text(party, rest, c)?
            }
            [_, "AccountingCustomerParty", "SupplierAssignedAccountID"] => {
                doc.customer.get_or_insert_with(Default::default).assigned_account_id = c.some()
            }
            [_, "AccountingCustomerParty", "Party", rest @ ..] => {
                let party = doc
                    .customer
                    .get_or_insert_with(Default::default)
                    .party
                    .get_or_insert_with(Default::default);
                party_text(party, rest, c)?
            }
            [_, "BuyerCustomerParty", "Party", rest @ ..] => {
                party_text(doc.buyer_customer.get_or_insert_with(Default::default), rest, c)?
            }
            [_, "PayeeParty", rest @ ..] => {
                party_text(doc.payee.get_or_insert_with(Default::default), rest, c)?
            }
            [_, "Delivery", rest @ ..] => delivery_text(last(&mut doc.deliveries), rest, c)?,
            [_, "PaymentMeans", rest @ ..] => {
                payment_means_text(last(&mut doc.payment_means), rest, c)?
            }
            [_, "PaymentTerms", rest @ ..] => {
                payment_terms_text(last(&mut doc.payment_terms), rest, c)?
            }
            [_, "AllowanceCharge", rest @ ..] => {
                allowance_charge_text(last(&mut doc.allowance_charges), rest, c)?
            }
            [_, "TaxTotal", rest @ ..] => tax_total_text(last(&mut doc.tax_totals), rest, c)?,
            [_, "LegalMonetaryTotal" | "RequestedMonetaryTotal", rest @ ..] => {
                monetary_total_text(&mut doc.monetary_total, rest, c)?
            }
            [_, line, rest @ ..] if is_line(line) => line_text(last(&mut doc.lines), rest, c)?,
            _ => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared aggregates
// ---------------------------------------------------------------------------

fn party_start(party: &mut Party, rest: &[&str]) {
    match rest {
        ["PartyTaxScheme"] => party.tax_schemes.push(PartyTaxScheme::default()),
        ["PartyLegalEntity"] => party.legal_entities.push(PartyLegalEntity::default()),
        _ => {}
    }
}

fn party_text(party: &mut Party, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["EndpointID"] => party.endpoint_id = Some(c.schemed()),
        ["PartyIdentification", "ID"] => party.identifications.push(c.schemed()),
        ["PartyName", "Name"] => party.names.push(c.string()),
        ["PostalAddress", rest @ ..] => {
            address_text(party.postal_address.get_or_insert_with(Default::default), rest, c)
        }
        ["PartyTaxScheme", "CompanyID"] => last(&mut party.tax_schemes).company_id = c.some(),
        ["PartyTaxScheme", "TaxScheme", "ID"] => {
            last(&mut party.tax_schemes).tax_scheme_id = Some(c.schemed())
        }
        ["PartyLegalEntity", "RegistrationName"] => {
            last(&mut party.legal_entities).registration_name = c.some()
        }
        ["PartyLegalEntity", "CompanyID"] => {
            last(&mut party.legal_entities).company_id = Some(c.schemed())
        }
        ["Contact", field] => {
            let contact = party.contact.get_or_insert_with(Default::default);
            match *field {
                "Name" => contact.name = c.some(),
                "Telephone" => contact.telephone = c.some(),
                "ElectronicMail" => contact.email = c.some(),
                _ => {}
            }
        }
        ["Person", field] => {
            let person = party.person.get_or_insert_with(Default::default);
            match *field {
                "FirstName" => person.first_name = c.some(),
                "MiddleName" => person.middle_name = c.some(),
                "FamilyName" => person.family_name = c.some(),
                _ => {}
            }
        }
        _ => {}
    }
    Ok(())
}

fn address_text(addr: &mut Address, rest: &[&str], c: &Ctx<'_>) {
    match rest {
        ["StreetName"] => addr.street_name = c.some(),
        ["AdditionalStreetName"] => addr.additional_street_name = c.some(),
        ["BuildingNumber"] => addr.building_number = c.some(),
        ["CityName"] => addr.city_name = c.some(),
        ["PostalZone"] => addr.postal_zone = c.some(),
        ["CountrySubentity"] => addr.country_subentity = c.some(),
        ["AddressLine", "Line"] => addr.address_lines.push(c.string()),
        ["Country", "IdentificationCode"] => {
            addr.country.get_or_insert_with(Default::default).code = c.some()
        }
        ["Country", "Name"] => addr.country.get_or_insert_with(Default::default).name = c.some(),
        _ => {}
    }
}

fn period_text(period: &mut Period, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["StartDate"] => period.start_date = c.date()?,
        ["EndDate"] => period.end_date = c.date()?,
        _ => {}
    }
    Ok(())
}

fn delivery_start(delivery: &mut Delivery, rest: &[&str]) {
    if let ["DeliveryParty", rest @ ..] = rest {
        party_start(delivery.party.get_or_insert_with(Default::default), rest);
    }
}

fn delivery_text(
    delivery: &mut Delivery,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["ActualDeliveryDate"] => delivery.actual_delivery_date = c.date()?,
        ["DeliveryLocation", "Address", rest @ ..] => {
            address_text(delivery.address.get_or_insert_with(Default::default), rest, c)
        }
        ["DeliveryParty", rest @ ..] => {
            party_text(delivery.party.get_or_insert_with(Default::default), rest, c)?
        }
        _ => {}
    }
    Ok(())
}

fn tax_category_text(
    cat: &mut TaxCategory,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["ID"] => cat.id = Some(c.schemed()),
        ["Percent"] => cat.percent = c.decimal()?,
        ["TaxExemptionReasonCode"] => cat.exemption_reason_code = c.some(),
        ["TaxExemptionReason"] => cat.exemption_reasons.push(c.string()),
        ["TaxScheme", "ID"] => cat.tax_scheme_id = Some(c.schemed()),
        _ => {}
    }
    Ok(())
}

fn allowance_charge_start(ac: &mut AllowanceCharge, rest: &[&str]) {
    if let ["TaxCategory"] = rest {
        ac.tax_categories.push(TaxCategory::default());
    }
}

fn allowance_charge_text(
    ac: &mut AllowanceCharge,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["ChargeIndicator"] => ac.charge_indicator = c.boolean(),
        ["AllowanceChargeReasonCode"] => ac.reason_code = c.some(),
        ["AllowanceChargeReason"] => ac.reasons.push(c.string()),
        ["MultiplierFactorNumeric"] => ac.multiplier_factor = c.decimal()?,
        ["Amount"] => ac.amount = c.decimal()?,
        ["BaseAmount"] => ac.base_amount = c.decimal()?,
        ["TaxCategory", rest @ ..] => tax_category_text(last(&mut ac.tax_categories), rest, c)?,
        _ => {}
    }
    Ok(())
}

fn tax_total_start(total: &mut TaxTotal, rest: &[&str]) {
    if let ["TaxSubtotal"] = rest {
        total.subtotals.push(TaxSubtotal::default());
    }
}

fn tax_total_text(total: &mut TaxTotal, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["TaxAmount"] => total.tax_amount = c.decimal()?,
        ["TaxSubtotal", "TaxableAmount"] => {
            last(&mut total.subtotals).taxable_amount = c.decimal()?
        }
        ["TaxSubtotal", "TaxAmount"] => last(&mut total.subtotals).tax_amount = c.decimal()?,
        ["TaxSubtotal", "Percent"] => last(&mut total.subtotals).percent = c.decimal()?,
        ["TaxSubtotal", "TaxCategory", rest @ ..] => {
            tax_category_text(&mut last(&mut total.subtotals).category, rest, c)?
        }
        _ => {}
    }
    Ok(())
}

fn monetary_total_text(
    total: &mut MonetaryTotal,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    let slot = match rest {
        ["LineExtensionAmount"] => &mut total.line_extension_amount,
        ["TaxExclusiveAmount"] => &mut total.tax_exclusive_amount,
        ["TaxInclusiveAmount"] => &mut total.tax_inclusive_amount,
        ["AllowanceTotalAmount"] => &mut total.allowance_total_amount,
        ["ChargeTotalAmount"] => &mut total.charge_total_amount,
        ["PrepaidAmount"] => &mut total.prepaid_amount,
        ["PayableRoundingAmount"] => &mut total.payable_rounding_amount,
        ["PayableAmount"] => &mut total.payable_amount,
        _ => return Ok(()),
    };
    *slot = c.decimal()?;
    Ok(())
}

fn payment_means_text(
    pm: &mut PaymentMeans,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["PaymentMeansCode"] => pm.code = c.some(),
        ["PaymentDueDate"] => pm.due_date = c.date()?,
        ["InstructionNote"] => pm.instruction_notes.push(c.string()),
        ["PaymentID"] => pm.payment_ids.push(c.string()),
        ["PayeeFinancialAccount", rest @ ..] => {
            let account = pm.payee_account.get_or_insert_with(Default::default);
            match rest {
                ["ID"] => account.id = Some(c.schemed()),
                ["Name"] => account.name = c.some(),
                ["FinancialInstitutionBranch", "ID"] => account.branch_id = c.some(),
                ["FinancialInstitutionBranch", "FinancialInstitution", "ID"] => {
                    account.institution_id = c.some()
                }
                _ => {}
            }
        }
        ["PaymentMandate", "ID"] => pm.mandate_id = c.some(),
        ["PaymentMandate", "PayerFinancialAccount", "ID"] => pm.payer_account_id = c.some(),
        _ => {}
    }
    Ok(())
}

fn payment_terms_text(
    pt: &mut PaymentTerms,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["Note"] => pt.notes.push(c.string()),
        ["PaymentDueDate"] => pt.payment_due_date = c.date()?,
        ["SettlementDiscountPercent"] => pt.settlement_discount_percent = c.decimal()?,
        ["SettlementDiscountAmount"] => pt.settlement_discount_amount = c.decimal()?,
        ["PenaltySurchargePercent"] => pt.penalty_surcharge_percent = c.decimal()?,
        ["PenaltyAmount"] => pt.penalty_amount = c.decimal()?,
        ["SettlementPeriod", rest @ ..] => {
            period_text(pt.settlement_period.get_or_insert_with(Default::default), rest, c)?
        }
        ["PenaltyPeriod", rest @ ..] => {
            period_text(pt.penalty_period.get_or_insert_with(Default::default), rest, c)?
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

fn line_start(line: &mut Line, rest: &[&str], attrs: &Attrs) {
    match rest {
        ["InvoicedQuantity" | "CreditedQuantity"] => {
            line.quantity = Some(Quantity {
                value: None,
                unit_code: attr(attrs, "unitCode").map(str::to_string),
            });
        }
        ["Delivery"] => line.deliveries.push(Delivery::default()),
        ["Delivery", rest @ ..] => delivery_start(last(&mut line.deliveries), rest),
        ["AllowanceCharge"] => line.allowance_charges.push(AllowanceCharge::default()),
        ["AllowanceCharge", rest @ ..] => {
            allowance_charge_start(last(&mut line.allowance_charges), rest)
        }
        ["TaxTotal"] => line.tax_totals.push(TaxTotal::default()),
        ["TaxTotal", rest @ ..] => tax_total_start(last(&mut line.tax_totals), rest),
        ["Item", "ClassifiedTaxCategory"] => {
            line.item.classified_tax_categories.push(TaxCategory::default())
        }
        _ => {}
    }
}

fn line_text(line: &mut Line, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["ID"] => line.id = c.some(),
        ["Note"] => line.notes.push(c.string()),
        ["InvoicedQuantity" | "CreditedQuantity"] => {
            let qty = line.quantity.get_or_insert_with(Default::default);
            qty.value = c.decimal()?;
            if qty.unit_code.is_none() {
                qty.unit_code = attr(c.attrs, "unitCode").map(str::to_string);
            }
        }
        ["LineExtensionAmount"] => line.line_extension_amount = c.decimal()?,
        ["OrderLineReference", "LineID"] => line.order_line_id = c.some(),
        ["Delivery", rest @ ..] => delivery_text(last(&mut line.deliveries), rest, c)?,
        ["AllowanceCharge", rest @ ..] => {
            allowance_charge_text(last(&mut line.allowance_charges), rest, c)?
        }
        ["TaxTotal", rest @ ..] => tax_total_text(last(&mut line.tax_totals), rest, c)?,
        ["Item", "Name"] => line.item.name = c.some(),
        ["Item", "Description"] => line.item.descriptions.push(c.string()),
        ["Item", "SellersItemIdentification", "ID"] => line.item.sellers_item_id = c.some(),
        ["Item", "BuyersItemIdentification", "ID"] => line.item.buyers_item_id = c.some(),
        ["Item", "StandardItemIdentification", "ID"] => {
            line.item.standard_item_id = Some(c.schemed())
        }
        ["Item", "ClassifiedTaxCategory", rest @ ..] => {
            tax_category_text(last(&mut line.item.classified_tax_categories), rest, c)?
        }
        ["Price", "PriceAmount"] => {
            line.price.get_or_insert_with(Default::default).amount = c.decimal()?
        }
        ["Price", "BaseQuantity"] => {
            line.price.get_or_insert_with(Default::default).base_quantity = c.decimal()?
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:UBLVersionID>2.1</cbc:UBLVersionID>
  <cbc:ID>INV1</cbc:ID>
  <cbc:IssueDate>2024-01-01</cbc:IssueDate>
  <cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>
  <cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>
  <cac:AccountingSupplierParty>
    <cbc:CustomerAssignedAccountID>S-1</cbc:CustomerAssignedAccountID>
    <cac:Party>
      <cbc:EndpointID schemeID="0088">9100000000001</cbc:EndpointID>
      <cac:PartyName><cbc:Name>Lieferant GmbH</cbc:Name></cac:PartyName>
      <cac:PostalAddress>
        <cbc:StreetName>Hauptstraße</cbc:StreetName>
        <cbc:BuildingNumber>1</cbc:BuildingNumber>
        <cbc:CityName>Wien</cbc:CityName>
        <cbc:PostalZone>1010</cbc:PostalZone>
        <cac:Country><cbc:IdentificationCode>AT</cbc:IdentificationCode></cac:Country>
      </cac:PostalAddress>
      <cac:PartyTaxScheme>
        <cbc:CompanyID>ATU12345678</cbc:CompanyID>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:PartyTaxScheme>
    </cac:Party>
  </cac:AccountingSupplierParty>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="EUR">20.00</cbc:TaxAmount>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="EUR">100.00</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="EUR">20.00</cbc:TaxAmount>
      <cac:TaxCategory>
        <cbc:ID schemeID="UNCL5305">S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:TaxCategory>
    </cac:TaxSubtotal>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:PayableAmount currencyID="EUR">120.00</cbc:PayableAmount>
  </cac:LegalMonetaryTotal>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
    <cbc:InvoicedQuantity unitCode="C62">2</cbc:InvoicedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">100.00</cbc:LineExtensionAmount>
    <cac:AllowanceCharge>
      <cbc:ChargeIndicator>false</cbc:ChargeIndicator>
      <cbc:Amount currencyID="EUR">5.00</cbc:Amount>
    </cac:AllowanceCharge>
    <cac:Item>
      <cbc:Name>Widget</cbc:Name>
      <cac:ClassifiedTaxCategory>
        <cbc:ID>S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:ClassifiedTaxCategory>
    </cac:Item>
    <cac:Price>
      <cbc:PriceAmount currencyID="EUR">52.50</cbc:PriceAmount>
      <cac:AllowanceCharge>
        <cbc:ChargeIndicator>false</cbc:ChargeIndicator>
        <cbc:Amount currencyID="EUR">1.00</cbc:Amount>
      </cac:AllowanceCharge>
    </cac:Price>
  </cac:InvoiceLine>
</Invoice>"#;

    #[test]
    fn parses_header_and_party() {
        let doc = from_ubl_xml(MINIMAL).unwrap();
        assert_eq!(doc.kind, DocumentKind::Invoice);
        assert_eq!(doc.ubl_version_id.as_deref(), Some("2.1"));
        assert_eq!(doc.id.as_deref(), Some("INV1"));
        assert_eq!(doc.issue_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(doc.type_code.as_deref(), Some("380"));

        let supplier = doc.supplier.as_ref().unwrap();
        assert_eq!(supplier.assigned_account_id.as_deref(), Some("S-1"));
        let party = supplier.party.as_ref().unwrap();
        assert_eq!(party.display_name(), Some("Lieferant GmbH"));
        assert_eq!(
            party.endpoint_id,
            Some(SchemedId::with_scheme("0088", "9100000000001"))
        );
        let addr = party.postal_address.as_ref().unwrap();
        assert_eq!(addr.building_number.as_deref(), Some("1"));
        assert_eq!(
            addr.country.as_ref().unwrap().code.as_deref(),
            Some("AT")
        );
        assert_eq!(party.tax_schemes[0].company_id.as_deref(), Some("ATU12345678"));
    }

    #[test]
    fn parses_tax_totals_and_lines() {
        let doc = from_ubl_xml(MINIMAL).unwrap();
        let sub = &doc.tax_totals[0].subtotals[0];
        assert_eq!(sub.taxable_amount, Some(dec!(100.00)));
        assert_eq!(sub.category.percent, Some(dec!(20)));
        assert_eq!(
            sub.category.id,
            Some(SchemedId::with_scheme("UNCL5305", "S"))
        );
        assert_eq!(doc.monetary_total.payable_amount, Some(dec!(120.00)));

        let line = &doc.lines[0];
        assert_eq!(line.id.as_deref(), Some("1"));
        let qty = line.quantity.as_ref().unwrap();
        assert_eq!(qty.value, Some(dec!(2)));
        assert_eq!(qty.unit_code.as_deref(), Some("C62"));
        // Price-level allowance is not a line allowance
        assert_eq!(line.allowance_charges.len(), 1);
        assert_eq!(line.allowance_charges[0].amount, Some(dec!(5.00)));
        assert_eq!(line.item.classified_tax_categories.len(), 1);
        assert_eq!(line.price.as_ref().unwrap().amount, Some(dec!(52.50)));
    }

    #[test]
    fn credit_note_root() {
        let xml = r#"<CreditNote xmlns="urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2"
            xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"
            xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2">
            <cbc:ID>CN-1</cbc:ID>
            <cbc:CreditNoteTypeCode>381</cbc:CreditNoteTypeCode>
            <cac:CreditNoteLine>
                <cbc:ID>1</cbc:ID>
                <cbc:CreditedQuantity unitCode="HUR">3</cbc:CreditedQuantity>
            </cac:CreditNoteLine>
        </CreditNote>"#;
        let doc = from_ubl_xml(xml).unwrap();
        assert_eq!(doc.kind, DocumentKind::CreditNote);
        assert_eq!(doc.type_code.as_deref(), Some("381"));
        let qty = doc.lines[0].quantity.as_ref().unwrap();
        assert_eq!(qty.value, Some(dec!(3)));
        assert_eq!(qty.unit_code.as_deref(), Some("HUR"));
    }

    #[test]
    fn rejects_foreign_root() {
        let err = from_ubl_xml("<Order><ID>1</ID></Order>").unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedDocument(_)));
    }

    #[test]
    fn rejects_malformed_date() {
        let xml = r#"<Invoice><IssueDate>01.01.2024</IssueDate></Invoice>"#;
        let err = from_ubl_xml(xml).unwrap_err();
        assert!(err.to_string().contains("Invoice/IssueDate"));
    }
}
