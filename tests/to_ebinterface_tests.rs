#![cfg(feature = "xml")]

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use ubl_ebinterface::core::{ErrorLevel, ErrorList, Locale, Text, ToEbInterfaceSettings};
use ubl_ebinterface::ebinterface::{self, DocumentType, EbVersion, PaymentKind};
use ubl_ebinterface::to_ebinterface::{ToEbInterfaceConverter, UNKNOWN_VAT_ID};
use ubl_ebinterface::ubl;
use ubl_ebinterface::ConversionError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:UBLVersionID>2.1</cbc:UBLVersionID>"#;

const BODY: &str = r#"
  <cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>
  <cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>
  <cac:AccountingSupplierParty>
    <cac:Party>
      <cac:PartyName><cbc:Name>Lieferant GmbH</cbc:Name></cac:PartyName>
      <cac:PostalAddress>
        <cbc:StreetName>Hauptstraße 1</cbc:StreetName>
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
  <cac:AccountingCustomerParty>
    <cac:Party>
      <cac:PartyName><cbc:Name>Kunde AG</cbc:Name></cac:PartyName>
      <cac:PostalAddress>
        <cbc:StreetName>Ring 5</cbc:StreetName>
        <cbc:CityName>Graz</cbc:CityName>
        <cbc:PostalZone>8010</cbc:PostalZone>
        <cac:Country><cbc:IdentificationCode>AT</cbc:IdentificationCode></cac:Country>
      </cac:PostalAddress>
      <cac:PartyTaxScheme>
        <cbc:CompanyID>ATU87654321</cbc:CompanyID>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:PartyTaxScheme>
    </cac:Party>
  </cac:AccountingCustomerParty>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="EUR">20.00</cbc:TaxAmount>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="EUR">100.00</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="EUR">20.00</cbc:TaxAmount>
      <cac:TaxCategory>
        <cbc:ID>S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:TaxCategory>
    </cac:TaxSubtotal>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:LineExtensionAmount currencyID="EUR">100.00</cbc:LineExtensionAmount>
    <cbc:TaxExclusiveAmount currencyID="EUR">100.00</cbc:TaxExclusiveAmount>
    <cbc:TaxInclusiveAmount currencyID="EUR">120.00</cbc:TaxInclusiveAmount>
    <cbc:PayableAmount currencyID="EUR">120.00</cbc:PayableAmount>
  </cac:LegalMonetaryTotal>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
    <cbc:InvoicedQuantity unitCode="C62">1</cbc:InvoicedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">100.00</cbc:LineExtensionAmount>
    <cac:Item>
      <cbc:Name>Beratung</cbc:Name>
      <cac:ClassifiedTaxCategory>
        <cbc:ID>S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:ClassifiedTaxCategory>
    </cac:Item>
    <cac:Price><cbc:PriceAmount currencyID="EUR">100.00</cbc:PriceAmount></cac:Price>
  </cac:InvoiceLine>
</Invoice>"#;

fn minimal_invoice_xml() -> String {
    format!(
        "{HEADER}\n  <cbc:ID>INV1</cbc:ID>\n  <cbc:IssueDate>2024-01-01</cbc:IssueDate>{BODY}"
    )
}

fn converter(version: EbVersion) -> ToEbInterfaceConverter {
    ToEbInterfaceConverter::new(version, Locale::English, ToEbInterfaceSettings::default())
}

#[test]
fn minimal_invoice_converts_without_errors() {
    let doc = ubl::from_ubl_xml(&minimal_invoice_xml()).unwrap();
    let mut errors = ErrorList::new();
    let inv = converter(EbVersion::V6_0)
        .convert(&doc, &mut errors)
        .unwrap()
        .expect("no ERROR expected");

    assert!(!errors.contains_errors(), "{errors:?}");
    assert_eq!(inv.invoice_number, "INV1");
    assert_eq!(inv.invoice_date, date(2024, 1, 1));
    assert_eq!(inv.document_type, DocumentType::Invoice);
    assert_eq!(inv.currency, "EUR");
    assert_eq!(inv.biller.vat_id, "ATU12345678");
    assert_eq!(inv.invoice_recipient.address.town, "Graz");

    assert_eq!(inv.tax.items.len(), 1);
    assert_eq!(inv.tax.items[0].taxable_amount, dec!(100.00));
    assert_eq!(inv.tax.items[0].tax_amount, dec!(20.00));
    assert_eq!(inv.tax.items[0].rate.percent, dec!(20));
    assert_eq!(inv.total_gross_amount, dec!(120.00));
    assert_eq!(inv.payable_amount, Some(dec!(120.00)));
    assert_eq!(inv.net_amount, Some(dec!(100.00)));

    assert_eq!(inv.details.len(), 1);
    assert_eq!(inv.details[0].position_number, 1);
    assert_eq!(inv.details[0].descriptions, vec!["Beratung".to_string()]);
    assert_eq!(
        inv.payment_method.as_ref().map(|p| &p.kind),
        Some(&PaymentKind::NoPayment)
    );
}

#[test]
fn converted_invoice_serializes_for_every_version() {
    let doc = ubl::from_ubl_xml(&minimal_invoice_xml()).unwrap();
    for version in EbVersion::ALL {
        let mut errors = ErrorList::new();
        let inv = converter(version).convert(&doc, &mut errors).unwrap().unwrap();
        let xml = ebinterface::to_xml(&inv).unwrap();
        assert!(xml.contains(version.namespace()), "{version}");
        assert!(xml.contains("<InvoiceNumber>INV1</InvoiceNumber>"));
        assert!(xml.contains("<TotalGrossAmount>120.00</TotalGrossAmount>"));
        if version.uses_tax_items() {
            assert!(xml.contains("<TaxItem>"), "{version}");
        } else {
            assert!(xml.contains("<VAT>"), "{version}");
        }
    }
}

#[test]
fn missing_number_and_date_gives_exactly_two_errors() {
    let xml = format!("{HEADER}{BODY}");
    let doc = ubl::from_ubl_xml(&xml).unwrap();
    let mut errors = ErrorList::new();
    let result = converter(EbVersion::V6_0).convert(&doc, &mut errors).unwrap();

    assert!(result.is_none());
    assert_eq!(errors.error_count(), 2, "{errors:?}");
    assert!(errors.contains_text(Text::MissingInvoiceNumber));
    assert!(errors.contains_text(Text::MissingInvoiceDate));
}

#[test]
fn messages_follow_locale() {
    let doc = ubl::from_ubl_xml(&format!("{HEADER}{BODY}")).unwrap();
    let mut errors = ErrorList::new();
    ToEbInterfaceConverter::new(EbVersion::V6_0, Locale::German, Default::default())
        .convert(&doc, &mut errors)
        .unwrap();
    let entry = errors.errors().next().unwrap();
    assert_eq!(entry.level, ErrorLevel::Error);
    assert_eq!(entry.field, "ID");
    assert_eq!(entry.message, Text::MissingInvoiceNumber.format(Locale::German, &[]));
}

#[test]
fn credit_note_becomes_credit_memo() {
    let xml = minimal_invoice_xml()
        .replace("Invoice-2", "CreditNote-2")
        .replace("<Invoice ", "<CreditNote ")
        .replace("</Invoice>", "</CreditNote>")
        .replace(
            "InvoiceTypeCode>380</cbc:InvoiceTypeCode",
            "CreditNoteTypeCode>381</cbc:CreditNoteTypeCode",
        )
        .replace("InvoiceLine>", "CreditNoteLine>")
        .replace("InvoicedQuantity", "CreditedQuantity");
    let doc = ubl::from_ubl_xml(&xml).unwrap();
    assert_eq!(doc.kind, ubl::DocumentKind::CreditNote);

    let mut errors = ErrorList::new();
    let conv = converter(EbVersion::V5_0);
    let inv = conv.convert_credit_note(&doc, &mut errors).unwrap().unwrap();
    assert_eq!(inv.document_type, DocumentType::CreditMemo);
    assert_eq!(inv.details.len(), 1);

    let err = conv.convert_invoice(&doc, &mut ErrorList::new()).unwrap_err();
    assert!(matches!(err, ConversionError::Precondition(_)));
}

#[test]
fn missing_vat_ids_use_placeholder_with_warning() {
    let xml = minimal_invoice_xml()
        .replace("<cbc:CompanyID>ATU12345678</cbc:CompanyID>", "")
        .replace("<cbc:CompanyID>ATU87654321</cbc:CompanyID>", "");
    let doc = ubl::from_ubl_xml(&xml).unwrap();
    let mut errors = ErrorList::new();
    let inv = converter(EbVersion::V6_0).convert(&doc, &mut errors).unwrap().unwrap();

    assert_eq!(inv.biller.vat_id, UNKNOWN_VAT_ID);
    assert_eq!(inv.invoice_recipient.vat_id, UNKNOWN_VAT_ID);
    assert_eq!(errors.warning_count(), 2);
    assert!(errors.contains_text(Text::MissingBillerVatId));
    assert!(errors.contains_text(Text::MissingRecipientVatId));
}

#[test]
fn federal_government_settings_add_errors() {
    let doc = ubl::from_ubl_xml(&minimal_invoice_xml()).unwrap();
    let mut errors = ErrorList::new();
    let conv = ToEbInterfaceConverter::new(
        EbVersion::V6_0,
        Locale::English,
        ToEbInterfaceSettings::federal_government(),
    );
    assert!(conv.convert(&doc, &mut errors).unwrap().is_none());
    assert!(errors.contains_text(Text::MissingOrderReferenceId));
    assert!(errors.contains_text(Text::MissingInvoiceRecipientsBillerId));
    assert!(errors.contains_text(Text::MissingDeliveryDate));
}

#[test]
fn settings_load_from_json() {
    let settings = ToEbInterfaceSettings::from_json(
        r#"{ "order_reference_id_mandatory": true, "order_reference_id_max_length": 3 }"#,
    )
    .unwrap();
    let xml = minimal_invoice_xml().replace(
        "<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>",
        "<cbc:DocumentCurrencyCode>EUR</cbc:DocumentCurrencyCode>\n  \
         <cac:OrderReference><cbc:ID>PO-12345</cbc:ID></cac:OrderReference>",
    );
    let doc = ubl::from_ubl_xml(&xml).unwrap();
    let mut errors = ErrorList::new();
    ToEbInterfaceConverter::new(EbVersion::V6_0, Locale::English, settings)
        .convert(&doc, &mut errors)
        .unwrap();
    assert_eq!(errors.error_count(), 1);
    assert!(errors.contains_text(Text::OrderReferenceIdTooLong));
}

#[test]
fn invalid_currency_is_error() {
    let xml = minimal_invoice_xml().replace(
        ">EUR</cbc:DocumentCurrencyCode>",
        ">EURO</cbc:DocumentCurrencyCode>",
    );
    let doc = ubl::from_ubl_xml(&xml).unwrap();
    let mut errors = ErrorList::new();
    assert!(converter(EbVersion::V6_0).convert(&doc, &mut errors).unwrap().is_none());
    assert!(errors.contains_text(Text::InvalidCurrency));
}
