//! Convert a UBL invoice to ebInterface.
//!
//! Usage: `cargo run --example convert_invoice -- [invoice.xml] [4.0|4.1|4.2|4.3|5.0|6.0]`
//!
//! Without a file a built-in sample is converted. Set `RUST_LOG=debug`
//! to see the converter's log output.

use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
use ubl_ebinterface::ebinterface::{self, EbVersion};
use ubl_ebinterface::to_ebinterface::ToEbInterfaceConverter;
use ubl_ebinterface::ubl;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:UBLVersionID>2.1</cbc:UBLVersionID>
  <cbc:ID>RE-2024-0815</cbc:ID>
  <cbc:IssueDate>2024-06-15</cbc:IssueDate>
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
        <cbc:StreetName>Herrengasse 7</cbc:StreetName>
        <cbc:CityName>Graz</cbc:CityName>
        <cbc:PostalZone>8010</cbc:PostalZone>
        <cac:Country><cbc:IdentificationCode>AT</cbc:IdentificationCode></cac:Country>
      </cac:PostalAddress>
    </cac:Party>
  </cac:AccountingCustomerParty>
  <cac:PaymentMeans>
    <cbc:PaymentMeansCode>58</cbc:PaymentMeansCode>
    <cbc:PaymentID>RE-2024-0815</cbc:PaymentID>
    <cac:PayeeFinancialAccount>
      <cbc:ID>AT61 1904 3002 3457 3201</cbc:ID>
      <cac:FinancialInstitutionBranch><cbc:ID>BKAUATWW</cbc:ID></cac:FinancialInstitutionBranch>
    </cac:PayeeFinancialAccount>
  </cac:PaymentMeans>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="EUR">120.00</cbc:TaxAmount>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="EUR">600.00</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="EUR">120.00</cbc:TaxAmount>
      <cac:TaxCategory>
        <cbc:ID>S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:TaxCategory>
    </cac:TaxSubtotal>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:LineExtensionAmount currencyID="EUR">600.00</cbc:LineExtensionAmount>
    <cbc:TaxExclusiveAmount currencyID="EUR">600.00</cbc:TaxExclusiveAmount>
    <cbc:TaxInclusiveAmount currencyID="EUR">720.00</cbc:TaxInclusiveAmount>
    <cbc:PayableAmount currencyID="EUR">720.00</cbc:PayableAmount>
  </cac:LegalMonetaryTotal>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
    <cbc:InvoicedQuantity unitCode="HUR">5</cbc:InvoicedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">600.00</cbc:LineExtensionAmount>
    <cac:Item>
      <cbc:Name>Beratung</cbc:Name>
      <cac:ClassifiedTaxCategory>
        <cbc:ID>S</cbc:ID>
        <cbc:Percent>20</cbc:Percent>
        <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
      </cac:ClassifiedTaxCategory>
    </cac:Item>
    <cac:Price><cbc:PriceAmount currencyID="EUR">120.00</cbc:PriceAmount></cac:Price>
  </cac:InvoiceLine>
</Invoice>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let xml = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let version = match args.next() {
        Some(v) => EbVersion::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == v)
            .ok_or_else(|| format!("unsupported ebInterface version {v}"))?,
        None => EbVersion::LATEST,
    };

    let doc = ubl::from_ubl_xml(&xml)?;
    let converter =
        ToEbInterfaceConverter::new(version, Locale::German, ToEbInterfaceSettings::default());
    let mut errors = ErrorList::new();
    let result = converter.convert(&doc, &mut errors)?;

    for entry in &errors {
        eprintln!("{entry}");
    }
    match result {
        Some(invoice) => println!("{}", ebinterface::to_xml(&invoice)?),
        None => {
            eprintln!("=== Conversion failed with {} error(s) ===", errors.error_count());
            std::process::exit(1);
        }
    }
    Ok(())
}
