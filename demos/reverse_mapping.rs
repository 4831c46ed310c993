//! Read an ebInterface invoice and write it as UBL 2.1.
//!
//! Usage: `cargo run --example reverse_mapping -- invoice.xml`
//!
//! Without a file the demo first produces an ebInterface 4.3 invoice
//! from an in-memory UBL document, then maps it back.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
use ubl_ebinterface::ebinterface::{self, EbVersion};
use ubl_ebinterface::to_ebinterface::ToEbInterfaceConverter;
use ubl_ebinterface::to_ubl::ToUblConverter;
use ubl_ebinterface::ubl::{self, *};

fn party(name: &str, city: &str, zip: &str, vat_id: &str) -> Party {
    Party {
        names: vec![name.into()],
        postal_address: Some(Address {
            street_name: Some("Ring".into()),
            building_number: Some("3".into()),
            city_name: Some(city.into()),
            postal_zone: Some(zip.into()),
            country: Some(Country {
                code: Some("AT".into()),
                name: None,
            }),
            ..Default::default()
        }),
        tax_schemes: vec![PartyTaxScheme {
            company_id: Some(vat_id.into()),
            tax_scheme_id: Some(SchemedId::new("VAT")),
        }],
        ..Default::default()
    }
}

fn sample_ebinterface() -> Result<String, Box<dyn std::error::Error>> {
    let category = TaxCategory {
        id: Some(SchemedId::new("S")),
        percent: Some(dec!(10)),
        tax_scheme_id: Some(SchemedId::new("VAT")),
        ..Default::default()
    };
    let doc = Document {
        id: Some("RE-4711".into()),
        issue_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        type_code: Some("380".into()),
        document_currency_code: Some("EUR".into()),
        supplier: Some(AccountingParty {
            assigned_account_id: None,
            party: Some(party("Buchhandlung Huber", "Salzburg", "5020", "ATU55555555")),
        }),
        customer: Some(AccountingParty {
            assigned_account_id: None,
            party: Some(party("Bibliothek Linz", "Linz", "4020", "ATU66666666")),
        }),
        tax_totals: vec![TaxTotal {
            tax_amount: Some(dec!(8)),
            subtotals: vec![TaxSubtotal {
                taxable_amount: Some(dec!(80)),
                tax_amount: Some(dec!(8)),
                percent: None,
                category: category.clone(),
            }],
        }],
        monetary_total: MonetaryTotal {
            tax_exclusive_amount: Some(dec!(80)),
            tax_inclusive_amount: Some(dec!(88)),
            payable_amount: Some(dec!(88)),
            ..Default::default()
        },
        lines: vec![Line {
            id: Some("1".into()),
            quantity: Some(Quantity {
                value: Some(dec!(4)),
                unit_code: Some("C62".into()),
            }),
            line_extension_amount: Some(dec!(80)),
            item: Item {
                name: Some("Fachbuch".into()),
                classified_tax_categories: vec![category],
                ..Default::default()
            },
            price: Some(Price {
                amount: Some(dec!(20)),
                base_quantity: None,
            }),
            ..Default::default()
        }],
        ..Default::default()
    };

    let mut errors = ErrorList::new();
    let invoice = ToEbInterfaceConverter::new(
        EbVersion::V4_3,
        Locale::English,
        ToEbInterfaceSettings::default(),
    )
    .convert(&doc, &mut errors)?
    .ok_or("sample document did not convert")?;
    Ok(ebinterface::to_xml(&invoice)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let xml = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => sample_ebinterface()?,
    };

    let invoice = ebinterface::from_xml(&xml)?;
    println!("=== ebInterface {} ===", invoice.version);
    println!("  Number: {}", invoice.invoice_number);
    println!("  Biller: {}", invoice.biller.address.name);
    println!("  Gross:  {} {}", invoice.total_gross_amount, invoice.currency);

    let mut errors = ErrorList::new();
    let doc = ToUblConverter::new(Locale::English)
        .convert(&invoice, &mut errors)?
        .ok_or("reverse mapping produced no document")?;
    for entry in &errors {
        eprintln!("{entry}");
    }

    println!("\n=== UBL {} ===", doc.kind.root_name());
    println!("{}", ubl::to_ubl_xml(&doc)?);
    Ok(())
}
