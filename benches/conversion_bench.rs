use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
use ubl_ebinterface::ebinterface::{self, EbVersion};
use ubl_ebinterface::to_ebinterface::ToEbInterfaceConverter;
use ubl_ebinterface::to_ubl::ToUblConverter;
use ubl_ebinterface::ubl::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn party(name: &str, vat_id: &str, city: &str, zip: &str) -> Party {
    Party {
        names: vec![name.into()],
        postal_address: Some(Address {
            street_name: Some("Hauptstraße".into()),
            building_number: Some("1".into()),
            city_name: Some(city.into()),
            postal_zone: Some(zip.into()),
            country: Some(Country {
                code: Some("AT".into()),
                name: Some("Österreich".into()),
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

fn vat_20() -> TaxCategory {
    TaxCategory {
        id: Some(SchemedId::new("S")),
        percent: Some(dec!(20)),
        tax_scheme_id: Some(SchemedId::new("VAT")),
        ..Default::default()
    }
}

fn build_document(lines: usize) -> Document {
    let line_amount = dec!(600);
    let net = line_amount * Decimal::from(lines as u64);
    let tax = net * dec!(0.2);
    Document {
        kind: DocumentKind::Invoice,
        ubl_version_id: Some("2.1".into()),
        id: Some("BENCH-001".into()),
        issue_date: Some(test_date()),
        due_date: Some(test_date() + chrono::Days::new(30)),
        type_code: Some("380".into()),
        document_currency_code: Some("EUR".into()),
        supplier: Some(AccountingParty {
            assigned_account_id: None,
            party: Some(party("Benchmark GmbH", "ATU12345678", "Wien", "1010")),
        }),
        customer: Some(AccountingParty {
            assigned_account_id: None,
            party: Some(party("Kunde AG", "ATU87654321", "Graz", "8010")),
        }),
        payment_means: vec![PaymentMeans {
            code: Some("58".into()),
            payment_ids: vec!["BENCH-001".into()],
            payee_account: Some(FinancialAccount {
                id: Some(SchemedId::new("AT611904300234573201")),
                branch_id: Some("BKAUATWW".into()),
                ..Default::default()
            }),
            ..Default::default()
        }],
        tax_totals: vec![TaxTotal {
            tax_amount: Some(tax),
            subtotals: vec![TaxSubtotal {
                taxable_amount: Some(net),
                tax_amount: Some(tax),
                percent: None,
                category: vat_20(),
            }],
        }],
        monetary_total: MonetaryTotal {
            line_extension_amount: Some(net),
            tax_exclusive_amount: Some(net),
            tax_inclusive_amount: Some(net + tax),
            payable_amount: Some(net + tax),
            ..Default::default()
        },
        lines: (1..=lines)
            .map(|i| Line {
                id: Some(i.to_string()),
                quantity: Some(Quantity {
                    value: Some(dec!(5)),
                    unit_code: Some("HUR".into()),
                }),
                line_extension_amount: Some(line_amount),
                item: Item {
                    name: Some(format!("Service item {i}")),
                    classified_tax_categories: vec![vat_20()],
                    ..Default::default()
                },
                price: Some(Price {
                    amount: Some(dec!(120)),
                    base_quantity: None,
                }),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn converter(version: EbVersion) -> ToEbInterfaceConverter {
    ToEbInterfaceConverter::new(version, Locale::German, ToEbInterfaceSettings::default())
}

fn bench_ubl_parse(c: &mut Criterion) {
    let xml = to_ubl_xml(&build_document(10)).unwrap();
    c.bench_function("ubl_parse_10_lines", |b| {
        b.iter(|| black_box(from_ubl_xml(black_box(&xml))));
    });
}

fn bench_to_ebinterface(c: &mut Criterion) {
    let doc = build_document(10);
    let conv = converter(EbVersion::LATEST);
    c.bench_function("to_ebinterface_10_lines", |b| {
        b.iter(|| {
            let mut errors = ErrorList::new();
            black_box(conv.convert(black_box(&doc), &mut errors))
        });
    });

    let doc = build_document(500);
    c.bench_function("to_ebinterface_500_lines", |b| {
        b.iter(|| {
            let mut errors = ErrorList::new();
            black_box(conv.convert(black_box(&doc), &mut errors))
        });
    });
}

fn bench_ebinterface_write_per_version(c: &mut Criterion) {
    let doc = build_document(10);
    let mut group = c.benchmark_group("ebinterface_serialize");
    for version in EbVersion::ALL {
        let mut errors = ErrorList::new();
        let Ok(Some(invoice)) = converter(version).convert(&doc, &mut errors) else {
            panic!("benchmark document does not convert: {errors:?}");
        };
        group.bench_function(version.as_str(), |b| {
            b.iter(|| black_box(ebinterface::to_xml(black_box(&invoice))));
        });
    }
    group.finish();
}

fn bench_ebinterface_parse(c: &mut Criterion) {
    let mut errors = ErrorList::new();
    let invoice = converter(EbVersion::LATEST)
        .convert(&build_document(10), &mut errors)
        .unwrap()
        .unwrap();
    let xml = ebinterface::to_xml(&invoice).unwrap();
    c.bench_function("ebinterface_parse_10_lines", |b| {
        b.iter(|| black_box(ebinterface::from_xml(black_box(&xml))));
    });
}

fn bench_to_ubl(c: &mut Criterion) {
    let mut errors = ErrorList::new();
    let invoice = converter(EbVersion::LATEST)
        .convert(&build_document(10), &mut errors)
        .unwrap()
        .unwrap();
    let conv = ToUblConverter::default();
    c.bench_function("to_ubl_10_lines", |b| {
        b.iter(|| {
            let mut errors = ErrorList::new();
            black_box(conv.convert(black_box(&invoice), &mut errors))
        });
    });
}

criterion_group!(
    benches,
    bench_ubl_parse,
    bench_to_ebinterface,
    bench_ebinterface_write_per_version,
    bench_ebinterface_parse,
    bench_to_ubl,
);
criterion_main!(benches);
