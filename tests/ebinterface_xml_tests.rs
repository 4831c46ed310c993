#![cfg(feature = "xml")]

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use ubl_ebinterface::ConversionError;
use ubl_ebinterface::ebinterface::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn address(name: &str, town: &str, zip: &str) -> Address {
    Address {
        identifiers: Vec::new(),
        name: name.into(),
        contact: None,
        street: Some("Hauptstraße 1".into()),
        town: town.into(),
        zip: zip.into(),
        country: Some(Country {
            code: Some("AT".into()),
            name: "Österreich".into(),
        }),
        phone: None,
        email: None,
    }
}

fn standard_rate(percent: rust_decimal::Decimal) -> TaxRate {
    TaxRate {
        percent,
        category_code: Some("S".into()),
        exemption: None,
    }
}

fn exempt_rate() -> TaxRate {
    TaxRate {
        percent: dec!(0),
        category_code: Some("E".into()),
        exemption: Some(TaxExemption {
            reason: "Kleinunternehmer".into(),
            code: None,
        }),
    }
}

fn full_invoice(version: EbVersion) -> Invoice {
    let mut biller_address = address("Lieferant GmbH", "Wien", "1010");
    biller_address.identifiers.push(AddressIdentifier {
        kind: AddressIdentifierType::Gln,
        value: "9012345000004".into(),
    });
    biller_address.contact = Some("Max Muster".into());
    biller_address.email = Some("office@lieferant.at".into());
    biller_address.phone = Some("+43 1 234".into());

    Invoice {
        version,
        generating_system: "test".into(),
        document_type: DocumentType::Invoice,
        currency: "EUR".into(),
        invoice_number: "R-2024-001".into(),
        invoice_date: date(2024, 3, 15),
        delivery: Some(Delivery {
            when: DeliveryTime::Period {
                from: date(2024, 2, 1),
                to: date(2024, 2, 29),
            },
            address: Some(address("Lager Nord", "Linz", "4020")),
        }),
        biller: Biller {
            vat_id: "ATU12345678".into(),
            invoice_recipients_biller_id: Some("L-77".into()),
            address: biller_address,
        },
        invoice_recipient: InvoiceRecipient {
            vat_id: "ATU87654321".into(),
            billers_invoice_recipient_id: Some("K-1".into()),
            order_reference: Some(OrderReference {
                order_id: "PO-9".into(),
                reference_date: Some(date(2024, 1, 20)),
            }),
            address: address("Kunde AG", "Graz", "8010"),
        },
        ordering_party: Some(OrderingParty {
            vat_id: "ATU11111111".into(),
            billers_ordering_party_id: Some("B-3".into()),
            address: address("Besteller KG", "Salzburg", "5020"),
        }),
        details: vec![
            ListLineItem {
                position_number: 1,
                descriptions: vec!["Beratung".into(), "Februar".into()],
                article_numbers: vec![ArticleNumber {
                    kind: ArticleNumberType::BillersArticleNumber,
                    value: "A-1".into(),
                }],
                quantity: Quantity {
                    unit: "HUR".into(),
                    value: dec!(10),
                },
                unit_price: dec!(100),
                tax: standard_rate(dec!(20)),
                reductions_and_surcharges: vec![ReductionOrSurcharge {
                    kind: ReductionKind::Reduction,
                    base_amount: dec!(1000),
                    percentage: Some(dec!(10)),
                    amount: Some(dec!(100)),
                    comment: Some("Treuerabatt".into()),
                    vat_rate: None,
                }],
                delivery: Some(Delivery {
                    when: DeliveryTime::Date(date(2024, 2, 15)),
                    address: None,
                }),
                order_reference: Some(OrderLineReference {
                    order_id: "PO-9".into(),
                    position: Some("1".into()),
                }),
                line_item_amount: dec!(900),
            },
            ListLineItem {
                position_number: 2,
                descriptions: vec!["Fachbuch".into()],
                article_numbers: Vec::new(),
                quantity: Quantity {
                    unit: "C62".into(),
                    value: dec!(1),
                },
                unit_price: dec!(50),
                tax: exempt_rate(),
                reductions_and_surcharges: Vec::new(),
                delivery: None,
                order_reference: None,
                line_item_amount: dec!(50),
            },
        ],
        reductions_and_surcharges: vec![ReductionOrSurcharge {
            kind: ReductionKind::Surcharge,
            base_amount: dec!(950),
            percentage: None,
            amount: Some(dec!(10)),
            comment: Some("Versand".into()),
            vat_rate: Some(dec!(20)),
        }],
        tax: Tax {
            items: vec![
                TaxItem {
                    taxable_amount: dec!(910),
                    rate: standard_rate(dec!(20)),
                    tax_amount: dec!(182),
                },
                TaxItem {
                    taxable_amount: dec!(50),
                    rate: exempt_rate(),
                    tax_amount: dec!(0),
                },
            ],
            other_taxes: vec![OtherTax {
                comment: "Ortstaxe".into(),
                amount: dec!(5),
            }],
        },
        total_gross_amount: dec!(1147),
        net_amount: Some(dec!(960)),
        prepaid_amount: Some(dec!(100)),
        payable_amount: Some(dec!(1047)),
        payment_method: Some(PaymentMethod {
            comment: Some("Bitte überweisen".into()),
            kind: PaymentKind::UniversalBankTransaction(BankTransfer {
                consolidator_payable: false,
                accounts: vec![BeneficiaryAccount {
                    bic: Some("BKAUATWW".into()),
                    iban: Some("AT611904300234573201".into()),
                    owner: Some("Lieferant GmbH".into()),
                }],
                payment_reference: Some("R-2024-001".into()),
            }),
        }),
        payment_conditions: Some(PaymentConditions {
            due_date: Some(date(2024, 4, 15)),
            discounts: vec![Discount {
                payment_date: date(2024, 3, 25),
                percentage: Some(dec!(2)),
                amount: None,
            }],
            comment: Some("30 Tage netto".into()),
        }),
        comment: Some("Danke für Ihren Auftrag".into()),
    }
}

/// What survives a write/read cycle in the given version.
fn as_read_back(mut inv: Invoice) -> Invoice {
    let v = inv.version;
    if !v.supports_net_amount() {
        inv.net_amount = None;
    }
    if !v.supports_prepaid_amount() {
        inv.prepaid_amount = None;
    }
    if !v.supports_payable_amount() {
        inv.payable_amount = None;
    }
    if !v.supports_payment_comment() {
        if let Some(pm) = inv.payment_method.as_mut() {
            pm.comment = None;
        }
    }
    if !v.uses_tax_items() {
        for item in &mut inv.tax.items {
            item.rate.category_code = None;
        }
        for line in &mut inv.details {
            line.tax.category_code = None;
        }
    }
    inv
}

#[test]
fn round_trip_every_version() {
    for version in EbVersion::ALL {
        let inv = full_invoice(version);
        let xml = to_xml(&inv).unwrap();
        let back = from_xml(&xml).unwrap_or_else(|e| panic!("{version}: {e}\n{xml}"));
        assert_eq!(back, as_read_back(inv), "{version}");
    }
}

#[test]
fn latest_version_round_trips_unchanged() {
    let inv = full_invoice(EbVersion::LATEST);
    let back = from_xml(&to_xml(&inv).unwrap()).unwrap();
    assert_eq!(back, inv);
}

#[test]
fn version_specific_layout() {
    let xml = to_xml(&full_invoice(EbVersion::V4_0)).unwrap();
    assert!(xml.contains("<VAT>"));
    assert!(xml.contains("<VATRate>20.00</VATRate>"));
    assert!(xml.contains("<TaxExemption>Kleinunternehmer</TaxExemption>"));
    assert!(xml.contains("<Contact>Max Muster</Contact>"));
    assert!(!xml.contains("PayableAmount"));
    assert!(!xml.contains("PrepaidAmount"));
    assert!(!xml.contains("NetAmount"));

    let xml = to_xml(&full_invoice(EbVersion::V4_3)).unwrap();
    assert!(xml.contains("<PrepaidAmount>100.00</PrepaidAmount>"));
    assert!(xml.contains("<PayableAmount>1047.00</PayableAmount>"));
    assert!(!xml.contains("NetAmount"));

    let xml = to_xml(&full_invoice(EbVersion::V6_0)).unwrap();
    assert!(xml.contains("<NetAmount>960.00</NetAmount>"));
    assert!(xml.contains(r#"<TaxPercent TaxCategoryCode="S">20.00</TaxPercent>"#));
    assert!(xml.contains(r#"<TaxPercent TaxCategoryCode="E">0.00</TaxPercent>"#));
    assert!(xml.contains("<Name>Max Muster</Name>"));
    assert!(!xml.contains("<Contact>Max Muster</Contact>"));
    assert!(!xml.contains("<VATRate>"));
}

#[test]
fn line_tax_amount_is_derived_in_tax_items() {
    let xml = to_xml(&full_invoice(EbVersion::V5_0)).unwrap();
    // 900 * 20 %
    assert!(xml.contains("<TaxAmount>180.00</TaxAmount>"));
}

#[test]
fn line_tax_amount_out_of_range_is_error() {
    let mut inv = full_invoice(EbVersion::V5_0);
    inv.details[0].line_item_amount = rust_decimal::Decimal::MAX;
    let err = to_xml(&inv).unwrap_err();
    assert!(matches!(err, ConversionError::AmountOutOfRange(_)), "{err}");
    assert!(err.to_string().contains("ListLineItem"), "{err}");

    // 4.x writes only the rate
    inv.version = EbVersion::V4_3;
    assert!(to_xml(&inv).is_ok());
}

#[test]
fn exemption_code_kept_in_4x() {
    let mut inv = full_invoice(EbVersion::V4_3);
    inv.tax.items[1].rate.exemption = Some(TaxExemption {
        reason: "Steuerfrei".into(),
        code: Some("VATEX-EU-132".into()),
    });
    let back = from_xml(&to_xml(&inv).unwrap()).unwrap();
    assert_eq!(
        back.tax.items[1].rate.exemption,
        Some(TaxExemption {
            reason: "Steuerfrei".into(),
            code: Some("VATEX-EU-132".into()),
        })
    );
}

#[test]
fn credit_memo_and_payment_kinds() {
    let mut inv = full_invoice(EbVersion::V5_0);
    inv.document_type = DocumentType::CreditMemo;
    inv.payment_method = Some(PaymentMethod {
        comment: None,
        kind: PaymentKind::DirectDebit,
    });
    let xml = to_xml(&inv).unwrap();
    assert!(xml.contains(r#"DocumentType="CreditMemo""#));
    let back = from_xml(&xml).unwrap();
    assert_eq!(back.document_type, DocumentType::CreditMemo);
    assert_eq!(back.payment_method.unwrap().kind, PaymentKind::DirectDebit);

    inv.payment_method = Some(PaymentMethod {
        comment: None,
        kind: PaymentKind::NoPayment,
    });
    let back = from_xml(&to_xml(&inv).unwrap()).unwrap();
    assert_eq!(back.payment_method.unwrap().kind, PaymentKind::NoPayment);
}

#[test]
fn unknown_namespace_is_rejected() {
    let xml = r#"<Invoice xmlns="http://www.ebinterface.at/schema/3p02/" InvoiceCurrency="EUR">
        <InvoiceNumber>1</InvoiceNumber></Invoice>"#;
    assert!(matches!(from_xml(xml), Err(ConversionError::UnknownNamespace(_))));
}

#[test]
fn missing_required_header_is_error() {
    let xml = r#"<Invoice xmlns="http://www.ebinterface.at/schema/6p0/" InvoiceCurrency="EUR">
        <InvoiceNumber>1</InvoiceNumber>
        <InvoiceDate>2024-01-01</InvoiceDate>
    </Invoice>"#;
    let err = from_xml(xml).unwrap_err();
    assert!(err.to_string().contains("TotalGrossAmount"), "{err}");
}

#[test]
fn wrong_root_is_unsupported() {
    let xml = r#"<Order xmlns="http://www.ebinterface.at/schema/6p0/"/>"#;
    assert!(matches!(from_xml(xml), Err(ConversionError::UnsupportedDocument(_))));
}
