use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::*;
use super::EbVersion;
use crate::core::ConversionError;
use crate::xml_utils::{XmlEvent, attr, parse_date, parse_decimal, walk_xml};

type Attrs = [(String, String)];

/// Parse an ebInterface 4.0 to 6.0 invoice.
///
/// The version is taken from the root element's namespace; an unknown
/// namespace is [`ConversionError::UnknownNamespace`]. InvoiceNumber,
/// InvoiceDate, InvoiceCurrency and TotalGrossAmount are required.
pub fn from_xml(xml: &str) -> Result<Invoice, ConversionError> {
    let mut reader: Option<EbReader> = None;
    let mut last_attrs: Vec<(String, String)> = Vec::new();

    walk_xml(xml, |path, event| {
        let p: Vec<&str> = path.iter().map(String::as_str).collect();
        match event {
            XmlEvent::Start { attrs } => {
                if p.len() == 1 {
                    reader = Some(EbReader::from_root(p[0], attrs)?);
                }
                last_attrs = attrs.to_vec();
                if let Some(r) = reader.as_mut() {
                    r.on_start(&p, attrs);
                }
                Ok(())
            }
            XmlEvent::Text(text) => match reader.as_mut() {
                Some(r) => r.on_text(&p, &last_attrs, text),
                None => Ok(()),
            },
            XmlEvent::End => {
                if let Some(r) = reader.as_mut() {
                    r.on_end(&p)?;
                }
                Ok(())
            }
        }
    })?;

    let reader =
        reader.ok_or_else(|| ConversionError::UnsupportedDocument("empty document".into()))?;
    reader.finish()
}

#[derive(Default)]
struct DeliveryDraft {
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    address: Option<Address>,
}

impl DeliveryDraft {
    fn finish(self) -> Result<Delivery, ConversionError> {
        let when = match (self.date, self.from, self.to) {
            (Some(d), _, _) => DeliveryTime::Date(d),
            (None, Some(from), Some(to)) => DeliveryTime::Period { from, to },
            _ => {
                return Err(ConversionError::Xml(
                    "Delivery needs a Date or a complete Period".into(),
                ));
            }
        };
        Ok(Delivery {
            when,
            address: self.address,
        })
    }
}

struct EbReader {
    inv: Invoice,
    number: Option<String>,
    date: Option<NaiveDate>,
    gross: Option<Decimal>,
    delivery: Option<DeliveryDraft>,
}

impl EbReader {
    fn from_root(name: &str, attrs: &Attrs) -> Result<Self, ConversionError> {
        if name != "Invoice" {
            return Err(ConversionError::UnsupportedDocument(format!(
                "root element <{name}> is not an ebInterface Invoice"
            )));
        }
        let namespaces: Vec<&str> = attrs
            .iter()
            .filter(|(k, _)| k == "xmlns" || k.starts_with("xmlns:"))
            .map(|(_, v)| v.as_str())
            .collect();
        let version = namespaces
            .iter()
            .find_map(|ns| EbVersion::from_namespace(ns))
            .ok_or_else(|| ConversionError::UnknownNamespace(namespaces.join(" ")))?;

        let document_type = match attr(attrs, "DocumentType") {
            Some(dt) => DocumentType::parse(dt)
                .ok_or_else(|| ConversionError::Xml(format!("unknown DocumentType '{dt}'")))?,
            None => DocumentType::Invoice,
        };
        let currency = attr(attrs, "InvoiceCurrency")
            .ok_or_else(|| ConversionError::Xml("missing InvoiceCurrency attribute".into()))?;

        Ok(Self {
            inv: Invoice {
                version,
                generating_system: attr(attrs, "GeneratingSystem").unwrap_or_default().to_string(),
                document_type,
                currency: currency.to_string(),
                invoice_number: String::new(),
                invoice_date: NaiveDate::default(),
                delivery: None,
                biller: Biller::default(),
                invoice_recipient: InvoiceRecipient::default(),
                ordering_party: None,
                details: Vec::new(),
                reductions_and_surcharges: Vec::new(),
                tax: Tax::default(),
                total_gross_amount: Decimal::ZERO,
                net_amount: None,
                prepaid_amount: None,
                payable_amount: None,
                payment_method: None,
                payment_conditions: None,
                comment: None,
            },
            number: None,
            date: None,
            gross: None,
            delivery: None,
        })
    }

    fn finish(mut self) -> Result<Invoice, ConversionError> {
        let missing = |what: &str| ConversionError::Xml(format!("missing {what}"));
        self.inv.invoice_number = self.number.ok_or_else(|| missing("InvoiceNumber"))?;
        self.inv.invoice_date = self.date.ok_or_else(|| missing("InvoiceDate"))?;
        self.inv.total_gross_amount = self.gross.ok_or_else(|| missing("TotalGrossAmount"))?;
        tracing::debug!(
            number = %self.inv.invoice_number,
            version = %self.inv.version,
            lines = self.inv.details.len(),
            "parsed ebInterface document"
        );
        Ok(self.inv)
    }

    fn on_start(&mut self, p: &[&str], attrs: &Attrs) {
        let inv = &mut self.inv;
        match p {
            [_, "Delivery"] | [_, "Details", "ItemList", "ListLineItem", "Delivery"] => {
                self.delivery = Some(DeliveryDraft::default());
            }
            [_, "Delivery", "Address", rest @ ..]
            | [_, "Details", "ItemList", "ListLineItem", "Delivery", "Address", rest @ ..] => {
                if let Some(d) = self.delivery.as_mut() {
                    address_start(d.address.get_or_insert_with(Default::default), rest, attrs);
                }
            }
            [_, "Biller", "Address", rest @ ..] => {
                address_start(&mut inv.biller.address, rest, attrs)
            }
            [_, "InvoiceRecipient", "Address", rest @ ..] => {
                address_start(&mut inv.invoice_recipient.address, rest, attrs)
            }
            [_, "OrderingParty"] => inv.ordering_party = Some(OrderingParty::default()),
            [_, "OrderingParty", "Address", rest @ ..] => {
                if let Some(op) = inv.ordering_party.as_mut() {
                    address_start(&mut op.address, rest, attrs);
                }
            }
            [_, "Details", "ItemList", "ListLineItem"] => inv.details.push(ListLineItem {
                position_number: 0,
                descriptions: Vec::new(),
                article_numbers: Vec::new(),
                quantity: Quantity {
                    unit: String::new(),
                    value: Decimal::ZERO,
                },
                unit_price: Decimal::ZERO,
                tax: TaxRate::default(),
                reductions_and_surcharges: Vec::new(),
                delivery: None,
                order_reference: None,
                line_item_amount: Decimal::ZERO,
            }),
            [_, "Details", "ItemList", "ListLineItem", rest @ ..] => {
                if let Some(item) = inv.details.last_mut() {
                    line_start(item, rest, attrs);
                }
            }
            [_, "ReductionAndSurchargeDetails", kind] => {
                if let Some(kind) = reduction_kind(kind) {
                    inv.reductions_and_surcharges.push(new_reduction(kind));
                }
            }
            [_, "Tax", "VAT", "Item"] | [_, "Tax", "TaxItem"] => inv.tax.items.push(TaxItem {
                taxable_amount: Decimal::ZERO,
                rate: TaxRate::default(),
                tax_amount: Decimal::ZERO,
            }),
            [_, "Tax", "VAT", "Item", "TaxExemption"] => {
                if let Some(item) = inv.tax.items.last_mut() {
                    item.rate.exemption = Some(TaxExemption {
                        reason: String::new(),
                        code: attr(attrs, "TaxExemptionCode").map(str::to_string),
                    });
                }
            }
            [_, "Tax", "TaxItem", "TaxPercent"] => {
                if let Some(item) = inv.tax.items.last_mut() {
                    item.rate.category_code = attr(attrs, "TaxCategoryCode").map(str::to_string);
                }
            }
            [_, "Tax", "OtherTax"] => inv.tax.other_taxes.push(OtherTax {
                comment: String::new(),
                amount: Decimal::ZERO,
            }),
            [_, "PaymentMethod"] => {
                inv.payment_method = Some(PaymentMethod {
                    comment: None,
                    kind: PaymentKind::NoPayment,
                })
            }
            [_, "PaymentMethod", "UniversalBankTransaction"] => {
                if let Some(pm) = inv.payment_method.as_mut() {
                    pm.kind = PaymentKind::UniversalBankTransaction(BankTransfer {
                        consolidator_payable: attr(attrs, "ConsolidatorPayable") == Some("true"),
                        ..Default::default()
                    });
                }
            }
            [_, "PaymentMethod", "UniversalBankTransaction", "BeneficiaryAccount"] => {
                if let Some(bt) = bank_transfer(inv) {
                    bt.accounts.push(BeneficiaryAccount::default());
                }
            }
            [_, "PaymentMethod", "DirectDebit"] => {
                if let Some(pm) = inv.payment_method.as_mut() {
                    pm.kind = PaymentKind::DirectDebit;
                }
            }
            [_, "PaymentConditions"] => inv.payment_conditions = Some(PaymentConditions::default()),
            _ => {}
        }
    }

    fn on_end(&mut self, p: &[&str]) -> Result<(), ConversionError> {
        match p {
            [_, "Delivery"] => {
                if let Some(d) = self.delivery.take() {
                    self.inv.delivery = Some(d.finish()?);
                }
            }
            [_, "Details", "ItemList", "ListLineItem", "Delivery"] => {
                if let (Some(d), Some(item)) = (self.delivery.take(), self.inv.details.last_mut()) {
                    item.delivery = Some(d.finish()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, p: &[&str], attrs: &Attrs, text: &str) -> Result<(), ConversionError> {
        let field = p.join("/");
        let c = Ctx {
            field: &field,
            attrs,
            text,
        };
        let inv = &mut self.inv;
        match p {
            [_, "InvoiceNumber"] => self.number = Some(c.string()),
            [_, "InvoiceDate"] => self.date = Some(c.date()?),
            [_, "Delivery", rest @ ..]
            | [_, "Details", "ItemList", "ListLineItem", "Delivery", rest @ ..] => {
                if let Some(d) = self.delivery.as_mut() {
                    delivery_text(d, rest, &c)?;
                }
            }
            [_, "Biller", rest @ ..] => {
                let b = &mut inv.biller;
                match rest {
                    ["VATIdentificationNumber"] => b.vat_id = c.string(),
                    ["InvoiceRecipientsBillerID"] => {
                        b.invoice_recipients_biller_id = Some(c.string())
                    }
                    _ => party_text(&mut b.address, rest, &c),
                }
            }
            [_, "InvoiceRecipient", rest @ ..] => {
                let r = &mut inv.invoice_recipient;
                match rest {
                    ["VATIdentificationNumber"] => r.vat_id = c.string(),
                    ["BillersInvoiceRecipientID"] => {
                        r.billers_invoice_recipient_id = Some(c.string())
                    }
                    ["OrderReference", "OrderID"] => {
                        r.order_reference.get_or_insert_with(Default::default).order_id = c.string()
                    }
                    ["OrderReference", "ReferenceDate"] => {
                        r.order_reference.get_or_insert_with(Default::default).reference_date =
                            Some(c.date()?)
                    }
                    _ => party_text(&mut r.address, rest, &c),
                }
            }
            [_, "OrderingParty", rest @ ..] => {
                if let Some(op) = inv.ordering_party.as_mut() {
                    match rest {
                        ["VATIdentificationNumber"] => op.vat_id = c.string(),
                        ["BillersOrderingPartyID"] => {
                            op.billers_ordering_party_id = Some(c.string())
                        }
                        _ => party_text(&mut op.address, rest, &c),
                    }
                }
            }
            [_, "Details", "ItemList", "ListLineItem", rest @ ..] => {
                if let Some(item) = inv.details.last_mut() {
                    line_text(item, rest, &c)?;
                }
            }
            [_, "ReductionAndSurchargeDetails", _, rest @ ..] => {
                if let Some(rs) = inv.reductions_and_surcharges.last_mut() {
                    reduction_text(rs, rest, &c)?;
                }
            }
            [_, "NetAmount"] => inv.net_amount = Some(c.decimal()?),
            [_, "Tax", "VAT", "Item", rest @ ..] | [_, "Tax", "TaxItem", rest @ ..] => {
                if let Some(item) = inv.tax.items.last_mut() {
                    tax_item_text(item, rest, &c)?;
                }
            }
            [_, "Tax", "OtherTax", field] => {
                if let Some(other) = inv.tax.other_taxes.last_mut() {
                    match *field {
                        "Comment" => other.comment = c.string(),
                        "Amount" => other.amount = c.decimal()?,
                        _ => {}
                    }
                }
            }
            [_, "TotalGrossAmount"] => self.gross = Some(c.decimal()?),
            [_, "PrepaidAmount"] => inv.prepaid_amount = Some(c.decimal()?),
            [_, "PayableAmount"] => inv.payable_amount = Some(c.decimal()?),
            [_, "PaymentMethod", "Comment"] => {
                if let Some(pm) = inv.payment_method.as_mut() {
                    pm.comment = Some(c.string());
                }
            }
            [_, "PaymentMethod", "UniversalBankTransaction", rest @ ..] => {
                if let Some(bt) = bank_transfer(inv) {
                    match rest {
                        ["BeneficiaryAccount", field] => {
                            if let Some(acc) = bt.accounts.last_mut() {
                                match *field {
                                    "BIC" => acc.bic = Some(c.string()),
                                    "IBAN" => acc.iban = Some(c.string()),
                                    "BankAccountOwner" => acc.owner = Some(c.string()),
                                    _ => {}
                                }
                            }
                        }
                        ["PaymentReference"] => bt.payment_reference = Some(c.string()),
                        _ => {}
                    }
                }
            }
            [_, "PaymentConditions", rest @ ..] => {
                if let Some(pc) = inv.payment_conditions.as_mut() {
                    payment_conditions_text(pc, rest, &c)?;
                }
            }
            [_, "Comment"] => inv.comment = Some(c.string()),
            _ => {}
        }
        Ok(())
    }
}

struct Ctx<'a> {
    field: &'a str,
    attrs: &'a Attrs,
    text: &'a str,
}

impl Ctx<'_> {
    fn string(&self) -> String {
        self.text.to_string()
    }

    fn decimal(&self) -> Result<Decimal, ConversionError> {
        parse_decimal(self.field, self.text)
    }

    fn date(&self) -> Result<NaiveDate, ConversionError> {
        parse_date(self.field, self.text)
    }
}

fn bank_transfer(inv: &mut Invoice) -> Option<&mut BankTransfer> {
    match inv.payment_method.as_mut().map(|pm| &mut pm.kind) {
        Some(PaymentKind::UniversalBankTransaction(bt)) => Some(bt),
        _ => None,
    }
}

fn reduction_kind(name: &str) -> Option<ReductionKind> {
    match name {
        "Reduction" | "ReductionListLineItem" => Some(ReductionKind::Reduction),
        "Surcharge" | "SurchargeListLineItem" => Some(ReductionKind::Surcharge),
        _ => None,
    }
}

fn new_reduction(kind: ReductionKind) -> ReductionOrSurcharge {
    ReductionOrSurcharge {
        kind,
        base_amount: Decimal::ZERO,
        percentage: None,
        amount: None,
        comment: None,
        vat_rate: None,
    }
}

fn address_start(addr: &mut Address, rest: &[&str], attrs: &Attrs) {
    if let ["Country"] = rest {
        addr.country = Some(Country {
            code: attr(attrs, "CountryCode").map(str::to_string),
            name: String::new(),
        });
    }
}

fn address_text(addr: &mut Address, rest: &[&str], c: &Ctx<'_>) {
    match rest {
        ["AddressIdentifier"] => {
            let kind = match attr(c.attrs, "AddressIdentifierType") {
                Some("DUNS") => AddressIdentifierType::Duns,
                _ => AddressIdentifierType::Gln,
            };
            addr.identifiers.push(AddressIdentifier {
                kind,
                value: c.string(),
            });
        }
        ["Name"] => addr.name = c.string(),
        ["Street"] => addr.street = Some(c.string()),
        ["Town"] => addr.town = c.string(),
        ["ZIP"] => addr.zip = c.string(),
        ["Country"] => addr.country.get_or_insert_with(Default::default).name = c.string(),
        ["Phone"] => addr.phone = Some(c.string()),
        ["Email"] => addr.email = Some(c.string()),
        ["Contact"] => addr.contact = Some(c.string()),
        _ => {}
    }
}

/// `Address` plus the separate `Contact` block of 5.0+.
fn party_text(addr: &mut Address, rest: &[&str], c: &Ctx<'_>) {
    match rest {
        ["Address", rest @ ..] => address_text(addr, rest, c),
        ["Contact", "Name"] => addr.contact = Some(c.string()),
        ["Contact", "Email"] if addr.email.is_none() => addr.email = Some(c.string()),
        ["Contact", "Phone"] if addr.phone.is_none() => addr.phone = Some(c.string()),
        _ => {}
    }
}

fn delivery_text(d: &mut DeliveryDraft, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["Date"] => d.date = Some(c.date()?),
        ["Period", "FromDate"] => d.from = Some(c.date()?),
        ["Period", "ToDate"] => d.to = Some(c.date()?),
        ["Address", ..] | ["Contact", ..] => {
            party_text(d.address.get_or_insert_with(Default::default), rest, c)
        }
        _ => {}
    }
    Ok(())
}

fn line_start(item: &mut ListLineItem, rest: &[&str], attrs: &Attrs) {
    match rest {
        ["Quantity"] => {
            item.quantity.unit = attr(attrs, "Unit").unwrap_or_default().to_string();
        }
        ["TaxExemption"] => {
            item.tax.exemption = Some(TaxExemption {
                reason: String::new(),
                code: attr(attrs, "TaxExemptionCode").map(str::to_string),
            });
        }
        ["TaxItem", "TaxPercent"] => {
            item.tax.category_code = attr(attrs, "TaxCategoryCode").map(str::to_string);
        }
        ["ReductionAndSurchargeListLineItemDetails", kind] => {
            if let Some(kind) = reduction_kind(kind) {
                item.reductions_and_surcharges.push(new_reduction(kind));
            }
        }
        _ => {}
    }
}

fn line_text(item: &mut ListLineItem, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["PositionNumber"] => {
            item.position_number = c.text.trim().parse().map_err(|_| {
                ConversionError::Xml(format!("invalid PositionNumber '{}'", c.text))
            })?
        }
        ["Description"] => item.descriptions.push(c.string()),
        ["ArticleNumber"] => {
            let kind = attr(c.attrs, "ArticleNumberType")
                .and_then(ArticleNumberType::parse)
                .unwrap_or(ArticleNumberType::BillersArticleNumber);
            item.article_numbers.push(ArticleNumber {
                kind,
                value: c.string(),
            });
        }
        ["Quantity"] => item.quantity.value = c.decimal()?,
        ["UnitPrice"] => item.unit_price = c.decimal()?,
        ["VATRate"] => item.tax.percent = c.decimal()?,
        ["TaxExemption"] => {
            item.tax.exemption.get_or_insert_with(Default::default).reason = c.string()
        }
        ["TaxItem", "TaxPercent"] => item.tax.percent = c.decimal()?,
        ["TaxItem", "Comment"] => {
            item.tax.exemption.get_or_insert_with(Default::default).reason = c.string()
        }
        ["ReductionAndSurchargeListLineItemDetails", _, rest @ ..] => {
            if let Some(rs) = item.reductions_and_surcharges.last_mut() {
                reduction_text(rs, rest, c)?;
            }
        }
        ["InvoiceRecipientsOrderReference", "OrderID"] => {
            item.order_reference.get_or_insert_with(Default::default).order_id = c.string()
        }
        ["InvoiceRecipientsOrderReference", "OrderPositionNumber"] => {
            item.order_reference.get_or_insert_with(Default::default).position = Some(c.string())
        }
        ["LineItemAmount"] => item.line_item_amount = c.decimal()?,
        _ => {}
    }
    Ok(())
}

fn reduction_text(
    rs: &mut ReductionOrSurcharge,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["BaseAmount"] => rs.base_amount = c.decimal()?,
        ["Percentage"] => rs.percentage = Some(c.decimal()?),
        ["Amount"] => rs.amount = Some(c.decimal()?),
        ["Comment"] => rs.comment = Some(c.string()),
        ["VATRate"] | ["TaxItem", "TaxPercent"] => rs.vat_rate = Some(c.decimal()?),
        _ => {}
    }
    Ok(())
}

fn tax_item_text(item: &mut TaxItem, rest: &[&str], c: &Ctx<'_>) -> Result<(), ConversionError> {
    match rest {
        ["TaxedAmount"] | ["TaxableAmount"] => item.taxable_amount = c.decimal()?,
        ["VATRate"] | ["TaxPercent"] => item.rate.percent = c.decimal()?,
        ["TaxExemption"] | ["Comment"] => {
            item.rate.exemption.get_or_insert_with(Default::default).reason = c.string()
        }
        ["Amount"] | ["TaxAmount"] => item.tax_amount = c.decimal()?,
        _ => {}
    }
    Ok(())
}

fn payment_conditions_text(
    pc: &mut PaymentConditions,
    rest: &[&str],
    c: &Ctx<'_>,
) -> Result<(), ConversionError> {
    match rest {
        ["DueDate"] => pc.due_date = Some(c.date()?),
        ["Discount", "PaymentDate"] => pc.discounts.push(Discount {
            payment_date: c.date()?,
            percentage: None,
            amount: None,
        }),
        ["Discount", "Percentage"] => {
            if let Some(d) = pc.discounts.last_mut() {
                d.percentage = Some(c.decimal()?);
            }
        }
        ["Discount", "Amount"] => {
            if let Some(d) = pc.discounts.last_mut() {
                d.amount = Some(c.decimal()?);
            }
        }
        ["Comment"] => pc.comment = Some(c.string()),
        _ => {}
    }
    Ok(())
}
