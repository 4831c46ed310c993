use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EbVersion;

/// An ebInterface invoice document (root element `Invoice`).
///
/// The same model serves every supported version; `version` selects the
/// element layout when written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub version: EbVersion,
    pub generating_system: String,
    pub document_type: DocumentType,
    /// ISO 4217 currency code.
    pub currency: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub delivery: Option<Delivery>,
    pub biller: Biller,
    pub invoice_recipient: InvoiceRecipient,
    pub ordering_party: Option<OrderingParty>,
    /// `Details/ItemList/ListLineItem` entries.
    pub details: Vec<ListLineItem>,
    pub reductions_and_surcharges: Vec<ReductionOrSurcharge>,
    pub tax: Tax,
    pub total_gross_amount: Decimal,
    /// 5.0+.
    pub net_amount: Option<Decimal>,
    /// 4.3+.
    pub prepaid_amount: Option<Decimal>,
    /// 4.1+.
    pub payable_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_conditions: Option<PaymentConditions>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    Invoice,
    CreditMemo,
    InvoiceForAdvancePayment,
    InvoiceForPartialDelivery,
    SelfBilling,
    FinalSettlement,
    SubsequentCredit,
    SubsequentDebit,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::CreditMemo => "CreditMemo",
            Self::InvoiceForAdvancePayment => "InvoiceForAdvancePayment",
            Self::InvoiceForPartialDelivery => "InvoiceForPartialDelivery",
            Self::SelfBilling => "SelfBilling",
            Self::FinalSettlement => "FinalSettlement",
            Self::SubsequentCredit => "SubsequentCredit",
            Self::SubsequentDebit => "SubsequentDebit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Invoice" => Self::Invoice,
            "CreditMemo" => Self::CreditMemo,
            "InvoiceForAdvancePayment" => Self::InvoiceForAdvancePayment,
            "InvoiceForPartialDelivery" => Self::InvoiceForPartialDelivery,
            "SelfBilling" => Self::SelfBilling,
            "FinalSettlement" => Self::FinalSettlement,
            "SubsequentCredit" => Self::SubsequentCredit,
            "SubsequentDebit" => Self::SubsequentDebit,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub identifiers: Vec<AddressIdentifier>,
    pub name: String,
    /// Contact person. Inside `Address` up to 4.3, a separate `Contact` block from 5.0.
    pub contact: Option<String>,
    pub street: Option<String>,
    pub town: String,
    pub zip: String,
    pub country: Option<Country>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressIdentifier {
    pub kind: AddressIdentifierType,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressIdentifierType {
    Gln,
    Duns,
}

impl AddressIdentifierType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gln => "GLN",
            Self::Duns => "DUNS",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// `CountryCode` attribute.
    pub code: Option<String>,
    /// Element text, the country name.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Biller {
    pub vat_id: String,
    pub invoice_recipients_biller_id: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecipient {
    pub vat_id: String,
    pub billers_invoice_recipient_id: Option<String>,
    pub order_reference: Option<OrderReference>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderingParty {
    pub vat_id: String,
    pub billers_ordering_party_id: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReference {
    pub order_id: String,
    pub reference_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub when: DeliveryTime,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryTime {
    Date(NaiveDate),
    Period { from: NaiveDate, to: NaiveDate },
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListLineItem {
    pub position_number: u32,
    pub descriptions: Vec<String>,
    pub article_numbers: Vec<ArticleNumber>,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub tax: TaxRate,
    pub reductions_and_surcharges: Vec<ReductionOrSurcharge>,
    pub delivery: Option<Delivery>,
    pub order_reference: Option<OrderLineReference>,
    pub line_item_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleNumber {
    pub kind: ArticleNumberType,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArticleNumberType {
    BillersArticleNumber,
    InvoiceRecipientsArticleNumber,
    Gtin,
}

impl ArticleNumberType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BillersArticleNumber => "BillersArticleNumber",
            Self::InvoiceRecipientsArticleNumber => "InvoiceRecipientsArticleNumber",
            Self::Gtin => "GTIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BillersArticleNumber" => Some(Self::BillersArticleNumber),
            "InvoiceRecipientsArticleNumber" => Some(Self::InvoiceRecipientsArticleNumber),
            "GTIN" => Some(Self::Gtin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    /// UN/ECE Rec 20 unit code.
    pub unit: String,
    pub value: Decimal,
}

/// Buyer's order line a line item refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineReference {
    pub order_id: String,
    pub position: Option<String>,
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

/// Tax rate of a line or tax item: a VAT percentage or an exemption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub percent: Decimal,
    /// UNCL 5305 category code (`S`, `AE`, `E`, ...).
    pub category_code: Option<String>,
    pub exemption: Option<TaxExemption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxExemption {
    pub reason: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub items: Vec<TaxItem>,
    pub other_taxes: Vec<OtherTax>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxItem {
    pub taxable_amount: Decimal,
    pub rate: TaxRate,
    pub tax_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTax {
    pub comment: String,
    pub amount: Decimal,
}

// ---------------------------------------------------------------------------
// Reductions / surcharges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReductionKind {
    Reduction,
    Surcharge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionOrSurcharge {
    pub kind: ReductionKind,
    pub base_amount: Decimal,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub comment: Option<String>,
    /// Document level only.
    pub vat_rate: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// 4.2+.
    pub comment: Option<String>,
    pub kind: PaymentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaymentKind {
    UniversalBankTransaction(BankTransfer),
    DirectDebit,
    NoPayment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankTransfer {
    pub consolidator_payable: bool,
    pub accounts: Vec<BeneficiaryAccount>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryAccount {
    pub bic: Option<String>,
    pub iban: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentConditions {
    pub due_date: Option<NaiveDate>,
    pub discounts: Vec<Discount>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub payment_date: NaiveDate,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
}
