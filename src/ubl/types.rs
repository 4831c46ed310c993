use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Root element of a UBL business document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    #[default]
    Invoice,
    CreditNote,
}

impl DocumentKind {
    /// Local name of the root element.
    pub fn root_name(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::CreditNote => "CreditNote",
        }
    }

    /// Local name of a document line.
    pub fn line_name(self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceLine",
            Self::CreditNote => "CreditNoteLine",
        }
    }

    /// Local name of a line's quantity element.
    pub fn quantity_name(self) -> &'static str {
        match self {
            Self::Invoice => "InvoicedQuantity",
            Self::CreditNote => "CreditedQuantity",
        }
    }
}

/// An identifier qualified by an optional scheme (`<cbc:ID schemeID="...">`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemedId {
    pub scheme_id: Option<String>,
    pub value: String,
}

impl SchemedId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            scheme_id: None,
            value: value.into(),
        }
    }

    pub fn with_scheme(scheme_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme_id: Some(scheme_id.into()),
            value: value.into(),
        }
    }
}

/// UBL Invoice or CreditNote.
///
/// Both roots share one model; [`DocumentKind`] records which one it is.
/// Everything UBL allows to be absent is optional here, since the
/// converters report missing data instead of rejecting it up front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub kind: DocumentKind,
    pub ubl_version_id: Option<String>,
    pub customization_id: Option<String>,
    pub profile_id: Option<String>,
    /// Document number.
    pub id: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// InvoiceTypeCode or CreditNoteTypeCode.
    pub type_code: Option<String>,
    pub notes: Vec<String>,
    pub tax_point_date: Option<NaiveDate>,
    pub document_currency_code: Option<String>,
    pub buyer_reference: Option<String>,
    pub invoice_period: Option<Period>,
    pub order_reference: Option<OrderReference>,
    pub supplier: Option<AccountingParty>,
    pub customer: Option<AccountingParty>,
    pub buyer_customer: Option<Party>,
    pub payee: Option<Party>,
    pub deliveries: Vec<Delivery>,
    pub payment_means: Vec<PaymentMeans>,
    pub payment_terms: Vec<PaymentTerms>,
    pub allowance_charges: Vec<AllowanceCharge>,
    pub tax_totals: Vec<TaxTotal>,
    pub monetary_total: MonetaryTotal,
    pub lines: Vec<Line>,
}

/// AccountingSupplierParty / AccountingCustomerParty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountingParty {
    /// CustomerAssignedAccountID (supplier) or SupplierAssignedAccountID (customer).
    pub assigned_account_id: Option<String>,
    pub party: Option<Party>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub endpoint_id: Option<SchemedId>,
    pub identifications: Vec<SchemedId>,
    pub names: Vec<String>,
    pub postal_address: Option<Address>,
    pub tax_schemes: Vec<PartyTaxScheme>,
    pub legal_entities: Vec<PartyLegalEntity>,
    pub contact: Option<Contact>,
    pub person: Option<Person>,
}

impl Party {
    /// First PartyName, falling back to the first legal registration name.
    pub fn display_name(&self) -> Option<&str> {
        self.names
            .iter()
            .chain(self.legal_entities.iter().filter_map(|le| le.registration_name.as_ref()))
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street_name: Option<String>,
    pub additional_street_name: Option<String>,
    pub building_number: Option<String>,
    pub city_name: Option<String>,
    pub postal_zone: Option<String>,
    pub country_subentity: Option<String>,
    pub address_lines: Vec<String>,
    pub country: Option<Country>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// IdentificationCode (ISO 3166-1 alpha-2).
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyTaxScheme {
    pub company_id: Option<String>,
    pub tax_scheme_id: Option<SchemedId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyLegalEntity {
    pub registration_name: Option<String>,
    pub company_id: Option<SchemedId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderReference {
    pub id: Option<String>,
    pub issue_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub actual_delivery_date: Option<NaiveDate>,
    /// DeliveryLocation/Address.
    pub address: Option<Address>,
    pub party: Option<Party>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMeans {
    pub code: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub instruction_notes: Vec<String>,
    pub payment_ids: Vec<String>,
    pub payee_account: Option<FinancialAccount>,
    /// PaymentMandate/ID for direct debits.
    pub mandate_id: Option<String>,
    /// PaymentMandate/PayerFinancialAccount/ID.
    pub payer_account_id: Option<String>,
}

/// PayeeFinancialAccount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialAccount {
    /// Account ID, usually an IBAN.
    pub id: Option<SchemedId>,
    pub name: Option<String>,
    /// FinancialInstitutionBranch/ID (UBL 2.1 BIC location).
    pub branch_id: Option<String>,
    /// FinancialInstitutionBranch/FinancialInstitution/ID (UBL 2.0 BIC location).
    pub institution_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub notes: Vec<String>,
    pub payment_due_date: Option<NaiveDate>,
    pub settlement_discount_percent: Option<Decimal>,
    pub settlement_discount_amount: Option<Decimal>,
    pub settlement_period: Option<Period>,
    pub penalty_surcharge_percent: Option<Decimal>,
    pub penalty_amount: Option<Decimal>,
    pub penalty_period: Option<Period>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowanceCharge {
    /// `true` for a charge, `false` for an allowance.
    pub charge_indicator: bool,
    pub reason_code: Option<String>,
    pub reasons: Vec<String>,
    pub multiplier_factor: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub base_amount: Option<Decimal>,
    pub tax_categories: Vec<TaxCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxTotal {
    pub tax_amount: Option<Decimal>,
    pub subtotals: Vec<TaxSubtotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    pub taxable_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub percent: Option<Decimal>,
    pub category: TaxCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCategory {
    pub id: Option<SchemedId>,
    pub percent: Option<Decimal>,
    pub exemption_reason_code: Option<String>,
    pub exemption_reasons: Vec<String>,
    pub tax_scheme_id: Option<SchemedId>,
}

/// LegalMonetaryTotal (RequestedMonetaryTotal in old credit notes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonetaryTotal {
    pub line_extension_amount: Option<Decimal>,
    pub tax_exclusive_amount: Option<Decimal>,
    pub tax_inclusive_amount: Option<Decimal>,
    pub allowance_total_amount: Option<Decimal>,
    pub charge_total_amount: Option<Decimal>,
    pub prepaid_amount: Option<Decimal>,
    pub payable_rounding_amount: Option<Decimal>,
    pub payable_amount: Option<Decimal>,
}

/// InvoiceLine / CreditNoteLine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: Option<String>,
    pub notes: Vec<String>,
    pub quantity: Option<Quantity>,
    pub line_extension_amount: Option<Decimal>,
    /// OrderLineReference/LineID.
    pub order_line_id: Option<String>,
    pub deliveries: Vec<Delivery>,
    pub allowance_charges: Vec<AllowanceCharge>,
    pub tax_totals: Vec<TaxTotal>,
    pub item: Item,
    pub price: Option<Price>,
}

/// InvoicedQuantity / CreditedQuantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Option<Decimal>,
    pub unit_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: Option<String>,
    pub descriptions: Vec<String>,
    pub sellers_item_id: Option<String>,
    pub buyers_item_id: Option<String>,
    pub standard_item_id: Option<SchemedId>,
    pub classified_tax_categories: Vec<TaxCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Option<Decimal>,
    pub base_quantity: Option<Decimal>,
}
