//! PaymentMeans → PaymentMethod, PaymentTerms → PaymentConditions.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::{Context, non_empty_join, trimmed};
use crate::core::Text;
use crate::ebinterface::{
    BankTransfer, BeneficiaryAccount, Discount, PaymentConditions, PaymentKind, PaymentMethod,
};
use crate::ubl::{Document, PaymentMeans};

pub const IBAN_MAX_LENGTH: usize = 34;
pub const PAYMENT_REFERENCE_MAX_LENGTH: usize = 35;

/// UNCL 4461 codes mapped to a universal bank transaction.
const BANK_TRANSFER_CODES: &[&str] = &["30", "31", "42", "58"];
const DIRECT_DEBIT_CODES: &[&str] = &["49", "59"];
const NO_PAYMENT_CODES: &[&str] = &["1", "10", "20", "48", "97", "ZZZ"];

lazy_static! {
    pub static ref BIC_PATTERN: Regex = Regex::new(r"^[0-9A-Za-z]{8}([0-9A-Za-z]{3})?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeansKind {
    Transfer,
    DirectDebit,
    NoPayment,
}

fn means_kind(code: &str) -> Option<MeansKind> {
    if BANK_TRANSFER_CODES.contains(&code) {
        Some(MeansKind::Transfer)
    } else if DIRECT_DEBIT_CODES.contains(&code) {
        Some(MeansKind::DirectDebit)
    } else if NO_PAYMENT_CODES.contains(&code) {
        Some(MeansKind::NoPayment)
    } else {
        None
    }
}

/// The first PaymentMeans with a supported code decides the method.
///
/// Further bank-transfer means contribute additional beneficiary accounts.
pub(super) fn convert_payment_method(doc: &Document, ctx: &mut Context<'_>) -> PaymentMethod {
    let mut chosen: Option<(usize, MeansKind)> = None;
    for (i, pm) in doc.payment_means.iter().enumerate() {
        let code = trimmed(pm.code.as_deref()).unwrap_or_default();
        match means_kind(code) {
            Some(kind) => {
                chosen.get_or_insert((i, kind));
            }
            None => ctx.warn(
                format!("PaymentMeans[{}]/PaymentMeansCode", i + 1),
                Text::UnsupportedPaymentMeansCode,
                &[code],
            ),
        }
    }

    let Some((index, kind)) = chosen else {
        return PaymentMethod {
            comment: None,
            kind: PaymentKind::NoPayment,
        };
    };
    let first = &doc.payment_means[index];
    let comment = non_empty_join(&first.instruction_notes)
        .filter(|_| ctx.version.supports_payment_comment());

    let kind = match kind {
        MeansKind::DirectDebit => PaymentKind::DirectDebit,
        MeansKind::NoPayment => PaymentKind::NoPayment,
        MeansKind::Transfer => {
            let accounts = doc
                .payment_means
                .iter()
                .enumerate()
                .skip(index)
                .filter(|(_, pm)| {
                    trimmed(pm.code.as_deref()).and_then(means_kind) == Some(MeansKind::Transfer)
                })
                .filter_map(|(i, pm)| beneficiary_account(doc, pm, i, ctx))
                .collect();
            PaymentKind::UniversalBankTransaction(BankTransfer {
                consolidator_payable: false,
                accounts,
                payment_reference: payment_reference(first, index, ctx),
            })
        }
    };
    PaymentMethod { comment, kind }
}

fn beneficiary_account(
    doc: &Document,
    pm: &PaymentMeans,
    index: usize,
    ctx: &mut Context<'_>,
) -> Option<BeneficiaryAccount> {
    let field = format!("PaymentMeans[{}]/PayeeFinancialAccount", index + 1);
    let account = pm.payee_account.as_ref();

    let iban = account
        .and_then(|a| a.id.as_ref())
        .map(|id| id.value.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|s| !s.is_empty());
    let Some(mut iban) = iban else {
        ctx.error(format!("{field}/ID"), Text::MissingIban, &[]);
        return None;
    };
    if iban.chars().count() > IBAN_MAX_LENGTH {
        ctx.warn(
            format!("{field}/ID"),
            Text::IbanTooLong,
            &[iban.as_str(), IBAN_MAX_LENGTH.to_string().as_str()],
        );
        iban = iban.chars().take(IBAN_MAX_LENGTH).collect();
    }

    let bic = account.and_then(|a| {
        trimmed(a.branch_id.as_deref()).or_else(|| trimmed(a.institution_id.as_deref()))
    });
    if let Some(bic) = bic {
        if !BIC_PATTERN.is_match(bic) {
            ctx.error(
                format!("{field}/FinancialInstitutionBranch/ID"),
                Text::InvalidBic,
                &[bic],
            );
        }
    }

    let owner = trimmed(account.and_then(|a| a.name.as_deref()))
        .or_else(|| doc.payee.as_ref().and_then(|p| p.display_name()))
        .or_else(|| {
            doc.supplier
                .as_ref()
                .and_then(|s| s.party.as_ref())
                .and_then(|p| p.display_name())
        });

    Some(BeneficiaryAccount {
        bic: bic.map(str::to_string),
        iban: Some(iban),
        owner: owner.map(str::to_string),
    })
}

fn payment_reference(pm: &PaymentMeans, index: usize, ctx: &mut Context<'_>) -> Option<String> {
    let reference = pm.payment_ids.iter().find_map(|id| trimmed(Some(id.as_str())))?;
    if reference.chars().count() <= PAYMENT_REFERENCE_MAX_LENGTH {
        return Some(reference.to_string());
    }
    ctx.warn(
        format!("PaymentMeans[{}]/PaymentID", index + 1),
        Text::PaymentReferenceTooLong,
        &[reference, PAYMENT_REFERENCE_MAX_LENGTH.to_string().as_str()],
    );
    Some(reference.chars().take(PAYMENT_REFERENCE_MAX_LENGTH).collect())
}

pub(super) fn convert_payment_conditions(
    doc: &Document,
    ctx: &mut Context<'_>,
) -> Option<PaymentConditions> {
    let due_date = due_date(doc, ctx);

    let mut discounts = Vec::new();
    let mut notes = Vec::new();
    for (i, pt) in doc.payment_terms.iter().enumerate() {
        let field = format!("PaymentTerms[{}]", i + 1);
        notes.extend(pt.notes.iter().cloned());

        if pt.penalty_surcharge_percent.is_some() || pt.penalty_amount.is_some() {
            ctx.error(
                format!("{field}/PenaltySurchargePercent"),
                Text::PenaltyNotSupported,
                &[],
            );
        }

        if pt.settlement_discount_percent.is_none() && pt.settlement_discount_amount.is_none() {
            continue;
        }
        let Some(due) = due_date else {
            ctx.error(
                format!("{field}/SettlementDiscountPercent"),
                Text::DiscountWithoutDueDate,
                &[],
            );
            continue;
        };
        discounts.push(Discount {
            payment_date: pt
                .settlement_period
                .as_ref()
                .and_then(|p| p.end_date)
                .unwrap_or(due),
            percentage: pt.settlement_discount_percent,
            amount: pt.settlement_discount_amount,
        });
    }

    let comment = non_empty_join(&notes);
    if due_date.is_none() && discounts.is_empty() && comment.is_none() {
        return None;
    }
    Some(PaymentConditions {
        due_date,
        discounts,
        comment,
    })
}

/// Invoice DueDate, then PaymentMeans due dates, then PaymentTerms due dates.
fn due_date(doc: &Document, ctx: &mut Context<'_>) -> Option<NaiveDate> {
    let candidates: Vec<NaiveDate> = doc
        .due_date
        .into_iter()
        .chain(doc.payment_means.iter().filter_map(|pm| pm.due_date))
        .chain(doc.payment_terms.iter().filter_map(|pt| pt.payment_due_date))
        .collect();
    let first = *candidates.first()?;
    if candidates.iter().any(|d| *d != first) {
        ctx.warn(
            "PaymentTerms/PaymentDueDate",
            Text::MultipleDueDates,
            &[first.to_string().as_str()],
        );
    }
    Some(first)
}
