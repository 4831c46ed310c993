//! Decimal scales and HALF_UP rounding shared by both directions.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Scale of tax percentages.
pub const SCALE_PERCENT: u32 = 2;
/// Scale of monetary amounts.
pub const SCALE_AMOUNT: u32 = 2;
/// Scale of unit prices and derived base amounts.
pub const SCALE_PRICE: u32 = 4;

pub const HUNDRED: Decimal = dec!(100);

/// Round half away from zero ("HALF_UP" in commercial rounding).
pub fn half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator` rounded HALF_UP.
///
/// `None` on a zero denominator or if the quotient leaves the `Decimal` range.
pub fn divide(numerator: Decimal, denominator: Decimal, scale: u32) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator).map(|q| half_up(q, scale))
}

/// Percentage of `part` in `whole`: `part × 100 / whole`, scale 2.
///
/// `None` on a zero `whole` or overflow.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    divide(part.checked_mul(HUNDRED)?, whole, SCALE_PERCENT)
}

/// `value × percent / 100` rounded HALF_UP to `scale`, or `None` on overflow.
pub fn percent_of(value: Decimal, percent: Decimal, scale: u32) -> Option<Decimal> {
    let product = value.checked_mul(percent)?;
    product.checked_div(HUNDRED).map(|v| half_up(v, scale))
}

/// `a × b` rounded HALF_UP to `scale`, or `None` on overflow.
pub fn multiply(a: Decimal, b: Decimal, scale: u32) -> Option<Decimal> {
    a.checked_mul(b).map(|v| half_up(v, scale))
}

/// Sum of `values`, or `None` once the running total overflows.
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}
