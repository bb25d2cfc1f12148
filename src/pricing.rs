//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total or the running sum did not fit in minor units.
    #[error("line totals overflowed minor units")]
    Overflow,
}

/// Sums unit price times quantity over `items`, in minor units.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total or the sum overflowed `i64` minor units.
pub fn total_minor<'s, 'a: 's>(
    items: impl IntoIterator<Item = &'s LineItem<'a>>,
) -> Result<i64, TotalPriceError> {
    items.into_iter().try_fold(0_i64, |acc, item| {
        item.total_minor()
            .and_then(|line| acc.checked_add(line))
            .ok_or(TotalPriceError::Overflow)
    })
}

/// Calculates the total price of a list of line items in `currency`.
///
/// Callers are expected to have checked every item is priced in `currency`.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total or the sum overflowed `i64` minor units.
pub fn total_price<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    Ok(Money::from_minor(total_minor(items)?, currency))
}

/// Convert an amount in major units (e.g. `1.50`) to minor units of `currency`, rounding half
/// away from zero at the currency's precision.
///
/// Returns `None` if the result doesn't fit in `i64`.
pub fn major_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
