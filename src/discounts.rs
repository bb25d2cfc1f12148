//! Discounts
//!
//! The two rule kinds a cart can fall into, and the minor-unit arithmetic behind them.

use std::{fmt, iter};

use clap::ValueEnum;
use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    items::{LineItem, cheapest_item},
    pricing::TotalPriceError,
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor unit arithmetic overflowed.
    #[error("discount arithmetic overflowed minor units")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl From<TotalPriceError> for DiscountError {
    fn from(err: TotalPriceError) -> Self {
        match err {
            TotalPriceError::Overflow => DiscountError::Overflow,
        }
    }
}

/// The rule selected for a cart, keyed off its eligible quantity.
#[derive(Copy, Clone, PartialEq)]
pub enum DiscountRule {
    /// Take a percentage off the combined price of every eligible unit.
    PercentageOff(Percentage),

    /// Reduce the cheapest qualifying unit to the floor price.
    CheapestUnitAtFloor(BulkMode),
}

impl fmt::Debug for DiscountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountRule::PercentageOff(p) => f
                .debug_tuple("PercentageOff")
                .field(&percent_points(*p))
                .finish(),
            DiscountRule::CheapestUnitAtFloor(mode) => {
                f.debug_tuple("CheapestUnitAtFloor").field(mode).finish()
            }
        }
    }
}

/// How the bulk rule picks its "cheapest unit".
///
/// Both behaviours shipped in past releases of the plugin and produce different fees for the
/// same cart, so each is kept as a named mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum BulkMode {
    /// Cheapest among the first `threshold` units, walking the cart in order and expanding each
    /// line's quantity into individual units. Cheaper lines further down the cart are ignored.
    #[default]
    FirstUnits,

    /// Cheapest unit price across every eligible line.
    CheapestOverall,
}

impl BulkMode {
    /// Find the unit price, in minor units, this mode will discount.
    ///
    /// `sample` is the number of units `FirstUnits` inspects. Returns `None` when there are no
    /// items (or `sample` is zero for `FirstUnits`).
    pub fn cheapest_unit_minor(self, items: &[&LineItem<'_>], sample: usize) -> Option<i64> {
        match self {
            BulkMode::FirstUnits => items
                .iter()
                .flat_map(|item| {
                    let units = usize::try_from(item.quantity()).unwrap_or(usize::MAX);

                    iter::repeat_n(item.price().to_minor_units(), units)
                })
                .take(sample)
                .min(),
            BulkMode::CheapestOverall => {
                cheapest_item(items).map(|item| item.price().to_minor_units())
            }
        }
    }
}

impl fmt::Display for BulkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkMode::FirstUnits => f.write_str("first_units"),
            BulkMode::CheapestOverall => f.write_str("cheapest_overall"),
        }
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Rounds half away from zero.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't actually expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Amount by which `unit_minor` exceeds `floor_minor`, or zero if it doesn't.
///
/// # Errors
///
/// Returns `DiscountError::Overflow` if the subtraction overflows.
pub fn amount_above_floor(unit_minor: i64, floor_minor: i64) -> Result<i64, DiscountError> {
    unit_minor
        .checked_sub(floor_minor)
        .map(|diff| diff.max(0))
        .ok_or(DiscountError::Overflow)
}

/// Converts a fractional percentage to percent points for display, e.g. `0.15` to `15`.
pub fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).normalize()
}

/// Build a percentage from whole or fractional percent points, e.g. `15` for 15%.
pub fn percentage_from_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}
