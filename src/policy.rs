//! Discount Policy
//!
//! Evaluates a cart against the quantity-bracket policy:
//!
//! - no eligible units: nothing,
//! - 1, 2 or 3 eligible units: 10%, 15% or 20% off the eligible lines,
//! - 4 or more: the cheapest qualifying unit drops to a floor price of 1.
//!
//! The evaluator reads the cart and returns at most one fee. It holds no state between calls.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, info};

use crate::{
    cart::Cart,
    categories::ExclusionSet,
    discounts::{
        BulkMode, DiscountError, DiscountRule, amount_above_floor, percent_of_minor,
        percent_points, percentage_from_points,
    },
    eligibility::{filter_eligible, total_quantity},
    fees::FeeAdjustment,
    items::LineItem,
    pricing::{major_to_minor, total_minor},
    products::ShippingCategories,
};

/// Default label for the bulk discount fee.
pub const DEFAULT_BULK_LABEL: &str = "Special Discount (Cheapest item for 1 zł)";

/// Default eligible quantity at which the bulk rule takes over.
pub const DEFAULT_BULK_THRESHOLD: u32 = 4;

/// Exact-match table of eligible quantity to percentage off.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: SmallVec<[(u32, Percentage); 3]>,
}

impl RateTable {
    /// Build a table from `(quantity, rate)` pairs. Later duplicates replace earlier ones.
    pub fn new(rates: impl IntoIterator<Item = (u32, Percentage)>) -> Self {
        let mut table = Self {
            rates: SmallVec::new(),
        };

        for (quantity, rate) in rates {
            table.insert(quantity, rate);
        }

        table
    }

    /// Set the rate for an exact quantity.
    pub fn insert(&mut self, quantity: u32, rate: Percentage) {
        match self.rates.binary_search_by_key(&quantity, |(q, _)| *q) {
            Ok(pos) => {
                if let Some(slot) = self.rates.get_mut(pos) {
                    slot.1 = rate;
                }
            }
            Err(pos) => self.rates.insert(pos, (quantity, rate)),
        }
    }

    /// Look up the rate for exactly `quantity` eligible units.
    pub fn rate_for(&self, quantity: u64) -> Option<Percentage> {
        self.rates
            .iter()
            .find(|(q, _)| u64::from(*q) == quantity)
            .map(|(_, rate)| *rate)
    }

    /// Quantities that have a rate, ascending.
    pub fn quantities(&self) -> impl Iterator<Item = u32> + '_ {
        self.rates.iter().map(|(q, _)| *q)
    }
}

impl Default for RateTable {
    /// 1 unit: 10%, 2 units: 15%, 3 units: 20%.
    fn default() -> Self {
        Self {
            rates: smallvec![
                (1, percentage_from_points(Decimal::from(10))),
                (2, percentage_from_points(Decimal::from(15))),
                (3, percentage_from_points(Decimal::from(20))),
            ],
        }
    }
}

/// Cart discount policy configuration and evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountPolicy {
    exclusions: ExclusionSet,
    rates: RateTable,
    bulk_threshold: u32,
    bulk_mode: BulkMode,
    floor_price: Decimal,
    bulk_label: String,
}

impl Default for DiscountPolicy {
    /// Excludes `weight` products and discounts the cheapest of the first four units.
    fn default() -> Self {
        Self {
            exclusions: ExclusionSet::from_strs(&["weight"]),
            rates: RateTable::default(),
            bulk_threshold: DEFAULT_BULK_THRESHOLD,
            bulk_mode: BulkMode::FirstUnits,
            floor_price: Decimal::ONE,
            bulk_label: DEFAULT_BULK_LABEL.to_string(),
        }
    }
}

impl DiscountPolicy {
    /// Replace the excluded shipping categories.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Replace the percentage rate table.
    #[must_use]
    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    /// Set the eligible quantity at which the bulk rule applies.
    #[must_use]
    pub fn with_bulk_threshold(mut self, threshold: u32) -> Self {
        self.bulk_threshold = threshold;
        self
    }

    /// Select how the bulk rule picks its cheapest unit.
    #[must_use]
    pub fn with_bulk_mode(mut self, mode: BulkMode) -> Self {
        self.bulk_mode = mode;
        self
    }

    /// Set the floor price, in major currency units, the cheapest unit is reduced to.
    #[must_use]
    pub fn with_floor_price(mut self, floor_price: Decimal) -> Self {
        self.floor_price = floor_price;
        self
    }

    /// Set the label used for the bulk discount fee.
    #[must_use]
    pub fn with_bulk_label(mut self, label: impl Into<String>) -> Self {
        self.bulk_label = label.into();
        self
    }

    /// Excluded shipping categories.
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Percentage rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Eligible quantity at which the bulk rule applies.
    pub fn bulk_threshold(&self) -> u32 {
        self.bulk_threshold
    }

    /// Bulk rule mode.
    pub fn bulk_mode(&self) -> BulkMode {
        self.bulk_mode
    }

    /// Floor price in major currency units.
    pub fn floor_price(&self) -> Decimal {
        self.floor_price
    }

    /// Bulk discount fee label.
    pub fn bulk_label(&self) -> &str {
        &self.bulk_label
    }

    /// Select the rule for a total eligible quantity.
    ///
    /// Zero units, or a quantity below the bulk threshold with no rate, has no rule.
    pub fn rule_for(&self, quantity: u64) -> Option<DiscountRule> {
        if quantity == 0 {
            None
        } else if quantity >= u64::from(self.bulk_threshold) {
            Some(DiscountRule::CheapestUnitAtFloor(self.bulk_mode))
        } else {
            self.rates
                .rate_for(quantity)
                .map(DiscountRule::PercentageOff)
        }
    }

    /// Evaluate the policy against a cart.
    ///
    /// Returns the single discount fee to add, or `None` when no rule applies or the computed
    /// discount is not positive. The fee amount is negative.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if minor unit arithmetic overflows.
    pub fn evaluate<'a, C>(
        &self,
        cart: &Cart<'a>,
        categories: &C,
    ) -> Result<Option<FeeAdjustment<'a>>, DiscountError>
    where
        C: ShippingCategories + ?Sized,
    {
        let eligible = filter_eligible(cart, &self.exclusions, categories);
        let quantity = total_quantity(eligible.iter().copied());
        let rule = self.rule_for(quantity);

        debug!(
            lines = cart.len(),
            eligible_lines = eligible.len(),
            eligible_quantity = quantity,
            ?rule,
            "selected discount rule"
        );

        let (label, discount_minor) = match rule {
            None => return Ok(None),
            Some(DiscountRule::PercentageOff(rate)) => {
                let subtotal = total_minor(eligible.iter().copied())?;

                (percentage_label(rate), percent_of_minor(&rate, subtotal)?)
            }
            Some(DiscountRule::CheapestUnitAtFloor(mode)) => (
                self.bulk_label.clone(),
                self.bulk_discount_minor(&eligible, mode, cart.currency())?,
            ),
        };

        debug!(discount_minor, "computed discount");

        if discount_minor <= 0 {
            return Ok(None);
        }

        let amount = Money::from_minor(
            discount_minor.checked_neg().ok_or(DiscountError::Overflow)?,
            cart.currency(),
        );

        info!(%label, %amount, "applying cart discount");

        Ok(Some(FeeAdjustment::new(label, amount)))
    }

    fn bulk_discount_minor(
        &self,
        eligible: &[&LineItem<'_>],
        mode: BulkMode,
        currency: &Currency,
    ) -> Result<i64, DiscountError> {
        let sample = usize::try_from(self.bulk_threshold).unwrap_or(usize::MAX);

        let Some(cheapest) = mode.cheapest_unit_minor(eligible, sample) else {
            return Ok(0);
        };

        let floor = major_to_minor(self.floor_price, currency).ok_or(DiscountError::Overflow)?;

        amount_above_floor(cheapest, floor)
    }
}

/// Fee label for a percentage discount, e.g. `Discount (15%)`.
pub fn percentage_label(rate: Percentage) -> String {
    format!("Discount ({}%)", percent_points(rate))
}
