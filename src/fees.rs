//! Fees
//!
//! Named cart-level adjustments and the ledger that collects them during a recalculation pass.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;

/// A named monetary adjustment to a cart's total. Discounts carry a negative amount.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeAdjustment<'a> {
    label: String,
    amount: Money<'a, Currency>,
}

impl<'a> FeeAdjustment<'a> {
    /// Create a new fee.
    pub fn new(label: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }

    /// Label shown against the fee at checkout.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Signed amount added to the cart total.
    pub fn amount(&self) -> &Money<'a, Currency> {
        &self.amount
    }
}

/// Fees collected for one cart during one recalculation pass.
#[derive(Debug, Clone)]
pub struct FeeLedger<'a> {
    fees: SmallVec<[FeeAdjustment<'a>; 2]>,
    currency: &'static Currency,
}

impl<'a> FeeLedger<'a> {
    /// Create an empty ledger for a cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            fees: SmallVec::new(),
            currency,
        }
    }

    /// Record a fee against the cart.
    pub fn add_fee(&mut self, fee: FeeAdjustment<'a>) {
        self.fees.push(fee);
    }

    /// Remove every recorded fee.
    pub fn reset(&mut self) {
        self.fees.clear();
    }

    /// Fees in the order they were added.
    pub fn fees(&self) -> &[FeeAdjustment<'a>] {
        &self.fees
    }

    /// Check whether no fees were recorded.
    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }

    /// Sum of every recorded fee.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a fee is in a different currency to the ledger.
    pub fn total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.fees
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, fee| {
                acc.add(*fee.amount())
            })
    }
}
