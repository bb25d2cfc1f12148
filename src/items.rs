//! Items

use rusty_money::{Money, iso::Currency};

use crate::products::ProductKey;

/// A cart line: one product at a unit price, bought `quantity` times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item.
    pub fn new(product: ProductKey, price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            product,
            price,
            quantity,
        }
    }

    /// Returns the product of the line item
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the unit price of the line item
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the number of units on this line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the line total (unit price times quantity) in minor units.
    ///
    /// Returns `None` if the multiplication overflows.
    pub fn total_minor(&self) -> Option<i64> {
        self.price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

/// Returns the line item with the cheapest unit price, first one wins on ties.
pub fn cheapest_item<'s, 'a>(items: &[&'s LineItem<'a>]) -> Option<&'s LineItem<'a>> {
    items
        .iter()
        .copied()
        .min_by_key(|item| item.price().to_minor_units())
}
