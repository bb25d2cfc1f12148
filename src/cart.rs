//! Cart

use std::slice;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{TotalPriceError, total_price},
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was added with a quantity of zero.
    #[error("Line {0} has a quantity of zero")]
    ZeroQuantity(usize),
}

/// A snapshot of the cart's line items, in the order the customer added them.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given line items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line is priced in another currency or has no units.
    pub fn with_items(
        items: impl Into<Vec<LineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_line(i, item, currency))?;

        Ok(Cart { items, currency })
    }

    /// Append a line item to the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the line is priced in another currency or has no units.
    pub fn push(&mut self, item: LineItem<'a>) -> Result<(), CartError> {
        check_line(self.items.len(), &item, self.currency)?;

        self.items.push(item);

        Ok(())
    }

    /// Calculate the subtotal of the cart before any fees.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if the line totals overflow.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        total_price(&self.items, self.currency)
    }

    /// Iterate over the line items in cart order.
    pub fn iter(&self) -> slice::Iter<'_, LineItem<'a>> {
        self.items.iter()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl<'c, 'a> IntoIterator for &'c Cart<'a> {
    type Item = &'c LineItem<'a>;
    type IntoIter = slice::Iter<'c, LineItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_line(index: usize, item: &LineItem<'_>, currency: &'static Currency) -> Result<(), CartError> {
    let item_currency = item.price().currency();

    if item_currency != currency {
        return Err(CartError::CurrencyMismatch(
            index,
            item_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if item.quantity() == 0 {
        return Err(CartError::ZeroQuantity(index));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::products::ProductKey;

    use super::*;

    fn test_items<'a>() -> [LineItem<'a>; 3] {
        [
            LineItem::new(ProductKey::default(), Money::from_minor(100, iso::PLN), 1),
            LineItem::new(ProductKey::default(), Money::from_minor(200, iso::PLN), 2),
            LineItem::new(ProductKey::default(), Money::from_minor(300, iso::PLN), 3),
        ]
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(iso::PLN);

        assert_eq!(cart.currency, iso::PLN);
        assert!(cart.is_empty());
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            LineItem::new(ProductKey::default(), Money::from_minor(100, iso::PLN), 1),
            LineItem::new(ProductKey::default(), Money::from_minor(100, iso::USD), 1),
        ];

        let result = Cart::with_items(items, iso::PLN);

        assert_eq!(
            result.err(),
            Some(CartError::CurrencyMismatch(
                1,
                iso::USD.iso_alpha_code,
                iso::PLN.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_items_zero_quantity_errors() {
        let items = [LineItem::new(
            ProductKey::default(),
            Money::from_minor(100, iso::PLN),
            0,
        )];

        let result = Cart::with_items(items, iso::PLN);

        assert_eq!(result.err(), Some(CartError::ZeroQuantity(0)));
    }

    #[test]
    fn push_checks_the_new_line() -> TestResult {
        let mut cart = Cart::with_items(test_items(), iso::PLN)?;

        let result = cart.push(LineItem::new(
            ProductKey::default(),
            Money::from_minor(100, iso::EUR),
            1,
        ));

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                3,
                iso::EUR.iso_alpha_code,
                iso::PLN.iso_alpha_code
            ))
        );

        cart.push(LineItem::new(
            ProductKey::default(),
            Money::from_minor(100, iso::PLN),
            1,
        ))?;

        assert_eq!(cart.len(), 4);

        Ok(())
    }

    #[test]
    fn subtotal_multiplies_quantities() -> TestResult {
        let cart = Cart::with_items(test_items(), iso::PLN)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(1400, iso::PLN));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_items() -> TestResult {
        let cart = Cart::new(iso::PLN);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, iso::PLN));

        Ok(())
    }

    #[test]
    fn iter_preserves_cart_order() -> TestResult {
        let cart = Cart::with_items(test_items(), iso::PLN)?;

        let quantities: Vec<u32> = cart.iter().map(LineItem::quantity).collect();

        assert_eq!(quantities, vec![1, 2, 3]);

        Ok(())
    }
}
