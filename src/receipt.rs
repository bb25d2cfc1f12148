//! Receipt

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::SlotMap;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    fees::{FeeAdjustment, FeeLedger},
    pricing::TotalPriceError,
    products::{Product, ProductKey},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating the cart subtotal.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Error finding a product in the product catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Cart totals after one fee calculation pass.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    fees: Vec<FeeAdjustment<'a>>,
    subtotal: Money<'a, Currency>,
    fee_total: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a cart and the fees collected for it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the subtotal overflows or fee currencies don't match.
    pub fn new(cart: &Cart<'a>, fees: &FeeLedger<'a>) -> Result<Self, ReceiptError> {
        let subtotal = cart.subtotal()?;
        let fee_total = fees.total()?;
        let total = subtotal.add(fee_total)?;

        Ok(Self {
            fees: fees.fees().to_vec(),
            subtotal,
            fee_total,
            total,
        })
    }

    /// Total of the cart lines before fees
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of every fee, negative for discounts
    pub fn fee_total(&self) -> Money<'a, Currency> {
        self.fee_total
    }

    /// Amount payable
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Fees applied to the cart
    pub fn fees(&self) -> &[FeeAdjustment<'a>] {
        &self.fees
    }

    /// Writes the receipt as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a cart line's product is missing from `catalog`, or writing fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        cart: &Cart<'_>,
        catalog: &SlotMap<ProductKey, Product<'_>>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Category", "Unit Price", "Qty", "Line Total"]);

        for item in cart {
            let product = catalog
                .get(item.product())
                .ok_or(ReceiptError::MissingProduct(item.product()))?;

            let line_total = item
                .total_minor()
                .map(|minor| Money::from_minor(minor, cart.currency()).to_string())
                .unwrap_or_default();

            builder.push_record([
                product.name.clone(),
                product.shipping_category.clone().unwrap_or_default(),
                item.price().to_string(),
                item.quantity().to_string(),
                line_total,
            ]);
        }

        for fee in &self.fees {
            builder.push_record([
                fee.label().to_string(),
                String::new(),
                String::new(),
                String::new(),
                fee.amount().to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "Subtotal: {}", self.subtotal).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "Fees:     {}", self.fee_total).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "Total:    {}", self.total).map_err(|_err| ReceiptError::IO)?;

        Ok(())
    }
}
