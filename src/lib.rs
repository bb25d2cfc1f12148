//! Cart Discounts
//!
//! A quantity-bracket cart discount policy. Carts with a few eligible units get a percentage
//! off their eligible lines; larger carts get their cheapest unit reduced to a floor price.
//! Lines whose shipping category is excluded never count towards either rule. The discount is
//! applied as a single negative fee through an explicit cart hook registry.

pub mod cart;
pub mod categories;
pub mod config;
pub mod discounts;
pub mod eligibility;
pub mod fees;
pub mod hooks;
pub mod items;
pub mod policy;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
