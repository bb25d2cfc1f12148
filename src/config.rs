//! Configuration
//!
//! YAML policy files and cart fixtures.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    categories::ExclusionSet,
    discounts::{BulkMode, percentage_from_points},
    items::LineItem,
    policy::{DEFAULT_BULK_LABEL, DEFAULT_BULK_THRESHOLD, DiscountPolicy, RateTable},
    pricing::major_to_minor,
    products::{Product, ProductKey},
};

/// Configuration Parsing Errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A cart line references a product that isn't defined
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A rate is configured for a quantity outside `1..threshold`
    #[error("Rate configured for quantity {quantity}, must be between 1 and {max}")]
    InvalidRateQuantity {
        /// Quantity the rate was configured for
        quantity: u32,
        /// Highest quantity a rate may be configured for
        max: u32,
    },

    /// Cart construction error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Policy file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Excluded shipping categories; defaults to `[weight]`
    pub exclusions: Option<ExclusionSet>,

    /// Quantity to percentage (e.g. `"15%"` or `"0.15"`); defaults to 10/15/20%
    pub percentage_rates: Option<FxHashMap<u32, String>>,

    /// Bulk rule settings
    pub bulk: BulkConfig,
}

/// Bulk rule section of a policy file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulkConfig {
    /// Eligible quantity at which the bulk rule applies
    pub threshold: Option<u32>,

    /// How the cheapest unit is chosen
    pub mode: Option<BulkMode>,

    /// Floor price in major units (e.g. `"1"` or `"0.99"`)
    pub floor_price: Option<String>,

    /// Fee label
    pub label: Option<String>,
}

impl PolicyConfig {
    /// Load a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or describes an invalid policy.
    pub fn load(path: impl AsRef<Path>) -> Result<DiscountPolicy, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::parse(&contents)
    }

    /// Parse a policy from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or describes an invalid policy.
    pub fn parse(yaml: &str) -> Result<DiscountPolicy, ConfigError> {
        let config: PolicyConfig = serde_norway::from_str(yaml)?;

        config.try_into()
    }
}

impl TryFrom<PolicyConfig> for DiscountPolicy {
    type Error = ConfigError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        let threshold = config.bulk.threshold.unwrap_or(DEFAULT_BULK_THRESHOLD);
        let mut policy = DiscountPolicy::default()
            .with_bulk_threshold(threshold)
            .with_bulk_mode(config.bulk.mode.unwrap_or_default())
            .with_bulk_label(config.bulk.label.as_deref().unwrap_or(DEFAULT_BULK_LABEL));

        if let Some(exclusions) = config.exclusions {
            policy = policy.with_exclusions(exclusions);
        }

        if let Some(floor) = config.bulk.floor_price {
            let floor_price = floor
                .trim()
                .parse::<Decimal>()
                .map_err(|_err| ConfigError::InvalidPrice(floor.clone()))?;

            if floor_price.is_sign_negative() {
                return Err(ConfigError::InvalidPrice(floor));
            }

            policy = policy.with_floor_price(floor_price);
        }

        let rates = match config.percentage_rates {
            Some(rates) => parse_rates(rates, threshold)?,
            None => {
                validate_rate_quantities(RateTable::default().quantities(), threshold)?;
                RateTable::default()
            }
        };

        Ok(policy.with_rates(rates))
    }
}

fn parse_rates(rates: FxHashMap<u32, String>, threshold: u32) -> Result<RateTable, ConfigError> {
    validate_rate_quantities(rates.keys().copied(), threshold)?;

    let parsed = rates
        .into_iter()
        .map(|(quantity, rate)| Ok((quantity, parse_percentage(&rate)?)))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(RateTable::new(parsed))
}

fn validate_rate_quantities(
    mut quantities: impl Iterator<Item = u32>,
    threshold: u32,
) -> Result<(), ConfigError> {
    let max = threshold.saturating_sub(1);

    match quantities.find(|quantity| *quantity == 0 || *quantity > max) {
        Some(quantity) => Err(ConfigError::InvalidRateQuantity { quantity, max }),
        None => Ok(()),
    }
}

/// Cart fixture file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartFixture {
    /// ISO currency code for the cart
    pub currency: String,

    /// Map of product key -> product
    pub products: FxHashMap<String, ProductFixture>,

    /// Cart lines in order
    pub items: Vec<LineFixture>,
}

/// Product entry in a cart fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Unit price (e.g., "49.99" or "49.99 PLN")
    pub price: String,

    /// Shipping category, if any
    #[serde(default)]
    pub shipping_category: Option<String>,
}

/// Line entry in a cart fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineFixture {
    /// Product key in `products`
    pub product: String,

    /// Number of units
    pub quantity: u32,
}

/// Catalog and cart built from a fixture.
#[derive(Debug)]
pub struct LoadedCart {
    /// Products referenced by the cart
    pub catalog: SlotMap<ProductKey, Product<'static>>,

    /// The cart itself
    pub cart: Cart<'static>,
}

impl CartFixture {
    /// Load a cart fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or references unknown products.
    pub fn load(path: impl AsRef<Path>) -> Result<LoadedCart, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::parse(&contents)
    }

    /// Parse a cart fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or references unknown products.
    pub fn parse(yaml: &str) -> Result<LoadedCart, ConfigError> {
        let fixture: CartFixture = serde_norway::from_str(yaml)?;

        fixture.try_into()
    }
}

impl TryFrom<CartFixture> for LoadedCart {
    type Error = ConfigError;

    fn try_from(fixture: CartFixture) -> Result<Self, Self::Error> {
        let currency = find_currency(&fixture.currency)?;
        let mut catalog = SlotMap::with_key();
        let mut keys = FxHashMap::default();

        for (key, product) in fixture.products {
            let price = Money::from_minor(parse_price(&product.price, currency)?, currency);

            let product_key = catalog.insert(Product {
                name: product.name,
                price,
                shipping_category: product.shipping_category,
            });

            keys.insert(key, product_key);
        }

        let mut cart = Cart::new(currency);

        for line in fixture.items {
            let product_key = *keys
                .get(&line.product)
                .ok_or_else(|| ConfigError::ProductNotFound(line.product.clone()))?;

            let product: &Product<'static> = catalog
                .get(product_key)
                .ok_or_else(|| ConfigError::ProductNotFound(line.product.clone()))?;

            cart.push(LineItem::new(product_key, product.price, line.quantity))?;
        }

        Ok(LoadedCart { catalog, cart })
    }
}

fn find_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    Currency::find(code).ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))
}

/// Parse a price string (e.g., "2.99" or "2.99 PLN") into minor units of `currency`.
///
/// # Errors
///
/// Returns an error if the amount is not a non-negative decimal, or if a currency code is given
/// that is unknown or differs from `currency`.
pub fn parse_price(s: &str, currency: &'static Currency) -> Result<i64, ConfigError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), code, None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT [CURRENCY]', got: {s}"
        )));
    };

    match code.map(find_currency).transpose()? {
        Some(found) if found != currency => {
            return Err(ConfigError::InvalidPrice(format!(
                "{s} is not priced in {}",
                currency.iso_alpha_code
            )));
        }
        _ => {}
    }

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidPrice(s.to_string()));
    }

    major_to_minor(amount, currency).ok_or_else(|| ConfigError::InvalidPrice(s.to_string()))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or is outside 0% to 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let points = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
    } else {
        trimmed
            .parse::<Decimal>()
            .ok()
            .and_then(|fraction| fraction.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| ConfigError::InvalidPercentage(s.to_string()))?
    };

    if points.is_sign_negative() || points > Decimal::ONE_HUNDRED {
        return Err(ConfigError::InvalidPercentage(s.to_string()));
    }

    Ok(percentage_from_points(points))
}
