//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'a, Currency>,

    /// Shipping category (e.g. `"weight"`), if the product record has one.
    pub shipping_category: Option<String>,
}

/// Looks up the shipping category recorded against a product.
///
/// Returning `None` means the product has no category set, or is unknown to the catalog.
pub trait ShippingCategories {
    /// Return the shipping category for `product`, if any.
    fn shipping_category(&self, product: ProductKey) -> Option<&str>;
}

impl ShippingCategories for SlotMap<ProductKey, Product<'_>> {
    fn shipping_category(&self, product: ProductKey) -> Option<&str> {
        self.get(product)?.shipping_category.as_deref()
    }
}

impl<T: ShippingCategories + ?Sized> ShippingCategories for &T {
    fn shipping_category(&self, product: ProductKey) -> Option<&str> {
        (**self).shipping_category(product)
    }
}
