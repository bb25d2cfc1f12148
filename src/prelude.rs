//! Cart discounts prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    categories::ExclusionSet,
    config::{CartFixture, ConfigError, LoadedCart, PolicyConfig},
    discounts::{BulkMode, DiscountError, DiscountRule},
    eligibility::filter_eligible,
    fees::{FeeAdjustment, FeeLedger},
    hooks::{
        CartDiscounts, CartHook, CartListener, DISCOUNT_PRIORITY, HookError, HookRegistry,
        RequestContext,
    },
    items::LineItem,
    policy::{DiscountPolicy, RateTable},
    pricing::TotalPriceError,
    products::{Product, ProductKey, ShippingCategories},
    receipt::{Receipt, ReceiptError},
};
