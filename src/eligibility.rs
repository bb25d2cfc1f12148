//! Eligibility
//!
//! Which cart lines count towards the quantity brackets, and how many units they add up to.

use smallvec::SmallVec;

use crate::{
    cart::Cart, categories::ExclusionSet, items::LineItem, products::ShippingCategories,
};

/// Eligible line items, borrowed from the cart in cart order.
pub type EligibleItems<'c, 'a> = SmallVec<[&'c LineItem<'a>; 8]>;

/// Select the cart lines whose product's shipping category is not excluded.
///
/// Products without a category are eligible. Cart order is preserved.
pub fn filter_eligible<'c, 'a, C>(
    cart: &'c Cart<'a>,
    exclusions: &ExclusionSet,
    categories: &C,
) -> EligibleItems<'c, 'a>
where
    C: ShippingCategories + ?Sized,
{
    cart.iter()
        .filter(|item| !exclusions.excludes(categories.shipping_category(item.product())))
        .collect()
}

/// Sum of quantities across `items`; zero when there are none.
pub fn total_quantity<'s, 'a: 's>(items: impl IntoIterator<Item = &'s LineItem<'a>>) -> u64 {
    items
        .into_iter()
        .map(|item| u64::from(item.quantity()))
        .sum()
}
