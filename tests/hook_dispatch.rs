//! Integration tests running full recalculation passes through the hook registry.

use std::path::PathBuf;

use rusty_money::{Money, iso::PLN};
use testresult::TestResult;

use cart_discounts::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(path)
}

/// Flat packing fee added before discounts run.
#[derive(Debug)]
struct PackingFee;

impl CartListener for PackingFee {
    fn calculate_fees<'a>(
        &self,
        _request: &RequestContext,
        cart: &Cart<'a>,
        fees: &mut FeeLedger<'a>,
    ) -> Result<(), HookError> {
        fees.add_fee(FeeAdjustment::new(
            "Packing",
            Money::from_minor(500, cart.currency()),
        ));

        Ok(())
    }
}

fn registry_for(policy: DiscountPolicy, loaded: &LoadedCart) -> HookRegistry {
    let mut registry = HookRegistry::new();

    CartDiscounts::new(policy, loaded.catalog.clone()).register(&mut registry);
    registry.subscribe(CartHook::CalculateFees, 10, Box::new(PackingFee));

    registry
}

#[test]
fn storefront_pass_collects_packing_then_discount() -> TestResult {
    let loaded = CartFixture::load(fixture("carts/two_mugs.yml"))?;
    let registry = registry_for(DiscountPolicy::default(), &loaded);

    let fees = registry.calculate_fees(&RequestContext::STOREFRONT, &loaded.cart)?;
    let labels: Vec<&str> = fees.fees().iter().map(FeeAdjustment::label).collect();

    assert_eq!(labels, vec!["Packing", "Discount (15%)"]);
    assert_eq!(fees.total()?, Money::from_minor(-1000, PLN));

    let receipt = Receipt::new(&loaded.cart, &fees)?;

    assert_eq!(receipt.subtotal(), Money::from_minor(10_000, PLN));
    assert_eq!(receipt.total(), Money::from_minor(9000, PLN));

    Ok(())
}

#[test]
fn admin_page_load_skips_discount_but_not_other_listeners() -> TestResult {
    let loaded = CartFixture::load(fixture("carts/two_mugs.yml"))?;
    let registry = registry_for(DiscountPolicy::default(), &loaded);

    let fees = registry.calculate_fees(&RequestContext::ADMIN, &loaded.cart)?;
    let labels: Vec<&str> = fees.fees().iter().map(FeeAdjustment::label).collect();

    assert_eq!(labels, vec!["Packing"]);

    let fees = registry.calculate_fees(&RequestContext::ADMIN_AJAX, &loaded.cart)?;

    assert_eq!(fees.fees().len(), 2);

    Ok(())
}

#[test]
fn each_pass_emits_at_most_one_discount() -> TestResult {
    let loaded = CartFixture::load(fixture("carts/mixed_pallets.yml"))?;
    let registry = registry_for(DiscountPolicy::default(), &loaded);

    for _ in 0..3 {
        let fees = registry.calculate_fees(&RequestContext::STOREFRONT, &loaded.cart)?;
        let discounts: Vec<&FeeAdjustment<'_>> = fees
            .fees()
            .iter()
            .filter(|fee| fee.amount().to_minor_units() < 0)
            .collect();

        assert_eq!(discounts.len(), 1);
        assert_eq!(
            discounts.first().map(|fee| fee.amount().to_minor_units()),
            Some(-3900)
        );
    }

    Ok(())
}

#[test]
fn empty_cart_pass_collects_only_other_fees() -> TestResult {
    let loaded = CartFixture::parse("currency: PLN\nproducts: {}\nitems: []\n")?;
    let registry = registry_for(DiscountPolicy::default(), &loaded);

    let fees = registry.calculate_fees(&RequestContext::STOREFRONT, &loaded.cart)?;

    assert_eq!(fees.fees().len(), 1);
    assert_eq!(registry.listener_count(CartHook::CalculateFees), 2);

    Ok(())
}

#[test]
fn receipt_renders_discount_row() -> TestResult {
    let loaded = CartFixture::load(fixture("carts/bulk_cheaper_last.yml"))?;
    let registry = registry_for(DiscountPolicy::default(), &loaded);

    let fees = registry.calculate_fees(&RequestContext::STOREFRONT, &loaded.cart)?;
    let mut out = Vec::new();

    Receipt::new(&loaded.cart, &fees)?.write_to(&mut out, &loaded.cart, &loaded.catalog)?;

    let output = String::from_utf8(out)?;

    assert!(output.contains("Plate"));
    assert!(output.contains("Napkin"));
    assert!(output.contains("Special Discount (Cheapest item for 1 zł)"));

    Ok(())
}
