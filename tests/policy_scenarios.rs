//! Integration tests evaluating the checked-in cart fixtures against the checked-in policies.
//!
//! Prices are PLN, so every amount below is in grosze.
//!
//! `two_mugs`: 2 × 50.00 standard, 15% of 100.00 = 15.00 off.
//! `weight_only`: 1 × 30.00 weight, nothing eligible.
//! `bulk_cheap_tail`: 5 × 20.00 then 1 × 5.00, cheapest overall unit 5.00 → 4.00 off.
//! `bulk_cheaper_last`: 5 × 20.00 then 1 × 1.50, first four units are all 20.00 → 19.00 off.
//! `mixed_pallets`: 3 × 250.00 pallet, 1 × 90.00 weight, 1 × 40.00 standard, 2 × 12.00 with no
//! category. With `[weight]` excluded six units are eligible and the first four are the three
//! pallets and the mug, so the mug drops to 1.00. With `[weight, pallet_weight]` excluded three
//! units remain and 20% of 64.00 comes off.

use std::path::PathBuf;

use rusty_money::{Money, iso::PLN};
use testresult::TestResult;

use cart_discounts::{eligibility::total_quantity, prelude::*};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(path)
}

fn evaluate(policy: &DiscountPolicy, cart: &str) -> TestResult<Option<(String, i64)>> {
    let loaded = CartFixture::load(fixture(cart))?;
    let fee = policy.evaluate(&loaded.cart, &loaded.catalog)?;

    Ok(fee.map(|fee| (fee.label().to_string(), fee.amount().to_minor_units())))
}

fn default_policy() -> TestResult<DiscountPolicy> {
    Ok(PolicyConfig::load(fixture("policies/default.yml"))?)
}

fn pallet_policy() -> TestResult<DiscountPolicy> {
    Ok(PolicyConfig::load(fixture(
        "policies/pallet_cheapest_overall.yml",
    ))?)
}

#[test]
fn default_policy_file_matches_built_in_defaults() -> TestResult {
    assert_eq!(default_policy()?, DiscountPolicy::default());

    Ok(())
}

#[test]
fn two_standard_units_get_fifteen_percent() -> TestResult {
    assert_eq!(
        evaluate(&default_policy()?, "carts/two_mugs.yml")?,
        Some(("Discount (15%)".to_string(), -1500))
    );

    Ok(())
}

#[test]
fn excluded_only_cart_gets_nothing() -> TestResult {
    assert_eq!(evaluate(&default_policy()?, "carts/weight_only.yml")?, None);

    Ok(())
}

#[test]
fn cheapest_overall_uses_cheapest_eligible_line() -> TestResult {
    let policy = default_policy()?.with_bulk_mode(BulkMode::CheapestOverall);

    assert_eq!(
        evaluate(&policy, "carts/bulk_cheap_tail.yml")?,
        Some((
            "Special Discount (Cheapest item for 1 zł)".to_string(),
            -400
        ))
    );

    assert_eq!(
        evaluate(&policy, "carts/bulk_cheaper_last.yml")?,
        Some((
            "Special Discount (Cheapest item for 1 zł)".to_string(),
            -50
        ))
    );

    Ok(())
}

#[test]
fn first_units_ignores_cheaper_lines_past_the_threshold() -> TestResult {
    let policy = default_policy()?;

    assert_eq!(
        evaluate(&policy, "carts/bulk_cheaper_last.yml")?,
        Some((
            "Special Discount (Cheapest item for 1 zł)".to_string(),
            -1900
        ))
    );

    assert_eq!(
        evaluate(&policy, "carts/bulk_cheap_tail.yml")?,
        Some((
            "Special Discount (Cheapest item for 1 zł)".to_string(),
            -1900
        ))
    );

    Ok(())
}

#[test]
fn weight_exclusion_counts_pallets_and_uncategorised_items() -> TestResult {
    assert_eq!(
        evaluate(&default_policy()?, "carts/mixed_pallets.yml")?,
        Some((
            "Special Discount (Cheapest item for 1 zł)".to_string(),
            -3900
        ))
    );

    Ok(())
}

#[test]
fn pallet_exclusion_drops_cart_into_percentage_bracket() -> TestResult {
    assert_eq!(
        evaluate(&pallet_policy()?, "carts/mixed_pallets.yml")?,
        Some(("Discount (20%)".to_string(), -1280))
    );

    Ok(())
}

#[test]
fn excluding_more_categories_never_raises_eligible_quantity() -> TestResult {
    let loaded = CartFixture::load(fixture("carts/mixed_pallets.yml"))?;

    let exclusion_sets = [
        ExclusionSet::empty(),
        ExclusionSet::from_strs(&["weight"]),
        ExclusionSet::from_strs(&["weight", "pallet_weight"]),
        ExclusionSet::from_strs(&["weight", "pallet_weight", "standard"]),
    ];

    let quantities: Vec<u64> = exclusion_sets
        .iter()
        .map(|exclusions| {
            total_quantity(filter_eligible(&loaded.cart, exclusions, &loaded.catalog))
        })
        .collect();

    assert_eq!(quantities, vec![7, 6, 3, 2]);
    assert!(quantities.windows(2).all(|pair| pair.first() >= pair.get(1)));

    Ok(())
}

#[test]
fn floor_priced_cheapest_unit_emits_no_fee() -> TestResult {
    let yaml = r"
currency: PLN
products:
  pen: { name: Pen, price: '1.00', shipping_category: standard }
  pad: { name: Pad, price: '8.00', shipping_category: standard }
items:
  - { product: pen, quantity: 2 }
  - { product: pad, quantity: 3 }
";
    let loaded = CartFixture::parse(yaml)?;
    let policy = DiscountPolicy::default();

    assert_eq!(policy.evaluate(&loaded.cart, &loaded.catalog)?, None);

    let overall = policy.with_bulk_mode(BulkMode::CheapestOverall);

    assert_eq!(overall.evaluate(&loaded.cart, &loaded.catalog)?, None);

    Ok(())
}

#[test]
fn evaluation_is_repeatable() -> TestResult {
    let policy = default_policy()?;
    let loaded = CartFixture::load(fixture("carts/two_mugs.yml"))?;

    let first = policy.evaluate(&loaded.cart, &loaded.catalog)?;
    let second = policy.evaluate(&loaded.cart, &loaded.catalog)?;

    assert_eq!(first, second);
    assert_eq!(
        first.map(|fee| *fee.amount()),
        Some(Money::from_minor(-1500, PLN))
    );

    Ok(())
}
