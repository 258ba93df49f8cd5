//! Landed cost and margin tests
//!
//! Exercises the cost engine the approval stage runs on:
//! - The landed cost never falls below CIF
//! - A worked RMB quotation priced end to end
//! - The target FOB price brings the margin back to target
//! - Case rounding and minimum order boundaries

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    adjust_to_case_multiple, analyze, calculate_landed_cost, calculate_selling_cost,
    is_below_minimum_order, Configuration, CostParameters, Currency, Money, QuantityPlan,
    SurchargeTier, TARGET_PRICE_FLOOR,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn params() -> CostParameters {
    let config: Configuration = serde_json::from_value(serde_json::json!({
        "exchange_rates": { "rmb_to_usd": "0.14", "usd_to_local": "950" },
        "container_cbm": "60",
        "fixed_costs_usd": { "ocean_freight": "3000", "port_handling": "340" },
        "fixed_costs_local": { "customs_broker": "646000" },
        "variable_costs": {
            "supplier_commission": "0.05",
            "container_insurance": "0.02",
            "import_duty": "0.06",
            "vat": "0.19"
        },
        "marketplace": {
            "commission_pct": "0.13",
            "shipping_threshold": "19990",
            "shipping_cost": "3500",
            "medium_threshold": "9990",
            "medium_charge": "1000",
            "low_charge": "700"
        }
    }))
    .unwrap();
    config.resolve().unwrap()
}

fn rmb(amount: &str) -> Money {
    Money::new(dec(amount), Currency::Rmb)
}

// ============================================================================
// Landed cost
// ============================================================================

#[test]
fn test_worked_rmb_quotation() {
    let params = params();
    let b = calculate_landed_cost(rmb("100"), dec("0.06"), &params).unwrap();

    assert_eq!(b.fob_usd, dec("14"));
    assert_eq!(b.supplier_commission_usd, dec("0.7"));
    assert_eq!(b.fob_plus_commission_usd, dec("14.7"));
    // 3000 USD over 60 m³, 0.06 m³ per unit
    assert_eq!(b.freight_per_unit_usd, dec("3"));
    assert_eq!(b.insurance_usd, dec("0.354"));
    assert_eq!(b.cif_usd, dec("18.054"));
    assert_eq!(b.cif_local, dec("17151.3"));
    assert_eq!(b.import_duty_local, dec("1029.078"));
    assert_eq!(b.vat_local, dec("3454.27182"));
    // (646000 / 950 + 340) USD pooled = 1020 USD, 0.1% of the container
    assert_eq!(b.pooled_overhead_usd, dec("1020"));
    assert_eq!(b.logistics_cost_local, dec("969"));
    assert_eq!(b.landed_cost_local, dec("22603.64982"));
}

#[test]
fn test_usd_quotation_skips_conversion() {
    let params = params();
    let b = calculate_landed_cost(Money::new(dec("14"), Currency::Usd), dec("0.068"), &params)
        .unwrap();
    assert_eq!(b.rate_to_usd, Decimal::ONE);
    assert_eq!(b.fob_usd, dec("14"));
}

#[test]
fn test_zero_volume_carries_no_freight_or_logistics() {
    let params = params();
    let b = calculate_landed_cost(rmb("100"), Decimal::ZERO, &params).unwrap();
    assert_eq!(b.freight_per_unit_usd, Decimal::ZERO);
    assert_eq!(b.logistics_cost_local, Decimal::ZERO);
    assert!(b.landed_cost_local > b.cif_local);
}

proptest! {
    /// Duty, VAT and logistics are never negative, so landed cost >= CIF
    #[test]
    fn prop_landed_cost_at_least_cif(
        fob_cents in 1i64..10_000_000i64,
        volume in 0i64..100_000i64,
        usd in proptest::bool::ANY,
    ) {
        let params = params();
        let currency = if usd { Currency::Usd } else { Currency::Rmb };
        let b = calculate_landed_cost(
            Money::new(Decimal::new(fob_cents, 2), currency),
            Decimal::new(volume, 5),
            &params,
        )
        .unwrap();
        prop_assert!(b.landed_cost_local >= b.cif_local);
        prop_assert!(b.cif_usd >= b.fob_plus_commission_usd);
    }

    /// Landed cost grows with the quoted price
    #[test]
    fn prop_landed_cost_monotonic_in_fob(
        fob_cents in 1i64..1_000_000i64,
        extra in 1i64..1_000_000i64,
        volume in 1i64..100_000i64,
    ) {
        let params = params();
        let volume = Decimal::new(volume, 5);
        let low = calculate_landed_cost(
            Money::new(Decimal::new(fob_cents, 2), Currency::Rmb),
            volume,
            &params,
        )
        .unwrap();
        let high = calculate_landed_cost(
            Money::new(Decimal::new(fob_cents + extra, 2), Currency::Rmb),
            volume,
            &params,
        )
        .unwrap();
        prop_assert!(high.landed_cost_local > low.landed_cost_local);
    }
}

// ============================================================================
// Marketplace and margin
// ============================================================================

#[test]
fn test_surcharge_tier_boundaries() {
    let fees = params().marketplace;
    assert_eq!(SurchargeTier::for_price(dec("19990"), &fees), SurchargeTier::Shipping);
    assert_eq!(SurchargeTier::for_price(dec("19989.99"), &fees), SurchargeTier::Medium);
    assert_eq!(SurchargeTier::for_price(dec("9990"), &fees), SurchargeTier::Medium);
    assert_eq!(SurchargeTier::for_price(dec("9989"), &fees), SurchargeTier::Low);
    assert_eq!(SurchargeTier::for_price(Decimal::ZERO, &fees), SurchargeTier::None);
}

#[test]
fn test_selling_cost_adds_commission_and_surcharge() {
    let fees = params().marketplace;
    let cost = calculate_selling_cost(dec("50000"), &fees).unwrap();
    assert_eq!(cost.commission, dec("6500"));
    assert_eq!(cost.surcharge, dec("3500"));
    assert_eq!(cost.total, dec("10000"));
}

#[test]
fn test_healthy_margin_has_no_target() {
    let analysis = analyze(rmb("100"), dec("0.068"), dec("50000"), &params()).unwrap();
    assert!(!analysis.margin.below_target);
    assert!(analysis.target_price.is_none());
    assert!(analysis.target_purchase_price().is_none());
}

#[test]
fn test_thin_margin_solves_target() {
    let analysis = analyze(rmb("100"), dec("0.068"), dec("30000"), &params()).unwrap();
    assert!(analysis.margin.below_target);

    let target = analysis.target_price.as_ref().unwrap();
    assert!(!target.clamped);
    assert!(target.target_fob_foreign < dec("100"));
    let price = analysis.target_purchase_price().unwrap();
    assert_eq!(price.currency, Currency::Rmb);
    assert_eq!(price.amount, price.amount.round_dp(2));
}

#[test]
fn test_unreachable_target_is_clamped_to_floor() {
    // Logistics and selling cost alone exceed the target landed cost
    let analysis = analyze(rmb("100"), dec("0.068"), dec("1000"), &params()).unwrap();
    let target = analysis.target_price.unwrap();
    assert!(target.clamped);
    assert!(target.unclamped_fob_foreign < TARGET_PRICE_FLOOR);
    assert_eq!(target.target_fob_foreign, TARGET_PRICE_FLOOR);
}

proptest! {
    /// Repricing at the solved FOB lands on the target margin
    #[test]
    fn prop_target_price_round_trip(
        fob_cents in 1_000i64..1_000_000i64,
        volume in 100i64..100_000i64,
        price_units in 5_000i64..500_000i64,
    ) {
        let params = params();
        let volume = Decimal::new(volume, 5);
        let selling_price = Decimal::new(price_units, 0);
        let analysis = analyze(
            Money::new(Decimal::new(fob_cents, 2), Currency::Rmb),
            volume,
            selling_price,
            &params,
        )
        .unwrap();

        if let Some(target) = analysis.target_price {
            prop_assume!(target.unclamped_fob_foreign > Decimal::ZERO);
            let repriced = analyze(
                Money::new(target.unclamped_fob_foreign, Currency::Rmb),
                volume,
                selling_price,
                &params,
            )
            .unwrap();
            let drift = (repriced.margin.margin_pct - repriced.margin.target_margin_pct).abs();
            prop_assert!(drift < dec("0.0001"), "margin drifted by {}", drift);
        }
    }
}

// ============================================================================
// Purchase quantities
// ============================================================================

#[test]
fn test_exact_case_multiple_is_unchanged() {
    assert_eq!(adjust_to_case_multiple(48, 48), 48);
    assert_eq!(adjust_to_case_multiple(49, 48), 96);
    assert_eq!(adjust_to_case_multiple(1, 48), 48);
}

#[test]
fn test_minimum_order_boundary() {
    assert!(!is_below_minimum_order(500, Some(500)));
    assert!(is_below_minimum_order(499, Some(500)));
    assert!(!is_below_minimum_order(1, None));
}

#[test]
fn test_override_replaces_adjusted_quantity() {
    let plan = QuantityPlan::new(100, 48, Some(300), Some(500));
    assert_eq!(plan.adjusted_quantity, 144);
    assert_eq!(plan.purchase_quantity, 300);
    assert!(plan.below_minimum_order);
}
