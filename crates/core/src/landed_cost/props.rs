//! Property-based tests for landed cost conservation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocator::LandedCostAllocator;
use super::types::AllocationMethod;

fn cents(range: std::ops::Range<i64>) -> impl Strategy<Value = Decimal> {
    range.prop_map(|c| Decimal::new(c, 2))
}

fn method() -> impl Strategy<Value = AllocationMethod> {
    prop_oneof![Just(AllocationMethod::Value), Just(AllocationMethod::Quantity)]
}

proptest! {
    /// Σ allocated cost equals the voucher total for either method.
    #[test]
    fn prop_allocated_cost_is_conserved(
        method in method(),
        total in cents(1..10_000_000),
        items in prop::collection::vec((1i64..10_000, cents(1..5_000_000)), 1..12),
    ) {
        let basis: Vec<(Decimal, Decimal)> = items
            .iter()
            .map(|&(qty, cost)| (Decimal::from(qty), cost))
            .collect();
        let shares = LandedCostAllocator::compute(method, total, &basis).unwrap();

        prop_assert_eq!(shares.len(), basis.len());
        let sum: Decimal = shares.iter().map(|s| s.allocated_cost).sum();
        prop_assert_eq!(sum, total);
        prop_assert!(shares.iter().all(|s| s.allocated_cost >= Decimal::ZERO));
    }

    /// New unit cost times quantity recovers original plus allocated cost
    /// within unit-cost rounding.
    #[test]
    fn prop_unit_cost_reflects_allocation(
        total in cents(1..1_000_000),
        items in prop::collection::vec((1i64..1_000, cents(1..1_000_000)), 1..8),
    ) {
        let basis: Vec<(Decimal, Decimal)> = items
            .iter()
            .map(|&(qty, cost)| (Decimal::from(qty), cost))
            .collect();
        let shares = LandedCostAllocator::compute(AllocationMethod::Value, total, &basis).unwrap();

        for ((qty, cost), share) in basis.iter().zip(&shares) {
            let rebuilt = share.new_unit_cost * qty;
            let tolerance = Decimal::new(5, 5) * qty;
            prop_assert!((rebuilt - (cost + share.allocated_cost)).abs() <= tolerance);
        }
    }
}
