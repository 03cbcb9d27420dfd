//! Property-based tests for currency conversion and weighted distribution.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocation::AllocationUtil;
use super::service::CurrencyService;

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate 1-20 weights, at least one of them positive.
fn weights() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0i64..1_000_000i64, 1..20)
        .prop_filter("at least one positive weight", |v| v.iter().any(|w| *w > 0))
        .prop_map(|v| v.into_iter().map(|w| Decimal::new(w, 2)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conversion result always has at most 4 decimal places.
    #[test]
    fn prop_convert_rounds_to_4_decimals(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let result = CurrencyService::convert(amount, rate);
        prop_assert!(result.scale() <= 4, "Result {} has more than 4 decimal places", result);
    }

    /// Converting at rate 1 preserves the amount.
    #[test]
    fn prop_unit_rate_preserves_amount(amount in positive_amount()) {
        prop_assert_eq!(CurrencyService::convert(amount, Decimal::ONE), amount);
    }

    /// Weighted shares always sum to the rounded total.
    #[test]
    fn prop_weighted_sum_invariant(
        total in positive_amount(),
        weights in weights(),
        decimal_places in 0u32..=4,
    ) {
        let result = AllocationUtil::allocate_by_weights(total, &weights, decimal_places);
        let sum: Decimal = result.iter().copied().sum();
        prop_assert_eq!(result.len(), weights.len());
        prop_assert_eq!(sum, CurrencyService::round(total, decimal_places));
    }

    /// No share is negative and zero weights receive nothing.
    #[test]
    fn prop_weighted_shares_non_negative(
        total in positive_amount(),
        weights in weights(),
    ) {
        let result = AllocationUtil::allocate_by_weights(total, &weights, 2);
        for (share, weight) in result.iter().zip(weights.iter()) {
            prop_assert!(*share >= Decimal::ZERO);
            if weight.is_zero() {
                prop_assert!(share.is_zero(), "zero weight got {}", share);
            }
        }
    }

    /// Each share is within one unit of its exact proportional value.
    #[test]
    fn prop_weighted_shares_are_proportional(
        total in positive_amount(),
        weights in weights(),
    ) {
        let weight_sum: Decimal = weights.iter().copied().sum();
        let result = AllocationUtil::allocate_by_weights(total, &weights, 2);
        for (share, weight) in result.iter().zip(weights.iter()) {
            let exact = total * *weight / weight_sum;
            prop_assert!((*share - exact).abs() < Decimal::new(1, 2));
        }
    }
}
