//! Amount distribution using the Largest Remainder Method.
//!
//! Splits a total across weighted recipients so that the rounded shares sum
//! to exactly the rounded total (no cents lost or gained):
//! 1. Calculate exact shares
//! 2. Round each share toward zero
//! 3. Calculate the remainder (total - sum of rounded shares)
//! 4. Hand one unit of the remainder to each share with the largest fractional part

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Allocation utility for distributing amounts.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Distributes `total` proportionally to `weights`.
    ///
    /// Returns an empty vector when there are no weights or the weights do not
    /// sum to a positive value. Ties in the fractional part go to the earlier
    /// recipient.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ledgerwise_core::currency::AllocationUtil;
    ///
    /// // 100 split by 1:1:1 = [33.34, 33.33, 33.33]
    /// let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(1), dec!(1), dec!(1)], 2);
    /// assert_eq!(result.iter().sum::<rust_decimal::Decimal>(), dec!(100));
    /// ```
    #[must_use]
    pub fn allocate_by_weights(total: Decimal, weights: &[Decimal], decimal_places: u32) -> Vec<Decimal> {
        let weight_sum: Decimal = weights.iter().copied().sum();
        if weights.is_empty() || weight_sum <= Decimal::ZERO {
            return vec![];
        }

        let unit = Decimal::new(1, decimal_places);

        // Round total to target precision first
        let total_rounded =
            total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);

        let exact: Vec<Decimal> = weights
            .iter()
            .map(|w| total_rounded * *w / weight_sum)
            .collect();

        let mut rounded: Vec<Decimal> = exact
            .iter()
            .map(|a| a.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
            .collect();

        let sum_rounded: Decimal = rounded.iter().copied().sum();
        let remainder = total_rounded - sum_rounded;

        let units_to_distribute = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .unwrap_or(0);
        if units_to_distribute == 0 {
            return rounded;
        }

        let step = if units_to_distribute > 0 { unit } else { -unit };
        let units = usize::try_from(units_to_distribute.unsigned_abs()).unwrap_or(0);

        // Largest fractional part first; stable sort keeps earlier recipients ahead on ties.
        let mut remainders: Vec<(usize, Decimal)> = exact
            .iter()
            .zip(rounded.iter())
            .enumerate()
            .map(|(i, (e, r))| (i, (*e - *r).abs()))
            .collect();
        remainders.sort_by(|a, b| b.1.cmp(&a.1));

        for (idx, _) in remainders.iter().cycle().take(units) {
            rounded[*idx] += step;
        }

        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equal_quantities_split_thirds() {
        let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(5), dec!(5), dec!(5)], 2);
        assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }

    #[test]
    fn test_allocate_empty_or_zero_weights() {
        assert!(AllocationUtil::allocate_by_weights(dec!(100), &[], 2).is_empty());
        assert!(AllocationUtil::allocate_by_weights(dec!(100), &[dec!(0), dec!(0)], 2).is_empty());
    }

    #[test]
    fn test_allocate_by_value_weights() {
        // Freight of 100 over goods worth 600 and 400.
        let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(600), dec!(400)], 2);
        assert_eq!(result, vec![dec!(60), dec!(40)]);
    }

    #[test]
    fn test_remainder_goes_to_largest_fraction() {
        // Exact shares: 14.2857, 28.5714, 57.1428
        let result = AllocationUtil::allocate_by_weights(dec!(100), &[dec!(1), dec!(2), dec!(4)], 2);
        assert_eq!(result, vec![dec!(14.29), dec!(28.57), dec!(57.14)]);
        assert_eq!(result.iter().sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_zero_weight_recipient_gets_nothing() {
        let result = AllocationUtil::allocate_by_weights(dec!(50), &[dec!(0), dec!(3)], 2);
        assert_eq!(result, vec![dec!(0), dec!(50)]);
    }

    #[test]
    fn test_sum_invariant() {
        let test_cases = [
            (dec!(100), vec![dec!(33.33), dec!(33.33), dec!(33.34)]),
            (dec!(999.99), vec![dec!(7), dec!(11), dec!(13), dec!(17)]),
            (dec!(0.01), vec![dec!(1), dec!(1), dec!(1)]),
            (dec!(1234.5), vec![dec!(0.5), dec!(2.25), dec!(9)]),
        ];

        for (total, weights) in test_cases {
            let result = AllocationUtil::allocate_by_weights(total, &weights, 2);
            assert_eq!(
                result.iter().sum::<Decimal>(),
                total,
                "Sum invariant failed for total={total}, weights={weights:?}"
            );
        }
    }
}
