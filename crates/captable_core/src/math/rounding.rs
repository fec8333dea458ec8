//! Conserving pro-rata allocation of integer money.
//!
//! Splitting a pool across holders by naive rounding loses or invents
//! cents; repeated over the passes of a waterfall those cents break the
//! books. The allocators here use the largest-remainder method: floor
//! every share, then hand the leftover cents to the entries with the
//! largest fractional remainders, so the parts always sum to the total
//! exactly.
//!
//! Two variants cover the two kinds of weight that occur in practice:
//! - [`allocate_pro_rata`]: f64 weights (as-converted share counts)
//! - [`allocate_by_amounts`]: money weights (pari passu by invested
//!   amount), computed entirely in integer arithmetic

use thiserror::Error;

use crate::types::Money;

/// Errors from pro-rata allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProRataError {
    /// A weight was negative, NaN, or infinite.
    #[error("Invalid weight {value} at index {index}")]
    InvalidWeight {
        /// Position of the offending weight.
        index: usize,
        /// The offending weight.
        value: f64,
    },

    /// The pool to split was negative.
    #[error("Cannot allocate a negative total of {total}")]
    NegativeTotal {
        /// The offending total.
        total: Money,
    },

    /// A non-zero pool was given weights that sum to zero.
    #[error("Cannot allocate {total} across weights summing to zero")]
    ZeroWeightSum {
        /// The pool that had no valid recipients.
        total: Money,
    },
}

/// Splits `total` across `weights` proportionally, conserving the total.
///
/// Each entry receives `total * weight / sum(weights)` floored to whole
/// cents; the leftover cents go one apiece to the entries with the
/// largest fractional remainders (ties broken by position, so the split
/// is deterministic).
///
/// # Arguments
/// * `total` - Non-negative pool to distribute
/// * `weights` - Non-negative finite weights, one per recipient
///
/// # Returns
/// A vector the same length as `weights` whose sum equals `total`
/// exactly. A zero total with zero weights yields all zeros.
///
/// # Errors
/// - `ProRataError::InvalidWeight` for negative or non-finite weights
/// - `ProRataError::NegativeTotal` for a negative pool
/// - `ProRataError::ZeroWeightSum` when a non-zero pool has no recipients
///
/// # Examples
///
/// ```
/// use captable_core::math::rounding::allocate_pro_rata;
/// use captable_core::types::Money;
///
/// let pool = Money::from_cents(100);
/// let parts = allocate_pro_rata(pool, &[1.0, 1.0, 1.0]).unwrap();
///
/// assert_eq!(parts.iter().copied().sum::<Money>(), pool);
/// assert_eq!(parts[0], Money::from_cents(34)); // takes the leftover cent
/// assert_eq!(parts[1], Money::from_cents(33));
/// assert_eq!(parts[2], Money::from_cents(33));
/// ```
pub fn allocate_pro_rata(total: Money, weights: &[f64]) -> Result<Vec<Money>, ProRataError> {
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ProRataError::InvalidWeight { index, value });
        }
    }
    if total.cents() < 0 {
        return Err(ProRataError::NegativeTotal { total });
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        if total.is_zero() {
            return Ok(vec![Money::ZERO; weights.len()]);
        }
        return Err(ProRataError::ZeroWeightSum { total });
    }

    let total_cents = total.cents();
    let mut floors: Vec<i64> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(weights.len());
    for (index, &weight) in weights.iter().enumerate() {
        let exact = total_cents as f64 * (weight / weight_sum);
        let floor = exact.floor() as i64;
        floors.push(floor);
        remainders.push((index, exact - floor as f64));
    }

    let mut leftover = total_cents - floors.iter().sum::<i64>();

    // f64 noise can overshoot a floor by a cent; take those back from the
    // smallest remainders before distributing.
    if leftover < 0 {
        remainders.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        'strip: loop {
            for &(index, _) in &remainders {
                if leftover == 0 {
                    break 'strip;
                }
                if floors[index] > 0 {
                    floors[index] -= 1;
                    leftover += 1;
                }
            }
        }
        return Ok(floors.into_iter().map(Money::from_cents).collect());
    }

    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for &(index, _) in remainders.iter().cycle().take(leftover as usize) {
        floors[index] += 1;
    }

    Ok(floors.into_iter().map(Money::from_cents).collect())
}

/// Splits `total` proportionally to money weights, in integer arithmetic.
///
/// Used for pari passu groups, where an insufficient preference pool is
/// shared in proportion to invested amounts. The computation runs in
/// i128, so the proportionality is exact: equal invested amounts always
/// receive equal cents up to the indivisible remainder, which goes to
/// the earlier entries.
///
/// # Errors
/// Same conditions as [`allocate_pro_rata`], with negative money weights
/// reported as `InvalidWeight`.
///
/// # Examples
///
/// ```
/// use captable_core::math::rounding::allocate_by_amounts;
/// use captable_core::types::Money;
///
/// let pool = Money::from_dollars(900_000.0).unwrap();
/// let invested = [
///     Money::from_dollars(2_000_000.0).unwrap(),
///     Money::from_dollars(1_000_000.0).unwrap(),
/// ];
///
/// let parts = allocate_by_amounts(pool, &invested).unwrap();
/// assert_eq!(parts[0], Money::from_dollars(600_000.0).unwrap());
/// assert_eq!(parts[1], Money::from_dollars(300_000.0).unwrap());
/// ```
pub fn allocate_by_amounts(total: Money, weights: &[Money]) -> Result<Vec<Money>, ProRataError> {
    for (index, &value) in weights.iter().enumerate() {
        if value.cents() < 0 {
            return Err(ProRataError::InvalidWeight {
                index,
                value: value.to_dollars(),
            });
        }
    }
    if total.cents() < 0 {
        return Err(ProRataError::NegativeTotal { total });
    }

    let weight_sum: i128 = weights.iter().map(|w| w.cents() as i128).sum();
    if weight_sum == 0 {
        if total.is_zero() {
            return Ok(vec![Money::ZERO; weights.len()]);
        }
        return Err(ProRataError::ZeroWeightSum { total });
    }

    let total_cents = total.cents() as i128;
    let mut floors: Vec<i64> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(weights.len());
    for (index, &weight) in weights.iter().enumerate() {
        let numerator = total_cents * weight.cents() as i128;
        floors.push((numerator / weight_sum) as i64);
        remainders.push((index, numerator % weight_sum));
    }

    let leftover = (total_cents - floors.iter().map(|&f| f as i128).sum::<i128>()) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(index, _) in remainders.iter().take(leftover) {
        floors[index] += 1;
    }

    Ok(floors.into_iter().map(Money::from_cents).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights_conserve_total() {
        let pool = Money::from_cents(100);
        let parts = allocate_pro_rata(pool, &[1.0, 1.0, 1.0]).unwrap();

        assert_eq!(parts.iter().copied().sum::<Money>(), pool);
        assert_eq!(parts.len(), 3);
        // Leftover cent lands deterministically on the first entry
        assert_eq!(parts[0].cents(), 34);
        assert_eq!(parts[1].cents(), 33);
        assert_eq!(parts[2].cents(), 33);
    }

    #[test]
    fn test_proportionality() {
        let pool = Money::from_dollars(1_000.0).unwrap();
        let parts = allocate_pro_rata(pool, &[3.0, 1.0]).unwrap();

        assert_eq!(parts[0], Money::from_dollars(750.0).unwrap());
        assert_eq!(parts[1], Money::from_dollars(250.0).unwrap());
    }

    #[test]
    fn test_zero_weight_gets_nothing() {
        let pool = Money::from_cents(1_000);
        let parts = allocate_pro_rata(pool, &[1.0, 0.0]).unwrap();

        assert_eq!(parts[0], pool);
        assert_eq!(parts[1], Money::ZERO);
    }

    #[test]
    fn test_zero_total_zero_weights_ok() {
        let parts = allocate_pro_rata(Money::ZERO, &[0.0, 0.0]).unwrap();
        assert_eq!(parts, vec![Money::ZERO, Money::ZERO]);

        let empty = allocate_pro_rata(Money::ZERO, &[]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_rejects_invalid_weight() {
        let pool = Money::from_cents(100);
        assert!(matches!(
            allocate_pro_rata(pool, &[1.0, -0.5]),
            Err(ProRataError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            allocate_pro_rata(pool, &[f64::NAN]),
            Err(ProRataError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_negative_total() {
        assert!(matches!(
            allocate_pro_rata(Money::from_cents(-1), &[1.0]),
            Err(ProRataError::NegativeTotal { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_weight_sum_with_nonzero_total() {
        assert!(matches!(
            allocate_pro_rata(Money::from_cents(100), &[0.0, 0.0]),
            Err(ProRataError::ZeroWeightSum { .. })
        ));
        assert!(matches!(
            allocate_pro_rata(Money::from_cents(100), &[]),
            Err(ProRataError::ZeroWeightSum { .. })
        ));
    }

    #[test]
    fn test_by_amounts_exact_proportionality() {
        let pool = Money::from_dollars(500_000.0).unwrap();
        let invested = [
            Money::from_dollars(1_000_000.0).unwrap(),
            Money::from_dollars(1_000_000.0).unwrap(),
        ];

        let parts = allocate_by_amounts(pool, &invested).unwrap();
        assert_eq!(parts[0], parts[1]);
        assert_eq!(parts.iter().copied().sum::<Money>(), pool);
    }

    #[test]
    fn test_by_amounts_odd_cent_goes_to_first() {
        let pool = Money::from_cents(101);
        let invested = [Money::from_cents(100), Money::from_cents(100)];

        let parts = allocate_by_amounts(pool, &invested).unwrap();
        assert_eq!(parts[0].cents(), 51);
        assert_eq!(parts[1].cents(), 50);
    }

    #[test]
    fn test_by_amounts_three_to_one() {
        let pool = Money::from_dollars(800.0).unwrap();
        let invested = [
            Money::from_dollars(3_000.0).unwrap(),
            Money::from_dollars(1_000.0).unwrap(),
        ];

        let parts = allocate_by_amounts(pool, &invested).unwrap();
        assert_eq!(parts[0], Money::from_dollars(600.0).unwrap());
        assert_eq!(parts[1], Money::from_dollars(200.0).unwrap());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn weights_strategy() -> impl Strategy<Value = Vec<f64>> {
            proptest::collection::vec(0.0f64..1e9, 1..20)
        }

        proptest! {
            #[test]
            fn test_conservation(
                total_cents in 0i64..10_000_000_000i64,
                weights in weights_strategy(),
            ) {
                let total = Money::from_cents(total_cents);
                if let Ok(parts) = allocate_pro_rata(total, &weights) {
                    let sum: Money = parts.iter().copied().sum();
                    prop_assert_eq!(sum, total);
                    for part in parts {
                        prop_assert!(part.cents() >= 0);
                    }
                }
            }

            #[test]
            fn test_by_amounts_conservation(
                total_cents in 0i64..10_000_000_000i64,
                weight_cents in proptest::collection::vec(0i64..1_000_000_000_000i64, 1..20),
            ) {
                let total = Money::from_cents(total_cents);
                let weights: Vec<Money> = weight_cents.into_iter().map(Money::from_cents).collect();
                if let Ok(parts) = allocate_by_amounts(total, &weights) {
                    let sum: Money = parts.iter().copied().sum();
                    prop_assert_eq!(sum, total);
                    for part in parts {
                        prop_assert!(part.cents() >= 0);
                    }
                }
            }

            #[test]
            fn test_equal_weights_differ_by_at_most_one_cent(
                total_cents in 0i64..1_000_000_000i64,
                n in 1usize..32,
            ) {
                let total = Money::from_cents(total_cents);
                let weights = vec![1.0; n];
                let parts = allocate_pro_rata(total, &weights).unwrap();

                let min = parts.iter().map(|m| m.cents()).min().unwrap();
                let max = parts.iter().map(|m| m.cents()).max().unwrap();
                prop_assert!(max - min <= 1);
            }
        }
    }
}
