//! Single-call convenience formulas.
//!
//! Each wrapper builds a minimal two-class cap table (one common, one
//! preferred) and runs the full engine, so the answers are exactly what
//! `allocate` would produce on the equivalent snapshot. They exist for
//! quick term-sheet arithmetic; anything multi-class or multi-round
//! belongs on [`WaterfallEngine`](crate::engine::WaterfallEngine)
//! directly.

use captable_core::types::{Date, Money};
use captable_model::share_class::{AntiDilution, ShareClass};
use captable_model::snapshot::CapTableSnapshot;

use crate::engine::WaterfallEngine;
use crate::error::WaterfallError;

fn two_class_proceeds(
    exit_value: Money,
    preferred: ShareClass,
    common_shares: f64,
) -> Result<Money, WaterfallError> {
    let preferred_id = preferred.id().clone();
    let snapshot = CapTableSnapshot::new(
        vec![
            ShareClass::common("common", "Common", common_shares),
            preferred,
        ],
        Date::today(),
    )?;
    let result = WaterfallEngine::new().allocate(&snapshot, exit_value)?;
    // The class is always present in the snapshot just built
    Ok(result.proceeds_of(&preferred_id).unwrap_or(Money::ZERO))
}

/// Proceeds to a 1x-style non-participating preferred class at
/// `exit_value`, against a single common class.
///
/// The class takes `max(invested * multiple, as-converted share)` via
/// the engine's election solver.
///
/// # Errors
///
/// Propagates engine errors, e.g. a negative exit value.
pub fn non_participating(
    exit_value: Money,
    invested: Money,
    multiple: f64,
    preferred_shares: f64,
    common_shares: f64,
) -> Result<Money, WaterfallError> {
    let price = invested.to_dollars() / preferred_shares;
    let class = ShareClass::preferred("preferred", "Preferred", preferred_shares, invested, price, 1)
        .with_multiple(multiple);
    two_class_proceeds(exit_value, class, common_shares)
}

/// Proceeds to a participating preferred class at `exit_value`, against
/// a single common class.
///
/// The class takes its preference plus a pro-rata share of the
/// residual, total-capped at `cap_multiple * invested` when a cap is
/// given; past the cap the engine converts it if that pays more.
///
/// # Errors
///
/// Propagates engine errors, e.g. a negative exit value.
pub fn participating(
    exit_value: Money,
    invested: Money,
    multiple: f64,
    cap_multiple: Option<f64>,
    preferred_shares: f64,
    common_shares: f64,
) -> Result<Money, WaterfallError> {
    let price = invested.to_dollars() / preferred_shares;
    let class = ShareClass::preferred("preferred", "Preferred", preferred_shares, invested, price, 1)
        .with_multiple(multiple)
        .with_participation(cap_multiple);
    two_class_proceeds(exit_value, class, common_shares)
}

/// Adjusted conversion price after a down round, per the class's
/// anti-dilution protection.
///
/// Returns `old_price` unchanged when the round is not a down round
/// (new price at or above the old conversion price) or the class has no
/// protection. Full ratchet resets to the new price; broad-based
/// weighted average scales by `(A + B) / (A + C)` where `A` is the
/// pre-round fully-diluted share count, `B` the shares the new money
/// would buy at the old price, and `C` the shares actually issued.
pub fn downround_price(
    anti_dilution: AntiDilution,
    old_price: f64,
    new_price: f64,
    pre_round_shares: f64,
    investment: Money,
) -> f64 {
    if new_price >= old_price {
        return old_price;
    }
    match anti_dilution {
        AntiDilution::None => old_price,
        AntiDilution::FullRatchet => new_price,
        AntiDilution::BroadBasedWeightedAverage => {
            let a = pre_round_shares;
            let b = investment.to_dollars() / old_price;
            let c = investment.to_dollars() / new_price;
            old_price * (a + b) / (a + c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dollars(amount: f64) -> Money {
        Money::from_dollars(amount).unwrap()
    }

    #[test]
    fn test_non_participating_takes_preference_below_break_even() {
        let proceeds = non_participating(
            dollars(2_000_000.0),
            dollars(1_000_000.0),
            1.0,
            500.0,
            1_000.0,
        )
        .unwrap();
        assert_eq!(proceeds, dollars(1_000_000.0));
    }

    #[test]
    fn test_non_participating_converts_above_break_even() {
        let proceeds = non_participating(
            dollars(6_000_000.0),
            dollars(1_000_000.0),
            1.0,
            500.0,
            1_000.0,
        )
        .unwrap();
        // 500/1500 of $6M
        assert_eq!(proceeds, dollars(2_000_000.0));
    }

    #[test]
    fn test_participating_double_dips() {
        let proceeds = participating(
            dollars(3_000_000.0),
            dollars(1_000_000.0),
            1.0,
            None,
            1_000.0,
            1_000.0,
        )
        .unwrap();
        // $1M preference + half of the $2M residual
        assert_eq!(proceeds, dollars(2_000_000.0));
    }

    #[test]
    fn test_participating_cap_binds() {
        let proceeds = participating(
            dollars(20_000_000.0),
            dollars(2_000_000.0),
            1.0,
            Some(2.0),
            200.0,
            1_000.0,
        )
        .unwrap();
        // Preferred route pays $5M, capped at $4M; converting pays only
        // 200/1200 of $20M, so the cap is the answer
        assert_eq!(proceeds, dollars(4_000_000.0));
    }

    #[test]
    fn test_downround_full_ratchet_resets_price() {
        let adjusted = downround_price(
            AntiDilution::FullRatchet,
            4.0,
            2.5,
            10_000.0,
            dollars(5_000_000.0),
        );
        assert_relative_eq!(adjusted, 2.5);
    }

    #[test]
    fn test_downround_broad_based_between_prices() {
        let adjusted = downround_price(
            AntiDilution::BroadBasedWeightedAverage,
            4.0,
            2.0,
            10_000.0,
            dollars(10_000.0),
        );
        assert!(adjusted < 4.0 && adjusted > 2.0);
        // A = 10,000, B = 2,500, C = 5,000
        assert_relative_eq!(adjusted, 4.0 * 12_500.0 / 15_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_up_round_leaves_price_alone() {
        let adjusted = downround_price(
            AntiDilution::FullRatchet,
            4.0,
            6.0,
            10_000.0,
            dollars(5_000_000.0),
        );
        assert_relative_eq!(adjusted, 4.0);
    }
}
