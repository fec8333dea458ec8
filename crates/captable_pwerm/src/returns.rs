//! Per-class return metrics: MOIC and IRR.

use captable_core::math::solvers::{BisectionSolver, NewtonRaphsonSolver, SolverConfig};
use captable_core::types::{year_fraction, Date, Money};
use serde::{Deserialize, Serialize};

use crate::error::PwermError;

/// Multiple on invested capital. Zero when nothing was invested.
#[inline]
pub fn moic(proceeds: Money, invested: Money) -> f64 {
    proceeds.ratio(invested)
}

/// Closed-form IRR for a single investment/exit pair:
/// `MOIC^(1/years) - 1`.
///
/// Returns `None` when the holding period is non-positive or the MOIC
/// is negative, where the closed form has no meaning.
pub fn irr_from_moic(moic: f64, years: f64) -> Option<f64> {
    if years > 0.0 && moic >= 0.0 && moic.is_finite() {
        Some(moic.powf(1.0 / years) - 1.0)
    } else {
        None
    }
}

/// One dated cash flow; investments are negative, proceeds positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    /// Flow date.
    pub date: Date,
    /// Signed amount.
    pub amount: Money,
}

impl CashFlow {
    /// Creates a cash flow.
    pub fn new(date: Date, amount: Money) -> Self {
        Self { date, amount }
    }
}

/// IRR of an irregular cash-flow series (follow-on rounds), the rate
/// `r` at which `Σ amount_i / (1+r)^t_i = 0` with `t_i` in ACT/365F
/// years from the earliest flow.
///
/// Solved by Newton-Raphson from 10%, falling back to bisection on
/// [-0.9999, 100] when Newton diverges.
///
/// # Errors
///
/// [`PwermError::InvalidConfig`] unless the series has at least one
/// inflow and one outflow; [`PwermError::Solver`] when neither method
/// converges.
pub fn irr_irregular(flows: &[CashFlow]) -> Result<f64, PwermError> {
    let any_negative = flows.iter().any(|f| f.amount.cents() < 0);
    let any_positive = flows.iter().any(|f| f.amount.cents() > 0);
    if !any_negative || !any_positive {
        return Err(PwermError::invalid_config(
            "IRR needs at least one investment and one return flow",
        ));
    }

    // flows is non-empty here
    let base = flows.iter().map(|f| f.date).min().unwrap_or(flows[0].date);
    let dated: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| (year_fraction(base, f.date), f.amount.to_dollars()))
        .collect();

    let npv = |r: f64| -> f64 {
        dated
            .iter()
            .map(|&(t, amount)| amount * (1.0 + r).powf(-t))
            .sum()
    };
    let npv_prime = |r: f64| -> f64 {
        dated
            .iter()
            .map(|&(t, amount)| -t * amount * (1.0 + r).powf(-t - 1.0))
            .sum()
    };

    let config = SolverConfig::irr();
    let newton = NewtonRaphsonSolver::new(config);
    match newton.find_root(npv, npv_prime, 0.1) {
        Ok(rate) if rate > -1.0 && rate.is_finite() => Ok(rate),
        _ => {
            let bisection = BisectionSolver::new(config);
            Ok(bisection.find_root(npv, -0.9999, 100.0)?)
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

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_moic() {
        assert_relative_eq!(moic(dollars(3_000_000.0), dollars(1_000_000.0)), 3.0);
        assert_eq!(moic(dollars(1.0), Money::ZERO), 0.0);
    }

    #[test]
    fn test_closed_form_irr() {
        // 4x over 2 years doubles annually
        assert_relative_eq!(irr_from_moic(4.0, 2.0).unwrap(), 1.0, epsilon = 1e-12);
        // 1x is a zero return
        assert_relative_eq!(irr_from_moic(1.0, 5.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(irr_from_moic(2.0, 0.0), None);
        assert_eq!(irr_from_moic(-1.0, 2.0), None);
    }

    #[test]
    fn test_irregular_irr_matches_closed_form_for_single_pair() {
        let flows = vec![
            CashFlow::new(date(2020, 1, 1), dollars(-1_000_000.0)),
            CashFlow::new(date(2024, 1, 1), dollars(4_000_000.0)),
        ];
        let years = year_fraction(date(2020, 1, 1), date(2024, 1, 1));
        let expected = irr_from_moic(4.0, years).unwrap();
        assert_relative_eq!(irr_irregular(&flows).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_irregular_irr_with_follow_on() {
        let flows = vec![
            CashFlow::new(date(2020, 1, 1), dollars(-1_000_000.0)),
            CashFlow::new(date(2022, 1, 1), dollars(-2_000_000.0)),
            CashFlow::new(date(2025, 1, 1), dollars(9_000_000.0)),
        ];
        let rate = irr_irregular(&flows).unwrap();
        // NPV at the solved rate is zero
        let base = date(2020, 1, 1);
        let npv: f64 = flows
            .iter()
            .map(|f| f.amount.to_dollars() * (1.0 + rate).powf(-year_fraction(base, f.date)))
            .sum();
        assert!(npv.abs() < 1.0);
        assert!(rate > 0.0);
    }

    #[test]
    fn test_negative_irr_for_a_loss() {
        let flows = vec![
            CashFlow::new(date(2020, 1, 1), dollars(-1_000_000.0)),
            CashFlow::new(date(2024, 1, 1), dollars(400_000.0)),
        ];
        let rate = irr_irregular(&flows).unwrap();
        assert!(rate < 0.0 && rate > -1.0);
    }

    #[test]
    fn test_one_sided_series_rejected() {
        let flows = vec![
            CashFlow::new(date(2020, 1, 1), dollars(1_000_000.0)),
            CashFlow::new(date(2021, 1, 1), dollars(500_000.0)),
        ];
        assert!(matches!(
            irr_irregular(&flows),
            Err(PwermError::InvalidConfig { .. })
        ));
    }
}
