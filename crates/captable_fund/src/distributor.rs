//! The fund-level distribution waterfall.
//!
//! Strictly ordered tiers: return LP capital, pay the preferred
//! return, run the GP catch-up, then split the residual by carry.
//! Unlike the company-level waterfall there is no election ambiguity,
//! so the computation is a single pass with no fixed point.

use captable_core::types::{ClassId, Money};
use captable_waterfall::WaterfallResult;
use serde::{Deserialize, Serialize};

use crate::error::FundError;
use crate::terms::FundTerms;

/// A fund's position in one portfolio company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHolding {
    /// Company name, for error reporting.
    pub company: String,
    /// The share class the fund holds in that company.
    pub class_id: ClassId,
    /// The company's exit allocation.
    pub result: WaterfallResult,
}

impl CompanyHolding {
    /// Creates a holding.
    pub fn new(
        company: impl Into<String>,
        class_id: impl Into<String>,
        result: WaterfallResult,
    ) -> Self {
        Self {
            company: company.into(),
            class_id: ClassId::new(class_id),
            result,
        }
    }
}

/// The outcome of the fund waterfall.
///
/// Tier amounts sum exactly to the distributed proceeds; the LP and GP
/// totals are derived, not recomputed, so conservation is structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDistribution {
    /// Proceeds distributed through the waterfall.
    pub total_proceeds: Money,
    /// Tier 1: LP capital returned.
    pub lp_capital: Money,
    /// Tier 2: LP preferred return paid.
    pub lp_preferred: Money,
    /// Tier 3: GP share of the catch-up tier.
    pub gp_catchup: Money,
    /// Tier 3: LP share of the catch-up tier (zero on a full catch-up).
    pub lp_catchup: Money,
    /// Tier 4: GP carry on the residual.
    pub gp_carry: Money,
    /// Tier 4: LP share of the residual.
    pub lp_residual: Money,
    /// All LP tiers combined.
    pub lp_total: Money,
    /// All GP tiers combined.
    pub gp_total: Money,
    /// LP distributions over committed capital (DPI).
    pub dpi: f64,
}

/// Applies the four-tier fund waterfall.
#[derive(Debug, Clone)]
pub struct FundDistributor {
    terms: FundTerms,
}

impl FundDistributor {
    /// Creates a distributor with validated terms.
    ///
    /// # Errors
    ///
    /// [`FundError::InvalidTerms`] when the terms fail validation.
    pub fn new(terms: FundTerms) -> Result<Self, FundError> {
        terms.validate()?;
        Ok(Self { terms })
    }

    /// The distributor's terms.
    pub fn terms(&self) -> &FundTerms {
        &self.terms
    }

    /// Distributes total fund proceeds realized after `years`.
    ///
    /// The preferred return compounds annually on committed capital:
    /// `committed * ((1 + rate)^years - 1)`. The GP catch-up targets
    /// `carry / (1 - carry)` of the preferred return actually paid, so
    /// past the catch-up the GP holds exactly `carry` of all profit
    /// above returned capital.
    ///
    /// # Errors
    ///
    /// [`FundError::Numeric`] if a tier amount leaves the safe range.
    pub fn distribute(&self, proceeds: Money, years: f64) -> Result<FundDistribution, FundError> {
        let terms = &self.terms;
        let mut remaining = proceeds;

        let lp_capital = remaining.min(terms.committed_capital);
        remaining -= lp_capital;

        let preferred_due = terms
            .committed_capital
            .mul_f64((1.0 + terms.preferred_return).powf(years.max(0.0)) - 1.0)?;
        let lp_preferred = remaining.min(preferred_due);
        remaining -= lp_preferred;

        // Catch-up tier: GP takes gp_catchup of each dollar until it
        // holds carry/(1-carry) of the preferred return paid
        let (gp_catchup, lp_catchup) = if terms.gp_catchup > 0.0 {
            let gp_target = lp_preferred.mul_f64(terms.carry / (1.0 - terms.carry))?;
            let tier_total = remaining.min(gp_target.mul_f64(1.0 / terms.gp_catchup)?);
            let gp_share = tier_total.mul_f64(terms.gp_catchup)?;
            remaining -= tier_total;
            (gp_share, tier_total - gp_share)
        } else {
            (Money::ZERO, Money::ZERO)
        };

        let gp_carry = remaining.mul_f64(terms.carry)?;
        let lp_residual = remaining - gp_carry;

        let lp_total = lp_capital + lp_preferred + lp_catchup + lp_residual;
        let gp_total = gp_catchup + gp_carry;
        Ok(FundDistribution {
            total_proceeds: proceeds,
            lp_capital,
            lp_preferred,
            gp_catchup,
            lp_catchup,
            gp_carry,
            lp_residual,
            lp_total,
            gp_total,
            dpi: lp_total.ratio(terms.committed_capital),
        })
    }

    /// Sums the fund's proceeds across a portfolio of company
    /// allocations, then distributes them.
    ///
    /// # Errors
    ///
    /// [`FundError::UnknownClass`] when a holding's class is absent
    /// from its company's allocation.
    pub fn distribute_portfolio(
        &self,
        holdings: &[CompanyHolding],
        years: f64,
    ) -> Result<FundDistribution, FundError> {
        let mut proceeds = Money::ZERO;
        for holding in holdings {
            proceeds += holding.result.proceeds_of(&holding.class_id).ok_or_else(|| {
                FundError::UnknownClass {
                    company: holding.company.clone(),
                    id: holding.class_id.clone(),
                }
            })?;
        }
        self.distribute(proceeds, years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use captable_waterfall::{ClassOutcome, Election};

    fn dollars(amount: f64) -> Money {
        Money::from_dollars(amount).unwrap()
    }

    fn distributor(terms: FundTerms) -> FundDistributor {
        FundDistributor::new(terms).unwrap()
    }

    #[test]
    fn test_proceeds_below_capital_all_to_lp() {
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        let out = d.distribute(dollars(60_000_000.0), 3.0).unwrap();

        assert_eq!(out.lp_capital, dollars(60_000_000.0));
        assert_eq!(out.lp_total, dollars(60_000_000.0));
        assert_eq!(out.gp_total, Money::ZERO);
        assert_relative_eq!(out.dpi, 0.6);
    }

    #[test]
    fn test_full_waterfall_with_catchup() {
        // 8% hurdle over exactly one year: preferred = $8M. $120M in:
        // capital 100, pref 8, catch-up 2 (= 8 × 0.2/0.8), then 10
        // split 80/20.
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        let out = d.distribute(dollars(120_000_000.0), 1.0).unwrap();

        assert_eq!(out.lp_capital, dollars(100_000_000.0));
        assert_eq!(out.lp_preferred, dollars(8_000_000.0));
        assert_eq!(out.gp_catchup, dollars(2_000_000.0));
        assert_eq!(out.lp_catchup, Money::ZERO);
        assert_eq!(out.gp_carry, dollars(2_000_000.0));
        assert_eq!(out.lp_residual, dollars(8_000_000.0));

        // Past the catch-up the GP holds exactly carry of all profit
        assert_eq!(out.gp_total, dollars(4_000_000.0));
        assert_relative_eq!(
            out.gp_total.to_dollars(),
            0.2 * (120_000_000.0 - 100_000_000.0),
            epsilon = 0.01
        );
    }

    #[test]
    fn test_partial_catchup_tier() {
        // Only $1M left after the preferred return; full catch-up
        // sends it all to the GP, still short of its $2M target.
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        let out = d.distribute(dollars(109_000_000.0), 1.0).unwrap();

        assert_eq!(out.lp_preferred, dollars(8_000_000.0));
        assert_eq!(out.gp_catchup, dollars(1_000_000.0));
        assert_eq!(out.gp_carry, Money::ZERO);
    }

    #[test]
    fn test_no_catchup_tier() {
        let d = distributor(
            FundTerms::standard(dollars(100_000_000.0)).with_gp_catchup(0.0),
        );
        let out = d.distribute(dollars(120_000_000.0), 1.0).unwrap();

        assert_eq!(out.gp_catchup, Money::ZERO);
        // Residual after capital + pref is 12M, split 80/20
        assert_eq!(out.gp_carry, dollars(2_400_000.0));
        assert_eq!(out.lp_residual, dollars(9_600_000.0));
    }

    #[test]
    fn test_zero_hurdle_goes_straight_to_carry() {
        let d = distributor(
            FundTerms::standard(dollars(100_000_000.0)).with_preferred_return(0.0),
        );
        let out = d.distribute(dollars(150_000_000.0), 5.0).unwrap();

        assert_eq!(out.lp_preferred, Money::ZERO);
        assert_eq!(out.gp_catchup, Money::ZERO);
        assert_eq!(out.gp_carry, dollars(10_000_000.0));
        assert_relative_eq!(out.dpi, 1.4);
    }

    #[test]
    fn test_conservation_across_tiers() {
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        for proceeds in [0.0, 50_000_000.0, 108_000_000.0, 300_000_000.0] {
            let out = d.distribute(dollars(proceeds), 2.5).unwrap();
            assert_eq!(out.lp_total + out.gp_total, dollars(proceeds));
        }
    }

    #[test]
    fn test_portfolio_sums_holdings() {
        let result = |class: &str, amount: f64| WaterfallResult {
            exit_value: dollars(amount),
            outcomes: vec![ClassOutcome {
                class_id: ClassId::new(class),
                proceeds: dollars(amount),
                election: Election::Preferred,
                return_multiple: 1.0,
                ownership_at_exit: 1.0,
            }],
            converged: true,
            iterations: 1,
        };

        let holdings = vec![
            CompanyHolding::new("acme", "fund-a", result("fund-a", 40_000_000.0)),
            CompanyHolding::new("globex", "fund-b", result("fund-b", 80_000_000.0)),
        ];
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        let out = d.distribute_portfolio(&holdings, 1.0).unwrap();
        assert_eq!(out.total_proceeds, dollars(120_000_000.0));
    }

    #[test]
    fn test_portfolio_unknown_class_names_company() {
        let holdings = vec![CompanyHolding::new(
            "acme",
            "missing",
            WaterfallResult {
                exit_value: Money::ZERO,
                outcomes: vec![],
                converged: true,
                iterations: 0,
            },
        )];
        let d = distributor(FundTerms::standard(dollars(100_000_000.0)));
        match d.distribute_portfolio(&holdings, 1.0) {
            Err(FundError::UnknownClass { company, .. }) => assert_eq!(company, "acme"),
            other => panic!("expected UnknownClass, got {:?}", other),
        }
    }
}
