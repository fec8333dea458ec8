//! Fund economic terms.

use captable_core::types::Money;
use serde::{Deserialize, Serialize};

use crate::error::FundError;

/// The economic terms of a fund's LP/GP split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundTerms {
    /// LP capital committed to the fund.
    pub committed_capital: Money,
    /// Annual preferred return (hurdle) rate, e.g. 0.08.
    pub preferred_return: f64,
    /// GP carried interest share of profits, e.g. 0.20.
    pub carry: f64,
    /// GP share of each dollar in the catch-up tier; 1.0 is a full
    /// catch-up, 0.0 disables the tier.
    pub gp_catchup: f64,
}

impl FundTerms {
    /// Standard 2-and-20 style terms: 8% hurdle, 20% carry, full
    /// catch-up.
    pub fn standard(committed_capital: Money) -> Self {
        Self {
            committed_capital,
            preferred_return: 0.08,
            carry: 0.20,
            gp_catchup: 1.0,
        }
    }

    /// Sets the preferred return rate.
    pub fn with_preferred_return(mut self, rate: f64) -> Self {
        self.preferred_return = rate;
        self
    }

    /// Sets the carry share.
    pub fn with_carry(mut self, carry: f64) -> Self {
        self.carry = carry;
        self
    }

    /// Sets the GP catch-up share.
    pub fn with_gp_catchup(mut self, gp_catchup: f64) -> Self {
        self.gp_catchup = gp_catchup;
        self
    }

    /// Validates the terms.
    ///
    /// # Errors
    ///
    /// [`FundError::InvalidTerms`] for non-positive committed capital
    /// or any rate outside [0, 1]; carry at exactly 1 is rejected
    /// because the catch-up target `carry / (1 - carry)` is undefined
    /// there.
    pub fn validate(&self) -> Result<(), FundError> {
        if !self.committed_capital.is_positive() {
            return Err(FundError::invalid_terms(
                "committed capital must be positive",
            ));
        }
        for (name, rate) in [
            ("preferred return", self.preferred_return),
            ("carry", self.carry),
            ("GP catch-up", self.gp_catchup),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(FundError::invalid_terms(format!(
                    "{} must be within [0, 1]",
                    name
                )));
            }
        }
        if self.carry >= 1.0 {
            return Err(FundError::invalid_terms("carry must be below 1"));
        }
        Ok(())
    }
}
