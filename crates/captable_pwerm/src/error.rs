//! PWERM aggregation error types.

use captable_core::math::stats::StatsError;
use captable_core::types::{Money, MoneyError, ScenarioId, SolverError};
use captable_waterfall::WaterfallError;
use thiserror::Error;

/// PWERM aggregation and sampling errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PwermError {
    /// No scenarios were given.
    #[error("Scenario set is empty")]
    EmptyScenarioSet,

    /// Discrete scenario probabilities did not sum to 1.
    #[error("Scenario probabilities sum to {total}, expected 1 within 1e-6")]
    ProbabilitySum {
        /// The actual probability sum.
        total: f64,
    },

    /// A scenario probability was outside [0, 1] or non-finite.
    #[error("Scenario '{id}' has invalid probability {probability}")]
    InvalidProbability {
        /// The offending scenario.
        id: ScenarioId,
        /// Its probability.
        probability: f64,
    },

    /// A scenario carried a negative exit value.
    #[error("Scenario '{id}' has negative exit value {value}")]
    NegativeExitValue {
        /// The offending scenario.
        id: ScenarioId,
        /// Its exit value.
        value: Money,
    },

    /// A sampler or aggregator configuration value was invalid.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// The caller cancelled a Monte Carlo run.
    #[error("Cancelled after {completed} samples")]
    Cancelled {
        /// Samples completed before the token was observed.
        completed: usize,
    },

    /// An underlying allocation failed.
    #[error("Allocation failed: {0}")]
    Waterfall(#[from] WaterfallError),

    /// Percentile computation failed.
    #[error("Statistics failed: {0}")]
    Stats(#[from] StatsError),

    /// Money arithmetic left the safe integer range.
    #[error("Numeric overflow: {0}")]
    Numeric(#[from] MoneyError),

    /// The IRR solve on an irregular cash-flow series failed.
    #[error("IRR solve failed: {0}")]
    Solver(#[from] SolverError),
}

impl PwermError {
    /// Shorthand for an [`PwermError::InvalidConfig`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_sum_display() {
        let err = PwermError::ProbabilitySum { total: 0.98 };
        assert_eq!(
            format!("{}", err),
            "Scenario probabilities sum to 0.98, expected 1 within 1e-6"
        );
    }

    #[test]
    fn test_negative_exit_display() {
        let err = PwermError::NegativeExitValue {
            id: ScenarioId::new("downside"),
            value: Money::from_cents(-500),
        };
        assert_eq!(
            format!("{}", err),
            "Scenario 'downside' has negative exit value -5.00"
        );
    }

    #[test]
    fn test_from_waterfall_error() {
        let err: PwermError = WaterfallError::NegativeExitValue {
            value: Money::from_cents(-1),
        }
        .into();
        assert!(matches!(err, PwermError::Waterfall(_)));
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = PwermError::Cancelled { completed: 512 };
        let _: &dyn std::error::Error = &err;
    }
}
