//! Exit scenarios for probability-weighted valuation.

use captable_core::types::{Money, ScenarioId};
use captable_waterfall::{ExitTerms, RatchetTerms};
use serde::{Deserialize, Serialize};

use crate::error::PwermError;

/// Tolerance on the discrete probability sum.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The kind of exit a scenario describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitType {
    /// Public offering; the only type that can trigger ratchet floors.
    Ipo,
    /// Trade sale or merger.
    Acquisition,
    /// Secondary share sale.
    Secondary,
    /// Wind-down, typically at or near zero.
    Shutdown,
}

/// One discrete exit scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenario {
    /// Stable identifier.
    pub id: ScenarioId,
    /// The kind of exit.
    #[serde(rename = "type")]
    pub exit_type: ExitType,
    /// Exit value in dollars.
    pub exit_value: Money,
    /// Probability mass assigned to this scenario.
    pub probability: f64,
    /// Years from the valuation date to the exit.
    pub time_to_exit_years: f64,
}

impl ExitScenario {
    /// Creates a scenario.
    pub fn new(
        id: impl Into<String>,
        exit_type: ExitType,
        exit_value: Money,
        probability: f64,
        time_to_exit_years: f64,
    ) -> Self {
        Self {
            id: ScenarioId::new(id),
            exit_type,
            exit_value,
            probability,
            time_to_exit_years,
        }
    }

    /// Whether this is an IPO scenario.
    #[inline]
    pub fn is_ipo(&self) -> bool {
        self.exit_type == ExitType::Ipo
    }

    /// The exit terms this scenario implies for the waterfall engine.
    ///
    /// The ratchet is attached only on IPO scenarios; the engine ignores
    /// it otherwise, but not attaching it keeps the terms honest.
    pub fn exit_terms(&self, ratchet: Option<&RatchetTerms>) -> ExitTerms {
        let mut terms = if self.is_ipo() {
            ExitTerms::ipo(self.exit_value, self.time_to_exit_years)
        } else {
            ExitTerms::liquidation(self.exit_value).with_years_to_exit(self.time_to_exit_years)
        };
        if self.is_ipo() {
            if let Some(ratchet) = ratchet {
                terms = terms.with_ratchet(ratchet.clone());
            }
        }
        terms
    }
}

/// Validates a discrete scenario set.
///
/// Rejects an empty set, negative exit values, probabilities outside
/// [0, 1], and a probability sum off 1 by more than
/// [`PROBABILITY_TOLERANCE`].
pub fn validate_scenarios(scenarios: &[ExitScenario]) -> Result<(), PwermError> {
    if scenarios.is_empty() {
        return Err(PwermError::EmptyScenarioSet);
    }
    let mut total = 0.0;
    for scenario in scenarios {
        if scenario.exit_value.cents() < 0 {
            return Err(PwermError::NegativeExitValue {
                id: scenario.id.clone(),
                value: scenario.exit_value,
            });
        }
        if !scenario.probability.is_finite()
            || !(0.0..=1.0).contains(&scenario.probability)
        {
            return Err(PwermError::InvalidProbability {
                id: scenario.id.clone(),
                probability: scenario.probability,
            });
        }
        total += scenario.probability;
    }
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PwermError::ProbabilitySum { total });
    }
    Ok(())
}
