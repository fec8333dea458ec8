//! JSON request/response contract for the PWERM boundary.

use std::collections::BTreeMap;

use captable_core::types::Date;
use captable_model::share_class::ShareClass;
use captable_model::snapshot::CapTableSnapshot;
use serde::{Deserialize, Serialize};

use crate::aggregator::{Percentiles, PwermAggregator, PwermConfig, PwermSummary};
use crate::error::PwermError;
use crate::scenario::ExitScenario;

/// A `PWERM.run` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwermRequest {
    /// Share classes making up the cap table.
    pub share_classes: Vec<ShareClass>,
    /// Discrete exit scenarios; probabilities must sum to 1.
    pub scenarios: Vec<ExitScenario>,
    /// Annual discount rate for the adjusted expected value.
    #[serde(default)]
    pub discount_rate: f64,
    /// Valuation date; defaults to today.
    #[serde(default)]
    pub as_of: Option<Date>,
}

impl PwermRequest {
    /// Validates the cap table and scenarios and runs the aggregation.
    ///
    /// # Errors
    ///
    /// Returns [`PwermError`] for a malformed cap table or scenario set.
    pub fn run(&self) -> Result<PwermResponse, PwermError> {
        let as_of = self.as_of.unwrap_or_else(Date::today);
        let snapshot = CapTableSnapshot::new(self.share_classes.clone(), as_of)
            .map_err(captable_waterfall::WaterfallError::Model)?;
        let config = PwermConfig::default().with_discount_rate(self.discount_rate);
        let summary = PwermAggregator::new(config).run(&snapshot, &self.scenarios)?;
        Ok(PwermResponse::from_summary(&summary))
    }
}

/// One scenario's outcome on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRow {
    /// Scenario id.
    pub id: String,
    /// Probability mass.
    pub probability: f64,
    /// Exit value in dollars.
    pub exit_value: f64,
    /// Proceeds per class, in dollars.
    pub proceeds: BTreeMap<String, f64>,
}

/// A `PWERM.run` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwermResponse {
    /// Probability-weighted expected exit value, in dollars.
    pub expected_exit_value: f64,
    /// Discounted expected exit value, in dollars.
    pub adjusted_expected_value: f64,
    /// Median exit value, in dollars.
    pub median_exit_value: f64,
    /// Exit-value percentiles.
    pub percentiles: Percentiles,
    /// Probability of an exit above the success floor.
    pub success_probability: f64,
    /// Probability of an IPO exit.
    pub ipo_probability: f64,
    /// Per-scenario allocations.
    pub per_scenario: Vec<ScenarioRow>,
}

impl PwermResponse {
    /// Flattens a [`PwermSummary`] into the wire shape.
    pub fn from_summary(summary: &PwermSummary) -> Self {
        let per_scenario = summary
            .per_scenario
            .iter()
            .map(|outcome| ScenarioRow {
                id: outcome.scenario_id.to_string(),
                probability: outcome.probability,
                exit_value: outcome.exit_value.to_dollars(),
                proceeds: outcome
                    .result
                    .outcomes
                    .iter()
                    .map(|o| (o.class_id.to_string(), o.proceeds.to_dollars()))
                    .collect(),
            })
            .collect();
        Self {
            expected_exit_value: summary.expected_exit_value.to_dollars(),
            adjusted_expected_value: summary.adjusted_expected_value.to_dollars(),
            median_exit_value: summary.median_exit_value.to_dollars(),
            percentiles: summary.percentiles,
            success_probability: summary.success_probability,
            ipo_probability: summary.ipo_probability,
            per_scenario,
        }
    }
}
