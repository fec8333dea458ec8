//! Probability-weighted expected return aggregation.
//!
//! Discrete mode runs one waterfall allocation per scenario and weights
//! the outcomes by scenario probability. Monte Carlo mode does the same
//! with equal weights over sampled exit values, fanning allocations out
//! across cores and checking a cancellation token between chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use captable_core::math::stats::WeightedCdf;
use captable_core::types::{ClassId, Money, ScenarioId};
use captable_model::snapshot::CapTableSnapshot;
use captable_waterfall::{ExitTerms, RatchetTerms, WaterfallEngine, WaterfallResult};
use serde::{Deserialize, Serialize};

use crate::error::PwermError;
use crate::parallel;
use crate::returns::{irr_from_moic, moic};
use crate::sampler::{MonteCarloConfig, MonteCarloSampler};
use crate::scenario::{validate_scenarios, ExitScenario};

/// How many Monte Carlo samples run between cancellation checks.
pub const DEFAULT_CANCEL_CHECK_INTERVAL: usize = 256;

/// Cooperative cancellation token for long Monte Carlo runs.
///
/// Cloning shares the flag, so a caller can hold one clone and hand the
/// other to the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// PWERM aggregation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PwermConfig {
    /// Annual discount rate applied per scenario in the adjusted
    /// expected value.
    pub discount_rate: f64,
    /// Exits strictly above this value count as successes.
    pub success_floor: Money,
    /// Ratchet floor applied on IPO exits, if any.
    pub ipo_ratchet: Option<RatchetTerms>,
    /// Samples between cancellation checks in Monte Carlo mode.
    pub check_every: usize,
}

impl Default for PwermConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.0,
            success_floor: Money::ZERO,
            ipo_ratchet: None,
            check_every: DEFAULT_CANCEL_CHECK_INTERVAL,
        }
    }
}

impl PwermConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the annual discount rate.
    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    /// Sets the success floor.
    pub fn with_success_floor(mut self, floor: Money) -> Self {
        self.success_floor = floor;
        self
    }

    /// Attaches an IPO-ratchet floor.
    pub fn with_ipo_ratchet(mut self, ratchet: RatchetTerms) -> Self {
        self.ipo_ratchet = Some(ratchet);
        self
    }

    /// Sets the cancellation-check interval.
    pub fn with_check_every(mut self, samples: usize) -> Self {
        self.check_every = samples;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`PwermError::InvalidConfig`] for a discount rate at or below
    /// -100%, a non-finite rate, or a zero check interval.
    pub fn validate(&self) -> Result<(), PwermError> {
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(PwermError::invalid_config(
                "discount rate must be finite and above -100%",
            ));
        }
        if self.check_every == 0 {
            return Err(PwermError::invalid_config(
                "cancellation check interval must be positive",
            ));
        }
        Ok(())
    }
}

/// Exit-value percentiles off the (weighted) empirical CDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentiles {
    /// 10th percentile.
    pub p10: Money,
    /// 25th percentile.
    pub p25: Money,
    /// Median.
    pub p50: Money,
    /// 75th percentile.
    pub p75: Money,
    /// 90th percentile.
    pub p90: Money,
}

impl Percentiles {
    fn from_cdf(cdf: &WeightedCdf) -> Result<Self, PwermError> {
        let at = |p: f64| Money::from_dollars(cdf.quantile(p));
        Ok(Self {
            p10: at(0.10)?,
            p25: at(0.25)?,
            p50: at(0.50)?,
            p75: at(0.75)?,
            p90: at(0.90)?,
        })
    }
}

/// One scenario's allocation within a discrete PWERM run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    /// The scenario.
    pub scenario_id: ScenarioId,
    /// Its probability mass.
    pub probability: f64,
    /// Its exit value.
    pub exit_value: Money,
    /// Years to this exit.
    pub time_to_exit_years: f64,
    /// `(1 + discount_rate)^-time_to_exit`.
    pub discount_factor: f64,
    /// The full waterfall allocation at this exit.
    pub result: WaterfallResult,
}

/// Probability-weighted return summary for one share class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    /// The class.
    pub class_id: ClassId,
    /// Capital invested.
    pub invested: Money,
    /// Probability-weighted expected proceeds.
    pub expected_proceeds: Money,
    /// Expected proceeds over invested capital.
    pub moic: f64,
    /// Closed-form IRR over the probability-weighted holding period;
    /// `None` for common stock and zero-investment classes.
    pub irr: Option<f64>,
}

/// The PWERM valuation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PwermSummary {
    /// Probability-weighted expected exit value.
    pub expected_exit_value: Money,
    /// Expected exit value with each scenario discounted to present.
    pub adjusted_expected_value: Money,
    /// Median exit value off the weighted CDF.
    pub median_exit_value: Money,
    /// Exit-value percentiles.
    pub percentiles: Percentiles,
    /// Probability of an exit strictly above the success floor.
    pub success_probability: f64,
    /// Probability of an IPO exit.
    pub ipo_probability: f64,
    /// Per-scenario allocations (empty in Monte Carlo mode).
    pub per_scenario: Vec<ScenarioOutcome>,
    /// Per-class expected returns.
    pub per_class: Vec<ClassSummary>,
}

/// Runs PWERM valuations against a cap-table snapshot.
#[derive(Debug, Clone, Default)]
pub struct PwermAggregator {
    engine: WaterfallEngine,
    config: PwermConfig,
}

impl PwermAggregator {
    /// Creates an aggregator with the given configuration.
    pub fn new(config: PwermConfig) -> Self {
        Self {
            engine: WaterfallEngine::new(),
            config,
        }
    }

    /// The aggregator's configuration.
    pub fn config(&self) -> &PwermConfig {
        &self.config
    }

    /// Discrete-mode PWERM: one allocation per scenario, weighted by
    /// scenario probability.
    ///
    /// # Errors
    ///
    /// Rejects an invalid scenario set or configuration before any
    /// allocation runs; propagates allocation failures.
    pub fn run(
        &self,
        snapshot: &CapTableSnapshot,
        scenarios: &[ExitScenario],
    ) -> Result<PwermSummary, PwermError> {
        self.config.validate()?;
        validate_scenarios(scenarios)?;

        let mut per_scenario = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let terms = scenario.exit_terms(self.config.ipo_ratchet.as_ref());
            let result = self.engine.allocate_at_exit(snapshot, &terms)?;
            let discount_factor =
                (1.0 + self.config.discount_rate).powf(-scenario.time_to_exit_years);
            per_scenario.push(ScenarioOutcome {
                scenario_id: scenario.id.clone(),
                probability: scenario.probability,
                exit_value: scenario.exit_value,
                time_to_exit_years: scenario.time_to_exit_years,
                discount_factor,
                result,
            });
        }

        let mut expected_exit_value = Money::ZERO;
        let mut adjusted_expected_value = Money::ZERO;
        for outcome in &per_scenario {
            expected_exit_value += outcome.exit_value.mul_f64(outcome.probability)?;
            adjusted_expected_value += outcome
                .exit_value
                .mul_f64(outcome.probability * outcome.discount_factor)?;
        }

        let cdf = WeightedCdf::new(
            scenarios
                .iter()
                .map(|s| (s.exit_value.to_dollars(), s.probability))
                .collect(),
        )?;
        let percentiles = Percentiles::from_cdf(&cdf)?;
        let ipo_probability = scenarios
            .iter()
            .filter(|s| s.is_ipo())
            .map(|s| s.probability)
            .sum();

        Ok(PwermSummary {
            expected_exit_value,
            adjusted_expected_value,
            median_exit_value: percentiles.p50,
            percentiles,
            success_probability: cdf.mass_above(self.config.success_floor.to_dollars()),
            ipo_probability,
            per_class: self.per_class_summaries(snapshot, &per_scenario)?,
            per_scenario,
        })
    }

    /// Monte Carlo PWERM: equal-weight aggregation over sampled exits,
    /// with order-statistic percentiles.
    ///
    /// Allocations fan out across cores in chunks of
    /// `config.check_every` samples; the token is checked between
    /// chunks, so a cancel lands within one chunk's worth of work.
    ///
    /// # Errors
    ///
    /// [`PwermError::Cancelled`] when the token fires mid-run;
    /// otherwise the same failure modes as [`PwermAggregator::run`].
    pub fn run_monte_carlo(
        &self,
        snapshot: &CapTableSnapshot,
        mc: &MonteCarloConfig,
        cancel: &CancelToken,
    ) -> Result<PwermSummary, PwermError> {
        self.config.validate()?;
        let samples: Vec<Money> = MonteCarloSampler::new(mc)?.collect();

        let mut results: Vec<WaterfallResult> = Vec::with_capacity(samples.len());
        for chunk in samples.chunks(self.config.check_every) {
            if cancel.is_cancelled() {
                return Err(PwermError::Cancelled {
                    completed: results.len(),
                });
            }
            let allocated = parallel::parallel_map(chunk, |&exit_value| {
                self.engine
                    .allocate_at_exit(snapshot, &self.sample_terms(mc, exit_value))
            });
            for result in allocated {
                results.push(result?);
            }
        }

        let n = samples.len() as f64;
        let values: Vec<f64> = samples.iter().map(|m| m.to_dollars()).collect();
        let cdf = WeightedCdf::from_samples(values)?;
        let percentiles = Percentiles::from_cdf(&cdf)?;
        let expected_exit_value = Money::from_dollars(cdf.mean())?;
        let horizon_discount =
            (1.0 + self.config.discount_rate).powf(-mc.time_to_exit_years);
        let adjusted_expected_value = expected_exit_value.mul_f64(horizon_discount)?;
        let ipo_probability = match mc.ipo_value_threshold {
            Some(threshold) => {
                samples.iter().filter(|&&s| s >= threshold).count() as f64 / n
            }
            None => 0.0,
        };

        let mut per_class = Vec::with_capacity(snapshot.len());
        for (index, class) in snapshot.classes().iter().enumerate() {
            let mean_dollars = results
                .iter()
                .map(|r| r.outcomes[index].proceeds.to_dollars())
                .sum::<f64>()
                / n;
            let expected_proceeds = Money::from_dollars(mean_dollars)?;
            let multiple = moic(expected_proceeds, class.invested());
            let irr = if class.invested().is_positive() {
                irr_from_moic(multiple, mc.time_to_exit_years)
            } else {
                None
            };
            per_class.push(ClassSummary {
                class_id: class.id().clone(),
                invested: class.invested(),
                expected_proceeds,
                moic: multiple,
                irr,
            });
        }

        Ok(PwermSummary {
            expected_exit_value,
            adjusted_expected_value,
            median_exit_value: percentiles.p50,
            percentiles,
            success_probability: cdf.mass_above(self.config.success_floor.to_dollars()),
            ipo_probability,
            per_scenario: Vec::new(),
            per_class,
        })
    }

    fn sample_terms(&self, mc: &MonteCarloConfig, exit_value: Money) -> ExitTerms {
        let is_ipo = mc
            .ipo_value_threshold
            .map(|threshold| exit_value >= threshold)
            .unwrap_or(false);
        let mut terms = if is_ipo {
            ExitTerms::ipo(exit_value, mc.time_to_exit_years)
        } else {
            ExitTerms::liquidation(exit_value).with_years_to_exit(mc.time_to_exit_years)
        };
        if is_ipo {
            if let Some(ratchet) = &self.config.ipo_ratchet {
                terms = terms.with_ratchet(ratchet.clone());
            }
        }
        terms
    }

    fn per_class_summaries(
        &self,
        snapshot: &CapTableSnapshot,
        per_scenario: &[ScenarioOutcome],
    ) -> Result<Vec<ClassSummary>, PwermError> {
        let expected_years: f64 = per_scenario
            .iter()
            .map(|s| s.probability * s.time_to_exit_years)
            .sum();

        let mut summaries = Vec::with_capacity(snapshot.len());
        for (index, class) in snapshot.classes().iter().enumerate() {
            let mut expected_proceeds = Money::ZERO;
            for outcome in per_scenario {
                expected_proceeds += outcome.result.outcomes[index]
                    .proceeds
                    .mul_f64(outcome.probability)?;
            }
            let multiple = moic(expected_proceeds, class.invested());
            let irr = if class.invested().is_positive() {
                irr_from_moic(multiple, expected_years)
            } else {
                None
            };
            summaries.push(ClassSummary {
                class_id: class.id().clone(),
                invested: class.invested(),
                expected_proceeds,
                moic: multiple,
                irr,
            });
        }
        Ok(summaries)
    }
}
