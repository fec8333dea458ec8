//! Exit-value and term-structure sensitivity sweeps.
//!
//! A sweep is a row of independent allocations across an exit-value
//! grid; a term sweep repeats the row once per variant of the preferred
//! terms (e.g. 1x non-participating vs 2x participating), for
//! side-by-side comparison of term sheets.

use captable_core::types::Money;
use captable_model::share_class::ShareClass;
use captable_model::snapshot::CapTableSnapshot;
use captable_waterfall::{WaterfallEngine, WaterfallResult};
use serde::Serialize;

use crate::error::PwermError;
use crate::parallel::{adaptive_map, ParallelConfig};

/// One variant of the preferred terms to compare.
///
/// Applied uniformly to every preferred class; shares, invested
/// capital, seniority, dividends, and anti-dilution state carry over
/// from the base snapshot unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermVariant {
    /// Display label, e.g. "2x participating capped 3x".
    pub label: String,
    /// Liquidation preference multiple.
    pub multiple: f64,
    /// Whether the preferred participates after its preference.
    pub participating: bool,
    /// Participation cap as a multiple of invested capital.
    pub participation_cap: Option<f64>,
}

impl TermVariant {
    /// A non-participating variant at `multiple`.
    pub fn non_participating(label: impl Into<String>, multiple: f64) -> Self {
        Self {
            label: label.into(),
            multiple,
            participating: false,
            participation_cap: None,
        }
    }

    /// A participating variant at `multiple`, optionally capped.
    pub fn participating(
        label: impl Into<String>,
        multiple: f64,
        participation_cap: Option<f64>,
    ) -> Self {
        Self {
            label: label.into(),
            multiple,
            participating: true,
            participation_cap,
        }
    }

    /// Rebuilds the snapshot with these terms on every preferred class.
    fn apply(&self, snapshot: &CapTableSnapshot) -> Result<CapTableSnapshot, PwermError> {
        let classes = snapshot
            .classes()
            .iter()
            .map(|class| {
                if class.is_common() {
                    return class.clone();
                }
                let mut rebuilt = ShareClass::preferred(
                    class.id().as_str(),
                    class.label(),
                    class.shares(),
                    class.invested(),
                    class.price_per_share(),
                    class.seniority(),
                )
                .with_multiple(self.multiple);
                if self.participating {
                    rebuilt = rebuilt.with_participation(self.participation_cap);
                }
                if class.is_pari_passu() {
                    rebuilt = rebuilt.with_pari_passu();
                }
                if let Some(dividends) = class.dividends() {
                    rebuilt = rebuilt.with_dividends(dividends.rate(), dividends.accrual_start());
                }
                rebuilt = rebuilt.with_anti_dilution(class.anti_dilution());
                // Preserve any anti-dilution adjustment already applied
                rebuilt.set_conversion_price(class.conversion_price());
                rebuilt
            })
            .collect();
        Ok(CapTableSnapshot::new(classes, snapshot.as_of())
            .map_err(captable_waterfall::WaterfallError::Model)?)
    }
}

/// One term variant's results across the exit grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermGridRow {
    /// The variant's label.
    pub variant: String,
    /// One allocation per grid exit, in grid order.
    pub results: Vec<WaterfallResult>,
}

/// A (exit value × term variant) comparison grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermGrid {
    /// The exit-value grid, ascending.
    pub exits: Vec<Money>,
    /// One row per term variant, in input order.
    pub rows: Vec<TermGridRow>,
}

/// Runs exit-value and term sweeps over a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SensitivityAnalyzer {
    engine: WaterfallEngine,
    parallel: ParallelConfig,
}

impl SensitivityAnalyzer {
    /// Creates an analyzer with default parallel tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the parallel fan-out configuration.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// An evenly spaced exit-value grid from `low` to `high` inclusive.
    ///
    /// # Errors
    ///
    /// [`PwermError::InvalidConfig`] for fewer than two steps, a
    /// negative low end, or a descending range.
    pub fn exit_grid(low: Money, high: Money, steps: usize) -> Result<Vec<Money>, PwermError> {
        if steps < 2 {
            return Err(PwermError::invalid_config("a sweep needs at least 2 steps"));
        }
        if low.cents() < 0 {
            return Err(PwermError::invalid_config("sweep range must be non-negative"));
        }
        if high < low {
            return Err(PwermError::invalid_config("sweep range must be ascending"));
        }
        let span = (high - low).cents() as f64;
        Ok((0..steps)
            .map(|step| {
                let fraction = step as f64 / (steps - 1) as f64;
                low + Money::from_cents((span * fraction).round() as i64)
            })
            .collect())
    }

    /// Allocates across an evenly spaced exit-value grid.
    ///
    /// Fans out across cores when the grid passes the parallel
    /// threshold.
    ///
    /// # Errors
    ///
    /// Grid validation as [`SensitivityAnalyzer::exit_grid`];
    /// propagates allocation failures.
    pub fn sweep(
        &self,
        snapshot: &CapTableSnapshot,
        low: Money,
        high: Money,
        steps: usize,
    ) -> Result<Vec<WaterfallResult>, PwermError> {
        let exits = Self::exit_grid(low, high, steps)?;
        adaptive_map(&self.parallel, &exits, |&exit_value| {
            self.engine.allocate(snapshot, exit_value)
        })
        .into_iter()
        .map(|result| result.map_err(PwermError::from))
        .collect()
    }

    /// Allocates a (exit value × term variant) grid.
    ///
    /// # Errors
    ///
    /// Rejects an empty variant list; otherwise as
    /// [`SensitivityAnalyzer::sweep`].
    pub fn term_sweep(
        &self,
        snapshot: &CapTableSnapshot,
        variants: &[TermVariant],
        low: Money,
        high: Money,
        steps: usize,
    ) -> Result<TermGrid, PwermError> {
        if variants.is_empty() {
            return Err(PwermError::invalid_config(
                "a term sweep needs at least one variant",
            ));
        }
        let exits = Self::exit_grid(low, high, steps)?;
        let mut rows = Vec::with_capacity(variants.len());
        for variant in variants {
            let varied = variant.apply(snapshot)?;
            let results: Result<Vec<WaterfallResult>, PwermError> =
                adaptive_map(&self.parallel, &exits, |&exit_value| {
                    self.engine.allocate(&varied, exit_value)
                })
                .into_iter()
                .map(|result| result.map_err(PwermError::from))
                .collect();
            rows.push(TermGridRow {
                variant: variant.label.clone(),
                results: results?,
            });
        }
        Ok(TermGrid { exits, rows })
    }
}
