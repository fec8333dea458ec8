//! The liquidation-waterfall allocation engine.
//!
//! The hard problem here is the conversion election: each preferred
//! class chooses between taking its liquidation preference and
//! converting to common, and the value-maximising choice for one class
//! depends on every other class's choice, because their joint elections
//! determine both the residual pool and the preference capital senior
//! to it. The engine resolves the interdependence by bounded
//! fixed-point iteration over the joint election vector, never by
//! recursion, so a single call cannot hang on pathological input.

use captable_core::types::Money;
use captable_model::snapshot::CapTableSnapshot;

use crate::error::WaterfallError;
use crate::participation;
use crate::preference;
use crate::ratchet::{self, RatchetTerms};
use crate::result::{ClassOutcome, Election, WaterfallResult};

/// Extra election sweeps beyond one per class before giving up.
const EXTRA_SWEEPS: usize = 5;

/// Economic terms of one class, resolved against a specific exit.
///
/// Preference claims fold accrued cumulative dividends in, so they are
/// computed once per allocation, not per iteration.
#[derive(Debug, Clone)]
pub(crate) struct ClassEconomics {
    /// Full preference claim (invested × multiple + accrued dividends).
    pub claim: Money,
    /// Capital invested.
    pub invested: Money,
    /// As-converted share count.
    pub as_converted: f64,
    /// Whether the class participates in the residual after its preference.
    pub participating: bool,
    /// Total-proceeds cap, if participation is capped.
    pub cap: Option<Money>,
    /// Whether the class is preferred stock.
    pub preferred: bool,
    /// Seniority rank (lower = more senior).
    pub seniority: u32,
}

/// The exit being allocated.
///
/// A plain liquidation is just an exit value; IPO exits may carry a
/// ratchet floor, and a positive time to exit extends cumulative
/// dividend accrual beyond the snapshot date.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitTerms {
    /// Proceeds to distribute.
    pub exit_value: Money,
    /// Years between the snapshot date and the exit; extends dividend
    /// accrual.
    pub years_to_exit: f64,
    /// Whether the exit is an IPO.
    pub ipo: bool,
    /// IPO-ratchet floor, applied only when `ipo` is true.
    pub ratchet: Option<RatchetTerms>,
}

impl ExitTerms {
    /// An immediate liquidation at `exit_value`.
    pub fn liquidation(exit_value: Money) -> Self {
        Self {
            exit_value,
            years_to_exit: 0.0,
            ipo: false,
            ratchet: None,
        }
    }

    /// An IPO exit, optionally ratcheted via [`ExitTerms::with_ratchet`].
    pub fn ipo(exit_value: Money, years_to_exit: f64) -> Self {
        Self {
            exit_value,
            years_to_exit,
            ipo: true,
            ratchet: None,
        }
    }

    /// Sets the years between snapshot and exit.
    pub fn with_years_to_exit(mut self, years: f64) -> Self {
        self.years_to_exit = years;
        self
    }

    /// Attaches an IPO-ratchet floor.
    pub fn with_ratchet(mut self, ratchet: RatchetTerms) -> Self {
        self.ratchet = Some(ratchet);
        self
    }
}

/// Allocates exit proceeds across a cap table.
///
/// `allocate` is a pure function of the snapshot and the exit value:
/// the engine holds no state between calls and performs no I/O, so
/// calls are trivially parallelisable.
///
/// # Examples
/// ```
/// use captable_core::types::{ClassId, Date, Money};
/// use captable_model::share_class::ShareClass;
/// use captable_model::snapshot::CapTableSnapshot;
/// use captable_waterfall::engine::WaterfallEngine;
///
/// let snapshot = CapTableSnapshot::new(
///     vec![
///         ShareClass::common("common", "Founders", 1_000.0),
///         ShareClass::preferred(
///             "series-a",
///             "Series A",
///             500.0,
///             Money::from_dollars(1_000_000.0).unwrap(),
///             2_000.0,
///             1,
///         ),
///     ],
///     Date::from_ymd(2024, 6, 15).unwrap(),
/// )
/// .unwrap();
///
/// let result = WaterfallEngine::new()
///     .allocate(&snapshot, Money::from_dollars(500_000.0).unwrap())
///     .unwrap();
///
/// // Below the preference, Series A takes everything
/// assert_eq!(
///     result.proceeds_of(&ClassId::new("series-a")).unwrap(),
///     Money::from_dollars(500_000.0).unwrap()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct WaterfallEngine {
    extra_sweeps: usize,
}

impl Default for WaterfallEngine {
    fn default() -> Self {
        Self {
            extra_sweeps: EXTRA_SWEEPS,
        }
    }
}

impl WaterfallEngine {
    /// Creates an engine with the default iteration headroom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the election-sweep headroom beyond one sweep per class.
    ///
    /// Mainly useful in tests that force non-convergence.
    pub fn with_extra_sweeps(mut self, extra_sweeps: usize) -> Self {
        self.extra_sweeps = extra_sweeps;
        self
    }

    /// Allocates an immediate liquidation at `exit_value`.
    ///
    /// # Errors
    ///
    /// [`WaterfallError::NegativeExitValue`] for a negative exit;
    /// numeric failures abort the call. Non-convergence is reported on
    /// the result, never as an error.
    pub fn allocate(
        &self,
        snapshot: &CapTableSnapshot,
        exit_value: Money,
    ) -> Result<WaterfallResult, WaterfallError> {
        self.allocate_at_exit(snapshot, &ExitTerms::liquidation(exit_value))
    }

    /// Allocates an exit described by [`ExitTerms`].
    ///
    /// Dividends accrue through the snapshot date plus
    /// `terms.years_to_exit`; the ratchet floor applies only to IPO
    /// exits.
    pub fn allocate_at_exit(
        &self,
        snapshot: &CapTableSnapshot,
        terms: &ExitTerms,
    ) -> Result<WaterfallResult, WaterfallError> {
        if terms.exit_value.cents() < 0 {
            return Err(WaterfallError::NegativeExitValue {
                value: terms.exit_value,
            });
        }

        let economics = Self::resolve_economics(snapshot, terms)?;

        // Every preferred class starts on its preference (step 1 of the
        // election search); common holds common and never elects.
        let mut elections: Vec<Election> = economics
            .iter()
            .map(|e| {
                if e.preferred {
                    Election::Preferred
                } else {
                    Election::Converted
                }
            })
            .collect();

        let max_sweeps = economics.len() + self.extra_sweeps;
        let mut allocation = self.distribute(&economics, &elections, terms.exit_value)?;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < max_sweeps {
            iterations += 1;

            // Evaluate each candidate flip against a counterfactual
            // re-allocation with the other elections held fixed, then
            // apply all strict improvements at once.
            let mut next = elections.clone();
            for (index, econ) in economics.iter().enumerate() {
                if !econ.preferred {
                    continue;
                }
                let mut flipped = elections.clone();
                flipped[index] = flipped[index].flipped();
                let alternative = self.distribute(&economics, &flipped, terms.exit_value)?;
                if alternative[index] > allocation[index] {
                    next[index] = flipped[index];
                }
            }

            if next == elections {
                converged = true;
                break;
            }
            elections = next;
            allocation = self.distribute(&economics, &elections, terms.exit_value)?;
        }

        if terms.ipo {
            if let Some(ratchet_terms) = &terms.ratchet {
                let protected = snapshot
                    .classes()
                    .iter()
                    .position(|c| c.id() == &ratchet_terms.class_id)
                    .ok_or_else(|| WaterfallError::UnknownClass {
                        id: ratchet_terms.class_id.clone(),
                    })?;
                ratchet::apply_ipo_floor(&economics, protected, ratchet_terms, &mut allocation)?;
            }
        }

        Self::reconcile(&economics, terms.exit_value, &mut allocation)?;
        Ok(Self::build_result(
            snapshot, &economics, &elections, allocation, terms, converged, iterations,
        ))
    }

    fn resolve_economics(
        snapshot: &CapTableSnapshot,
        terms: &ExitTerms,
    ) -> Result<Vec<ClassEconomics>, WaterfallError> {
        snapshot
            .classes()
            .iter()
            .map(|class| {
                Ok(ClassEconomics {
                    claim: class.preference_claim(snapshot.as_of(), terms.years_to_exit)?,
                    invested: class.invested(),
                    as_converted: class.as_converted_shares(),
                    participating: class.is_participating(),
                    cap: class.cap_amount()?,
                    preferred: class.is_preferred(),
                    seniority: class.seniority(),
                })
            })
            .collect()
    }

    /// One complete distribution pass for a fixed election vector.
    fn distribute(
        &self,
        economics: &[ClassEconomics],
        elections: &[Election],
        exit_value: Money,
    ) -> Result<Vec<Money>, WaterfallError> {
        let (mut proceeds, residual) =
            preference::pay_preference_stack(economics, elections, exit_value)?;
        let mut leftover =
            participation::distribute_residual(economics, elections, residual, &mut proceeds)?;
        leftover += participation::enforce_caps(economics, elections, &mut proceeds)?;
        if leftover.is_positive() {
            proceeds[Self::sink_index(economics)] += leftover;
        }
        Ok(proceeds)
    }

    /// Where undistributable funds and rounding remainders go: the most
    /// senior preferred class, or the first class of a common-only table.
    fn sink_index(economics: &[ClassEconomics]) -> usize {
        economics
            .iter()
            .enumerate()
            .filter(|(_, e)| e.preferred)
            .min_by_key(|(_, e)| e.seniority)
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Verifies conservation within one cent and folds any remainder
    /// into the most senior class.
    fn reconcile(
        economics: &[ClassEconomics],
        exit_value: Money,
        proceeds: &mut [Money],
    ) -> Result<(), WaterfallError> {
        let total: Money = proceeds.iter().copied().sum();
        let difference = exit_value - total;
        if difference.is_zero() {
            return Ok(());
        }
        if difference.cents().abs() > 1 {
            return Err(WaterfallError::Conservation { difference });
        }
        proceeds[Self::sink_index(economics)] += difference;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_result(
        snapshot: &CapTableSnapshot,
        economics: &[ClassEconomics],
        elections: &[Election],
        allocation: Vec<Money>,
        terms: &ExitTerms,
        converged: bool,
        iterations: usize,
    ) -> WaterfallResult {
        let fully_diluted = snapshot.fully_diluted_shares();
        let outcomes = snapshot
            .classes()
            .iter()
            .zip(economics)
            .zip(elections)
            .zip(&allocation)
            .map(|(((class, econ), &election), &proceeds)| ClassOutcome {
                class_id: class.id().clone(),
                proceeds,
                election,
                return_multiple: proceeds.ratio(econ.invested),
                ownership_at_exit: econ.as_converted / fully_diluted,
            })
            .collect();

        WaterfallResult {
            exit_value: terms.exit_value,
            outcomes,
            converged,
            iterations,
        }
    }
}
