//! Round-by-round ownership evolution.
//!
//! Replays an ordered sequence of financing rounds into a time series
//! of validated snapshots, applying pre-money option-pool expansion and
//! anti-dilution adjustment along the way. This is the only place a cap
//! table is ever mutated; everything downstream consumes the immutable
//! snapshots it produces.

use std::collections::HashMap;

use captable_core::types::{ClassId, RoundId};
use serde::Serialize;

use crate::error::ModelError;
use crate::round::Round;
use crate::share_class::{AntiDilution, ShareClass};
use crate::snapshot::CapTableSnapshot;

/// Ownership of one class before and after a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    /// The class.
    pub class_id: ClassId,
    /// As-converted ownership fraction before the round (0 for the
    /// class the round creates).
    pub pre_ownership: f64,
    /// As-converted ownership fraction after the round.
    pub post_ownership: f64,
}

/// The state of the cap table after one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStep {
    /// The round that produced this step.
    pub round_id: RoundId,
    /// Validated snapshot as of the round date.
    pub snapshot: CapTableSnapshot,
    /// Pre/post ownership per class, in snapshot order.
    pub ownership: Vec<OwnershipRecord>,
    /// Whether the round priced below any existing preferred class's
    /// conversion price.
    pub down_round: bool,
    /// Classes whose conversion price moved through anti-dilution.
    pub adjusted_classes: Vec<ClassId>,
    /// Non-fatal observations, e.g. single-step dilution beyond 100%.
    pub warnings: Vec<String>,
}

/// Replays financing rounds into a sequence of cap-table snapshots.
///
/// Later rounds rank senior to earlier ones unless a round co-invests
/// with an earlier round, in which case both classes share that round's
/// rank pari passu. Option-pool shares accumulate in a dedicated common
/// class created on first expansion.
///
/// # Examples
/// ```
/// use captable_core::types::{Date, Money};
/// use captable_model::evolution::EvolutionTracker;
/// use captable_model::round::Round;
///
/// let rounds = vec![Round::new(
///     "series-a",
///     Date::from_ymd(2022, 3, 1).unwrap(),
///     Money::from_dollars(4_000_000.0).unwrap(),
///     Money::from_dollars(1_000_000.0).unwrap(),
///     2_000.0,
///     "series-a",
///     "Series A",
/// )];
///
/// let steps = EvolutionTracker::new().replay(1_000.0, &rounds).unwrap();
/// assert_eq!(steps.len(), 1);
/// assert_eq!(steps[0].snapshot.fully_diluted_shares(), 1_500.0);
/// ```
#[derive(Debug, Clone)]
pub struct EvolutionTracker {
    founders_id: ClassId,
    pool_id: ClassId,
}

impl Default for EvolutionTracker {
    fn default() -> Self {
        Self {
            founders_id: ClassId::new("common"),
            pool_id: ClassId::new("option-pool"),
        }
    }
}

impl EvolutionTracker {
    /// Creates a tracker with the default founder and pool class ids
    /// (`common` and `option-pool`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id used for the founders' common class.
    #[inline]
    pub fn founders_id(&self) -> &ClassId {
        &self.founders_id
    }

    /// Returns the id used for the option-pool class.
    #[inline]
    pub fn pool_id(&self) -> &ClassId {
        &self.pool_id
    }

    /// Replays `rounds` in order over a founders-only cap table.
    ///
    /// Produces one [`SnapshotStep`] per round. Rounds must be in
    /// chronological order; each must carry a positive price and
    /// investment.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRound`] for non-positive prices,
    /// shares, or out-of-order dates; [`ModelError::UnknownRound`] when
    /// a co-investment references a round not yet replayed; and any
    /// snapshot validation failure for the resulting table.
    pub fn replay(
        &self,
        founder_shares: f64,
        rounds: &[Round],
    ) -> Result<Vec<SnapshotStep>, ModelError> {
        if !founder_shares.is_finite() || founder_shares <= 0.0 {
            return Err(ModelError::invalid_class(
                &self.founders_id,
                "founder shares must be positive",
            ));
        }

        let mut classes = vec![ShareClass::common(
            self.founders_id.as_str(),
            "Common",
            founder_shares,
        )];
        let mut rank_of_round: HashMap<RoundId, u32> = HashMap::new();
        let mut steps: Vec<SnapshotStep> = Vec::with_capacity(rounds.len());
        let total_rounds = rounds.len() as u32;

        for (index, round) in rounds.iter().enumerate() {
            if let Some(previous) = steps.last().map(|step| step.snapshot.as_of()) {
                if round.date() < previous {
                    return Err(ModelError::invalid_round(
                        round.id(),
                        "rounds must be in chronological order",
                    ));
                }
            }
            Self::validate_round(round)?;

            let pre_fully_diluted: f64 = classes.iter().map(|c| c.as_converted_shares()).sum();
            let pre_ownership: HashMap<ClassId, f64> = classes
                .iter()
                .map(|c| {
                    (
                        c.id().clone(),
                        c.as_converted_shares() / pre_fully_diluted,
                    )
                })
                .collect();

            let pool_added = self.expand_pool(&mut classes, round);
            let (down_round, adjusted_classes) = Self::apply_anti_dilution(&mut classes, round);

            // Later rounds rank senior; co-investment reuses an earlier rank.
            let fresh_rank = total_rounds - index as u32;
            let rank = match round.class_terms().co_invest_with() {
                Some(reference) => {
                    let rank = *rank_of_round.get(reference).ok_or_else(|| {
                        ModelError::UnknownRound {
                            id: round.id().clone(),
                            reference: reference.clone(),
                        }
                    })?;
                    for class in classes
                        .iter_mut()
                        .filter(|c| c.is_preferred() && c.seniority() == rank)
                    {
                        class.set_pari_passu(true);
                    }
                    rank
                }
                None => fresh_rank,
            };
            rank_of_round.insert(round.id().clone(), rank);

            let new_shares = round.new_shares();
            classes.push(round.class_terms().build_class(
                new_shares,
                round.investment(),
                round.price_per_share(),
                rank,
                round.date(),
            ));

            let snapshot = CapTableSnapshot::new(classes.clone(), round.date())?;
            let post_fully_diluted = snapshot.fully_diluted_shares();
            let ownership = snapshot
                .classes()
                .iter()
                .map(|c| OwnershipRecord {
                    class_id: c.id().clone(),
                    pre_ownership: pre_ownership.get(c.id()).copied().unwrap_or(0.0),
                    post_ownership: c.as_converted_shares() / post_fully_diluted,
                })
                .collect();

            let mut warnings = Vec::new();
            let issued = new_shares + pool_added;
            if issued > pre_fully_diluted {
                warnings.push(format!(
                    "round '{}' issues {:.0} shares against {:.0} existing; dilution exceeds 100%",
                    round.id(),
                    issued,
                    pre_fully_diluted
                ));
            }

            steps.push(SnapshotStep {
                round_id: round.id().clone(),
                snapshot,
                ownership,
                down_round,
                adjusted_classes,
                warnings,
            });
        }

        Ok(steps)
    }

    fn validate_round(round: &Round) -> Result<(), ModelError> {
        if !round.price_per_share().is_finite() || round.price_per_share() <= 0.0 {
            return Err(ModelError::invalid_round(
                round.id(),
                "price per share must be positive",
            ));
        }
        if !round.investment().is_positive() {
            return Err(ModelError::invalid_round(
                round.id(),
                "investment must be positive",
            ));
        }
        let new_shares = round.new_shares();
        if !new_shares.is_finite() || new_shares <= 0.0 {
            return Err(ModelError::invalid_round(
                round.id(),
                "new shares must be positive",
            ));
        }
        if let Some(expansion) = round.pool_expansion() {
            if !expansion.is_finite() || expansion < 0.0 {
                return Err(ModelError::invalid_round(
                    round.id(),
                    "pool expansion cannot be negative",
                ));
            }
        }
        Ok(())
    }

    /// Adds pre-money pool shares, creating the pool class on first use.
    /// Returns the number of shares added.
    fn expand_pool(&self, classes: &mut Vec<ShareClass>, round: &Round) -> f64 {
        let extra = match round.pool_expansion() {
            Some(extra) if extra > 0.0 => extra,
            _ => return 0.0,
        };
        match classes.iter_mut().find(|c| c.id() == &self.pool_id) {
            Some(pool) => pool.add_shares(extra),
            None => classes.push(ShareClass::common(
                self.pool_id.as_str(),
                "Option pool",
                extra,
            )),
        }
        extra
    }

    /// Applies anti-dilution to every protected class the round prices
    /// below. Returns the down-round flag and the adjusted class ids.
    fn apply_anti_dilution(
        classes: &mut [ShareClass],
        round: &Round,
    ) -> (bool, Vec<ClassId>) {
        let price = round.price_per_share();
        let base_shares: f64 = classes.iter().map(|c| c.as_converted_shares()).sum();
        let new_shares = round.new_shares();

        let mut down_round = false;
        let mut adjusted = Vec::new();
        for class in classes.iter_mut().filter(|c| c.is_preferred()) {
            if price >= class.conversion_price() {
                continue;
            }
            down_round = true;
            match class.anti_dilution() {
                AntiDilution::None => {}
                AntiDilution::FullRatchet => {
                    class.set_conversion_price(price);
                    adjusted.push(class.id().clone());
                }
                AntiDilution::BroadBasedWeightedAverage => {
                    let old_price = class.conversion_price();
                    // A = pre-round fully-diluted shares (pool already
                    // expanded), B = shares the new money buys at the
                    // old price, C = actual new shares issued.
                    let a = base_shares;
                    let b = round.investment().to_dollars() / old_price;
                    let c = new_shares;
                    class.set_conversion_price(old_price * (a + b) / (a + c));
                    adjusted.push(class.id().clone());
                }
            }
        }
        (down_round, adjusted)
    }
}
