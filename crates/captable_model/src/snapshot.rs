//! Point-in-time cap-table snapshots.
//!
//! A [`CapTableSnapshot`] is the validated, immutable input to every
//! downstream computation. Construction runs the full field-level and
//! structural validation so that allocation code never re-checks input
//! and every rejection carries the offending class id.

use std::collections::{BTreeMap, HashSet};

use captable_core::types::{ClassId, Date, Money};
use serde::Serialize;

use crate::error::ModelError;
use crate::share_class::ShareClass;

/// An ordered set of share classes at a point in time.
///
/// Invariants established at construction:
/// - at least one class, no duplicate ids;
/// - every class has positive, finite shares and conversion ratio;
/// - preferred classes have positive invested capital and issue price,
///   a non-negative preference multiple, and a participation cap (when
///   present) no smaller than the multiple;
/// - preferred classes sharing a seniority rank are all flagged pari
///   passu, so ranks form a total preorder.
///
/// # Examples
/// ```
/// use captable_core::types::{Date, Money};
/// use captable_model::share_class::ShareClass;
/// use captable_model::snapshot::CapTableSnapshot;
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
/// assert_eq!(snapshot.fully_diluted_shares(), 1_500.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableSnapshot {
    /// Share classes in input order.
    classes: Vec<ShareClass>,
    /// Snapshot date.
    as_of: Date,
}

impl CapTableSnapshot {
    /// Creates a validated snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] naming the offending class when any
    /// structural or field-level invariant fails.
    pub fn new(classes: Vec<ShareClass>, as_of: Date) -> Result<Self, ModelError> {
        if classes.is_empty() {
            return Err(ModelError::EmptyCapTable);
        }

        let mut seen: HashSet<&ClassId> = HashSet::new();
        for class in &classes {
            if !seen.insert(class.id()) {
                return Err(ModelError::DuplicateClass {
                    id: class.id().clone(),
                });
            }
            Self::validate_class(class)?;
        }
        Self::validate_seniority(&classes)?;

        Ok(Self { classes, as_of })
    }

    fn validate_class(class: &ShareClass) -> Result<(), ModelError> {
        if !class.shares().is_finite() || class.shares() <= 0.0 {
            return Err(ModelError::invalid_class(
                class.id(),
                "shares must be positive",
            ));
        }
        if !class.conversion_ratio().is_finite() || class.conversion_ratio() <= 0.0 {
            return Err(ModelError::invalid_class(
                class.id(),
                "conversion ratio must be positive",
            ));
        }
        if class.is_common() {
            return Ok(());
        }

        if !class.invested().is_positive() {
            return Err(ModelError::invalid_class(
                class.id(),
                "invested amount must be positive",
            ));
        }
        if !class.price_per_share().is_finite() || class.price_per_share() <= 0.0 {
            return Err(ModelError::invalid_class(
                class.id(),
                "price per share must be positive",
            ));
        }
        if !class.multiple().is_finite() || class.multiple() < 0.0 {
            return Err(ModelError::invalid_class(
                class.id(),
                "preference multiple cannot be negative",
            ));
        }
        if let Some(cap) = class.participation_cap() {
            if !class.is_participating() {
                return Err(ModelError::invalid_class(
                    class.id(),
                    "participation cap requires a participating class",
                ));
            }
            if !cap.is_finite() || cap < class.multiple() {
                return Err(ModelError::invalid_class(
                    class.id(),
                    "participation cap must be at least the preference multiple",
                ));
            }
        }
        if let Some(terms) = class.dividends() {
            if !terms.rate().is_finite() || terms.rate() < 0.0 {
                return Err(ModelError::invalid_class(
                    class.id(),
                    "dividend rate cannot be negative",
                ));
            }
        }
        Ok(())
    }

    fn validate_seniority(classes: &[ShareClass]) -> Result<(), ModelError> {
        let mut by_rank: BTreeMap<u32, Vec<&ShareClass>> = BTreeMap::new();
        for class in classes.iter().filter(|c| c.is_preferred()) {
            by_rank.entry(class.seniority()).or_default().push(class);
        }
        for (rank, group) in by_rank {
            if group.len() > 1 && group.iter().any(|c| !c.is_pari_passu()) {
                return Err(ModelError::SeniorityOverlap {
                    rank,
                    ids: group.iter().map(|c| c.id().clone()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Returns the share classes in input order.
    #[inline]
    pub fn classes(&self) -> &[ShareClass] {
        &self.classes
    }

    /// Returns the snapshot date.
    #[inline]
    pub fn as_of(&self) -> Date {
        self.as_of
    }

    /// Returns the number of share classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns whether the snapshot has no classes (never true for a
    /// validated snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Looks up a class by id.
    pub fn get(&self, id: &ClassId) -> Option<&ShareClass> {
        self.classes.iter().find(|c| c.id() == id)
    }

    /// Returns whether a class id exists in the snapshot.
    pub fn contains(&self, id: &ClassId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over the preferred classes.
    pub fn preferred(&self) -> impl Iterator<Item = &ShareClass> {
        self.classes.iter().filter(|c| c.is_preferred())
    }

    /// Iterates over the common classes.
    pub fn common(&self) -> impl Iterator<Item = &ShareClass> {
        self.classes.iter().filter(|c| c.is_common())
    }

    /// Fully-diluted share count: the sum of as-converted shares.
    pub fn fully_diluted_shares(&self) -> f64 {
        self.classes.iter().map(|c| c.as_converted_shares()).sum()
    }

    /// Total invested capital across all classes.
    pub fn total_invested(&self) -> Money {
        self.classes.iter().map(|c| c.invested()).sum()
    }

    /// As-converted ownership fraction of a class, if present.
    pub fn ownership_of(&self, id: &ClassId) -> Option<f64> {
        let class = self.get(id)?;
        Some(class.as_converted_shares() / self.fully_diluted_shares())
    }
}
