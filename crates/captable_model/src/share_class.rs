//! Share-class definitions.
//!
//! This module provides the immutable value type at the heart of the
//! cap table: a share class with its economic terms (liquidation
//! preference, participation, cumulative dividends, anti-dilution
//! protection) and its conversion state.

use captable_core::types::{year_fraction, ClassId, Date, Money, MoneyError};
use serde::{Deserialize, Serialize};

/// Kind of equity a share class represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassKind {
    /// Common stock: no preference, shares only in the residual.
    Common,
    /// Preferred stock: carries a liquidation preference and may
    /// convert to common.
    Preferred,
}

/// Anti-dilution protection attached to a preferred class.
///
/// Applied by the evolution tracker when a later round prices below the
/// class's current conversion price (a down round for that class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AntiDilution {
    /// No protection.
    None,
    /// Conversion price resets to the down-round price.
    FullRatchet,
    /// Conversion price moves by the broad-based weighted-average
    /// formula `new_cp = old_cp * (A + B) / (A + C)`.
    BroadBasedWeightedAverage,
}

impl Default for AntiDilution {
    fn default() -> Self {
        Self::None
    }
}

/// Cumulative dividend terms.
///
/// Unpaid dividends compound annually and fold into the liquidation
/// preference claim at exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendTerms {
    /// Annual dividend rate (e.g. 0.08 for 8%).
    rate: f64,
    /// Date accrual begins, normally the round close.
    accrual_start: Date,
}

impl DividendTerms {
    /// Creates new dividend terms.
    pub fn new(rate: f64, accrual_start: Date) -> Self {
        Self {
            rate,
            accrual_start,
        }
    }

    /// Returns the annual dividend rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the accrual start date.
    #[inline]
    pub fn accrual_start(&self) -> Date {
        self.accrual_start
    }

    /// Accrued dividend amount on `invested` through `through` plus
    /// `extra_years` beyond it.
    ///
    /// Compounds annually: `invested * ((1 + rate)^years - 1)` with
    /// years measured ACT/365F. A negative span accrues nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the accrued amount leaves the safe
    /// integer range.
    pub fn accrued(
        &self,
        invested: Money,
        through: Date,
        extra_years: f64,
    ) -> Result<Money, MoneyError> {
        let years = (year_fraction(self.accrual_start, through) + extra_years).max(0.0);
        invested.mul_f64((1.0 + self.rate).powf(years) - 1.0)
    }
}

fn default_one() -> f64 {
    1.0
}

/// A single share class on the cap table.
///
/// Built with [`ShareClass::common`] or [`ShareClass::preferred`] and
/// refined with the chainable `with_*` methods; field-level invariants
/// are checked when the class enters a
/// [`CapTableSnapshot`](crate::snapshot::CapTableSnapshot).
///
/// Seniority ranks are paid ascending: rank 1 is the most senior
/// preference. Classes sharing a rank must all be flagged pari passu.
///
/// # Examples
/// ```
/// use captable_core::types::Money;
/// use captable_model::share_class::ShareClass;
///
/// let series_a = ShareClass::preferred(
///     "series-a",
///     "Series A",
///     500.0,
///     Money::from_dollars(1_000_000.0).unwrap(),
///     2_000.0,
///     1,
/// );
///
/// assert!(series_a.is_preferred());
/// assert_eq!(series_a.multiple(), 1.0);
/// assert_eq!(series_a.as_converted_shares(), 500.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareClass {
    /// Stable identifier, unique within a snapshot.
    id: ClassId,
    /// Human-readable label.
    #[serde(default)]
    label: String,
    /// Common or preferred.
    kind: ClassKind,
    /// Shares outstanding (fractional shares permitted).
    shares: f64,
    /// Capital invested for this class.
    #[serde(default)]
    invested: Money,
    /// Original issue price per share in dollars.
    #[serde(default)]
    price_per_share: f64,
    /// Liquidation preference multiple (1.0 = 1x).
    #[serde(default = "default_one")]
    multiple: f64,
    /// Whether the class participates in the residual after taking its
    /// preference.
    #[serde(default)]
    participating: bool,
    /// Participation cap as a multiple of invested capital.
    #[serde(default)]
    participation_cap: Option<f64>,
    /// Seniority rank; lower ranks are paid first.
    #[serde(default)]
    seniority: u32,
    /// Whether this class shares its rank pari passu.
    #[serde(default)]
    pari_passu: bool,
    /// Cumulative dividend terms, if any.
    #[serde(default)]
    dividends: Option<DividendTerms>,
    /// Anti-dilution protection.
    #[serde(default)]
    anti_dilution: AntiDilution,
    /// Common shares received per preferred share on conversion.
    /// Starts at 1.0 and moves only through anti-dilution adjustment.
    #[serde(default = "default_one")]
    conversion_ratio: f64,
}

impl ShareClass {
    /// Creates a common share class.
    ///
    /// Common stock has no invested capital, no preference, and never
    /// converts (its conversion ratio is fixed at 1.0).
    pub fn common(id: impl Into<String>, label: impl Into<String>, shares: f64) -> Self {
        Self {
            id: ClassId::new(id),
            label: label.into(),
            kind: ClassKind::Common,
            shares,
            invested: Money::ZERO,
            price_per_share: 0.0,
            multiple: 0.0,
            participating: false,
            participation_cap: None,
            seniority: 0,
            pari_passu: false,
            dividends: None,
            anti_dilution: AntiDilution::None,
            conversion_ratio: 1.0,
        }
    }

    /// Creates a preferred share class with a 1x non-participating
    /// preference and no dividend or anti-dilution terms.
    ///
    /// Refine with the chainable `with_*` methods.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique class identifier
    /// * `label` - Display label
    /// * `shares` - Shares outstanding
    /// * `invested` - Capital invested
    /// * `price_per_share` - Original issue price in dollars
    /// * `seniority` - Preference rank (1 = most senior)
    pub fn preferred(
        id: impl Into<String>,
        label: impl Into<String>,
        shares: f64,
        invested: Money,
        price_per_share: f64,
        seniority: u32,
    ) -> Self {
        Self {
            id: ClassId::new(id),
            label: label.into(),
            kind: ClassKind::Preferred,
            shares,
            invested,
            price_per_share,
            multiple: 1.0,
            participating: false,
            participation_cap: None,
            seniority,
            pari_passu: false,
            dividends: None,
            anti_dilution: AntiDilution::None,
            conversion_ratio: 1.0,
        }
    }

    /// Sets the liquidation preference multiple.
    pub fn with_multiple(mut self, multiple: f64) -> Self {
        self.multiple = multiple;
        self
    }

    /// Marks the class participating, optionally capped at
    /// `cap_multiple * invested` total proceeds.
    pub fn with_participation(mut self, cap_multiple: Option<f64>) -> Self {
        self.participating = true;
        self.participation_cap = cap_multiple;
        self
    }

    /// Attaches cumulative dividend terms.
    pub fn with_dividends(mut self, rate: f64, accrual_start: Date) -> Self {
        self.dividends = Some(DividendTerms::new(rate, accrual_start));
        self
    }

    /// Sets the anti-dilution protection.
    pub fn with_anti_dilution(mut self, anti_dilution: AntiDilution) -> Self {
        self.anti_dilution = anti_dilution;
        self
    }

    /// Flags the class as sharing its seniority rank pari passu.
    pub fn with_pari_passu(mut self) -> Self {
        self.pari_passu = true;
        self
    }

    /// Returns the class id.
    #[inline]
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// Returns the display label, falling back to the id when empty.
    #[inline]
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }

    /// Returns the class kind.
    #[inline]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Returns whether this is common stock.
    #[inline]
    pub fn is_common(&self) -> bool {
        self.kind == ClassKind::Common
    }

    /// Returns whether this is preferred stock.
    #[inline]
    pub fn is_preferred(&self) -> bool {
        self.kind == ClassKind::Preferred
    }

    /// Returns the shares outstanding.
    #[inline]
    pub fn shares(&self) -> f64 {
        self.shares
    }

    /// Returns the invested capital.
    #[inline]
    pub fn invested(&self) -> Money {
        self.invested
    }

    /// Returns the original issue price per share in dollars.
    #[inline]
    pub fn price_per_share(&self) -> f64 {
        self.price_per_share
    }

    /// Returns the liquidation preference multiple.
    #[inline]
    pub fn multiple(&self) -> f64 {
        self.multiple
    }

    /// Returns whether the class participates in the residual.
    #[inline]
    pub fn is_participating(&self) -> bool {
        self.participating
    }

    /// Returns the participation cap multiple, if capped.
    #[inline]
    pub fn participation_cap(&self) -> Option<f64> {
        self.participation_cap
    }

    /// Returns the seniority rank (lower = more senior).
    #[inline]
    pub fn seniority(&self) -> u32 {
        self.seniority
    }

    /// Returns whether the class is flagged pari passu.
    #[inline]
    pub fn is_pari_passu(&self) -> bool {
        self.pari_passu
    }

    /// Returns the cumulative dividend terms, if any.
    #[inline]
    pub fn dividends(&self) -> Option<DividendTerms> {
        self.dividends
    }

    /// Returns the anti-dilution protection.
    #[inline]
    pub fn anti_dilution(&self) -> AntiDilution {
        self.anti_dilution
    }

    /// Returns the conversion ratio (common shares per preferred share).
    #[inline]
    pub fn conversion_ratio(&self) -> f64 {
        self.conversion_ratio
    }

    /// Returns the current conversion price in dollars.
    ///
    /// Equal to the original issue price until anti-dilution moves it.
    #[inline]
    pub fn conversion_price(&self) -> f64 {
        self.price_per_share / self.conversion_ratio
    }

    /// Returns the as-converted share count, `shares * conversion_ratio`.
    #[inline]
    pub fn as_converted_shares(&self) -> f64 {
        self.shares * self.conversion_ratio
    }

    /// Resets the conversion price, recomputing the conversion ratio.
    ///
    /// Called by the evolution tracker when anti-dilution fires; the
    /// ratio becomes `original_price / new_price`.
    pub fn set_conversion_price(&mut self, new_price: f64) {
        self.conversion_ratio = self.price_per_share / new_price;
    }

    /// Full liquidation preference claim at exit.
    ///
    /// `invested * multiple` plus cumulative dividends accrued through
    /// `as_of` plus `extra_years` (the scenario's time to exit).
    /// Common stock claims nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the claim leaves the safe integer range.
    pub fn preference_claim(&self, as_of: Date, extra_years: f64) -> Result<Money, MoneyError> {
        if self.is_common() {
            return Ok(Money::ZERO);
        }
        let base = self.invested.mul_f64(self.multiple)?;
        match self.dividends {
            Some(terms) => {
                let accrued = terms.accrued(self.invested, as_of, extra_years)?;
                base.checked_add(accrued)
                    .ok_or(MoneyError::Overflow { op: "add" })
            }
            None => Ok(base),
        }
    }

    /// Total-proceeds cap in dollars for a capped participating class.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the cap leaves the safe integer range.
    pub fn cap_amount(&self) -> Result<Option<Money>, MoneyError> {
        match self.participation_cap {
            Some(cap_multiple) => Ok(Some(self.invested.mul_f64(cap_multiple)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn add_shares(&mut self, extra: f64) {
        self.shares += extra;
    }

    pub(crate) fn set_pari_passu(&mut self, pari_passu: bool) {
        self.pari_passu = pari_passu;
    }

    pub(crate) fn set_seniority(&mut self, seniority: u32) {
        self.seniority = seniority;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dollars(amount: f64) -> Money {
        Money::from_dollars(amount).unwrap()
    }

    #[test]
    fn test_common_defaults() {
        let common = ShareClass::common("common", "Founders", 1_000.0);

        assert!(common.is_common());
        assert!(!common.is_preferred());
        assert_eq!(common.shares(), 1_000.0);
        assert_eq!(common.invested(), Money::ZERO);
        assert!(!common.is_participating());
        assert_eq!(common.conversion_ratio(), 1.0);
        assert_eq!(common.as_converted_shares(), 1_000.0);
    }

    #[test]
    fn test_preferred_defaults() {
        let series_a =
            ShareClass::preferred("series-a", "Series A", 500.0, dollars(1_000_000.0), 2_000.0, 1);

        assert!(series_a.is_preferred());
        assert_eq!(series_a.multiple(), 1.0);
        assert!(!series_a.is_participating());
        assert_eq!(series_a.participation_cap(), None);
        assert_eq!(series_a.seniority(), 1);
        assert_eq!(series_a.anti_dilution(), AntiDilution::None);
        assert_eq!(series_a.conversion_price(), 2_000.0);
    }

    #[test]
    fn test_chainable_terms() {
        let class = ShareClass::preferred("p", "P", 100.0, dollars(2_000_000.0), 100.0, 1)
            .with_multiple(2.0)
            .with_participation(Some(3.0))
            .with_anti_dilution(AntiDilution::FullRatchet)
            .with_pari_passu();

        assert_eq!(class.multiple(), 2.0);
        assert!(class.is_participating());
        assert_eq!(class.participation_cap(), Some(3.0));
        assert_eq!(class.anti_dilution(), AntiDilution::FullRatchet);
        assert!(class.is_pari_passu());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let unnamed = ShareClass::common("common", "", 10.0);
        assert_eq!(unnamed.label(), "common");

        let named = ShareClass::common("common", "Founders", 10.0);
        assert_eq!(named.label(), "Founders");
    }

    #[test]
    fn test_set_conversion_price() {
        let mut class = ShareClass::preferred("p", "P", 100.0, dollars(100_000.0), 10.0, 1);

        // Down round at $5: ratio doubles
        class.set_conversion_price(5.0);
        assert_relative_eq!(class.conversion_ratio(), 2.0);
        assert_relative_eq!(class.conversion_price(), 5.0);
        assert_relative_eq!(class.as_converted_shares(), 200.0);
    }

    #[test]
    fn test_preference_claim_simple() {
        let as_of = Date::from_ymd(2024, 6, 15).unwrap();
        let class = ShareClass::preferred("p", "P", 100.0, dollars(1_000_000.0), 10.0, 1)
            .with_multiple(1.5);

        let claim = class.preference_claim(as_of, 0.0).unwrap();
        assert_eq!(claim, dollars(1_500_000.0));
    }

    #[test]
    fn test_preference_claim_common_is_zero() {
        let as_of = Date::from_ymd(2024, 6, 15).unwrap();
        let common = ShareClass::common("common", "Founders", 1_000.0);
        assert_eq!(common.preference_claim(as_of, 0.0).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_dividend_accrual_compounds_annually() {
        // 2021-01-01 to 2023-01-01 is exactly 730 days = 2.0 years ACT/365F
        let start = Date::from_ymd(2021, 1, 1).unwrap();
        let through = Date::from_ymd(2023, 1, 1).unwrap();
        let terms = DividendTerms::new(0.08, start);

        let accrued = terms.accrued(dollars(1_000_000.0), through, 0.0).unwrap();
        // 1,000,000 * (1.08^2 - 1) = 166,400
        assert_eq!(accrued, dollars(166_400.0));
    }

    #[test]
    fn test_dividend_accrual_clamps_negative_span() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let before = Date::from_ymd(2023, 1, 1).unwrap();
        let terms = DividendTerms::new(0.08, start);

        let accrued = terms.accrued(dollars(1_000_000.0), before, 0.0).unwrap();
        assert_eq!(accrued, Money::ZERO);
    }

    #[test]
    fn test_preference_claim_with_dividends_and_time_to_exit() {
        let start = Date::from_ymd(2021, 1, 1).unwrap();
        let as_of = Date::from_ymd(2021, 1, 1).unwrap();
        let class = ShareClass::preferred("p", "P", 100.0, dollars(1_000_000.0), 10.0, 1)
            .with_dividends(0.08, start);

        // Accrues only through the extra years beyond as-of
        let claim = class.preference_claim(as_of, 2.0).unwrap();
        assert_eq!(claim, dollars(1_166_400.0));
    }

    #[test]
    fn test_cap_amount() {
        let capped = ShareClass::preferred("p", "P", 100.0, dollars(2_000_000.0), 10.0, 1)
            .with_participation(Some(2.0));
        assert_eq!(capped.cap_amount().unwrap(), Some(dollars(4_000_000.0)));

        let uncapped = ShareClass::preferred("q", "Q", 100.0, dollars(2_000_000.0), 10.0, 1)
            .with_participation(None);
        assert_eq!(uncapped.cap_amount().unwrap(), None);
    }

    #[test]
    fn test_serde_camel_case_round_trip() {
        let class = ShareClass::preferred(
            "series-a",
            "Series A",
            500.0,
            dollars(1_000_000.0),
            2_000.0,
            1,
        )
        .with_participation(Some(2.0));

        let json = serde_json::to_string(&class).unwrap();
        assert!(json.contains("\"pricePerShare\":2000.0"));
        assert!(json.contains("\"participationCap\":2.0"));
        assert!(json.contains("\"kind\":\"preferred\""));

        let back: ShareClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, class);
    }

    #[test]
    fn test_serde_minimal_json_defaults() {
        let json = r#"{
            "id": "series-a",
            "kind": "preferred",
            "shares": 500.0,
            "invested": 1000000.0,
            "pricePerShare": 2000.0,
            "seniority": 1
        }"#;

        let class: ShareClass = serde_json::from_str(json).unwrap();
        assert_eq!(class.multiple(), 1.0);
        assert_eq!(class.conversion_ratio(), 1.0);
        assert!(!class.is_participating());
        assert_eq!(class.invested(), dollars(1_000_000.0));
        assert_eq!(class.anti_dilution(), AntiDilution::None);
    }

    #[test]
    fn test_anti_dilution_serde_spelling() {
        let json = serde_json::to_string(&AntiDilution::BroadBasedWeightedAverage).unwrap();
        assert_eq!(json, "\"broadBasedWeightedAverage\"");
    }
}
