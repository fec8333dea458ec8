//! Financing-round definitions.
//!
//! A [`Round`] is the unit of input to the evolution tracker: priced
//! new money, an optional pre-money option-pool expansion, and the
//! terms of the preferred class the round creates.

use captable_core::types::{ClassId, Date, Money, RoundId};
use serde::{Deserialize, Serialize};

use crate::share_class::{AntiDilution, ShareClass};

fn default_one() -> f64 {
    1.0
}

/// Terms of the share class a round creates.
///
/// Share count, invested amount, issue price, and seniority are derived
/// from the round itself; this struct carries only the negotiated
/// economic terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClassTerms {
    /// Id of the class to create.
    id: ClassId,
    /// Display label.
    #[serde(default)]
    label: String,
    /// Liquidation preference multiple.
    #[serde(default = "default_one")]
    multiple: f64,
    /// Whether the class participates in the residual.
    #[serde(default)]
    participating: bool,
    /// Participation cap multiple, if capped.
    #[serde(default)]
    participation_cap: Option<f64>,
    /// Cumulative dividend rate; accrual starts at the round date.
    #[serde(default)]
    dividend_rate: Option<f64>,
    /// Anti-dilution protection.
    #[serde(default)]
    anti_dilution: AntiDilution,
    /// Round whose class this one ranks pari passu with, if any.
    #[serde(default)]
    co_invest_with: Option<RoundId>,
}

impl NewClassTerms {
    /// Creates terms for a plain 1x non-participating class.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: ClassId::new(id),
            label: label.into(),
            multiple: 1.0,
            participating: false,
            participation_cap: None,
            dividend_rate: None,
            anti_dilution: AntiDilution::None,
            co_invest_with: None,
        }
    }

    /// Returns the id of the class to create.
    #[inline]
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// Returns the round this class co-invests with, if any.
    #[inline]
    pub fn co_invest_with(&self) -> Option<&RoundId> {
        self.co_invest_with.as_ref()
    }

    /// Materialises the share class for a priced round.
    pub fn build_class(
        &self,
        shares: f64,
        invested: Money,
        price_per_share: f64,
        seniority: u32,
        round_date: Date,
    ) -> ShareClass {
        let mut class = ShareClass::preferred(
            self.id.as_str(),
            self.label.clone(),
            shares,
            invested,
            price_per_share,
            seniority,
        )
        .with_multiple(self.multiple)
        .with_anti_dilution(self.anti_dilution);

        if self.participating {
            class = class.with_participation(self.participation_cap);
        }
        if let Some(rate) = self.dividend_rate {
            class = class.with_dividends(rate, round_date);
        }
        if self.co_invest_with.is_some() {
            class = class.with_pari_passu();
        }
        class
    }
}

/// A priced financing round.
///
/// # Examples
/// ```
/// use captable_core::types::Money;
/// use captable_core::types::Date;
/// use captable_model::round::Round;
///
/// let series_a = Round::new(
///     "series-a",
///     Date::from_ymd(2022, 3, 1).unwrap(),
///     Money::from_dollars(4_000_000.0).unwrap(),
///     Money::from_dollars(1_000_000.0).unwrap(),
///     2_000.0,
///     "series-a",
///     "Series A",
/// );
///
/// assert_eq!(series_a.new_shares(), 500.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Round identifier.
    id: RoundId,
    /// Close date.
    date: Date,
    /// Pre-money valuation.
    pre_money: Money,
    /// New money invested.
    investment: Money,
    /// Price per share in dollars.
    price_per_share: f64,
    /// Shares added to the option pool before the round is priced.
    #[serde(default)]
    pool_expansion: Option<f64>,
    /// Terms of the class this round creates.
    class: NewClassTerms,
}

impl Round {
    /// Creates a new priced round creating a 1x non-participating class.
    ///
    /// Refine the created class with the chainable `with_*` methods.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        date: Date,
        pre_money: Money,
        investment: Money,
        price_per_share: f64,
        class_id: impl Into<String>,
        class_label: impl Into<String>,
    ) -> Self {
        Self {
            id: RoundId::new(id),
            date,
            pre_money,
            investment,
            price_per_share,
            pool_expansion: None,
            class: NewClassTerms::new(class_id, class_label),
        }
    }

    /// Adds a pre-money option-pool expansion of `shares` new shares.
    pub fn with_pool_expansion(mut self, shares: f64) -> Self {
        self.pool_expansion = Some(shares);
        self
    }

    /// Sets the created class's liquidation preference multiple.
    pub fn with_multiple(mut self, multiple: f64) -> Self {
        self.class.multiple = multiple;
        self
    }

    /// Makes the created class participating, optionally capped.
    pub fn with_participation(mut self, cap_multiple: Option<f64>) -> Self {
        self.class.participating = true;
        self.class.participation_cap = cap_multiple;
        self
    }

    /// Attaches cumulative dividends accruing from the round date.
    pub fn with_dividends(mut self, rate: f64) -> Self {
        self.class.dividend_rate = Some(rate);
        self
    }

    /// Sets the created class's anti-dilution protection.
    pub fn with_anti_dilution(mut self, anti_dilution: AntiDilution) -> Self {
        self.class.anti_dilution = anti_dilution;
        self
    }

    /// Ranks the created class pari passu with the class created by an
    /// earlier round instead of senior to it.
    pub fn co_invest_with(mut self, round_id: impl Into<String>) -> Self {
        self.class.co_invest_with = Some(RoundId::new(round_id));
        self
    }

    /// Returns the round id.
    #[inline]
    pub fn id(&self) -> &RoundId {
        &self.id
    }

    /// Returns the close date.
    #[inline]
    pub fn date(&self) -> Date {
        self.date
    }

    /// Returns the pre-money valuation.
    #[inline]
    pub fn pre_money(&self) -> Money {
        self.pre_money
    }

    /// Returns the new money invested.
    #[inline]
    pub fn investment(&self) -> Money {
        self.investment
    }

    /// Returns the price per share in dollars.
    #[inline]
    pub fn price_per_share(&self) -> f64 {
        self.price_per_share
    }

    /// Returns the pre-money pool expansion in shares, if configured.
    #[inline]
    pub fn pool_expansion(&self) -> Option<f64> {
        self.pool_expansion
    }

    /// Returns the terms of the class this round creates.
    #[inline]
    pub fn class_terms(&self) -> &NewClassTerms {
        &self.class
    }

    /// New shares issued: `investment / price_per_share`.
    #[inline]
    pub fn new_shares(&self) -> f64 {
        self.investment.to_dollars() / self.price_per_share
    }

    /// Post-money valuation: `pre_money + investment`.
    #[inline]
    pub fn post_money(&self) -> Money {
        self.pre_money + self.investment
    }
}
