//! Exact money arithmetic in integer minor units.
//!
//! This module provides:
//! - `Money`: A currency amount held as an integer number of cents
//! - Conversion to and from display dollars, confined to the boundary
//!
//! All interior waterfall arithmetic runs on `Money` so repeated
//! allocation passes cannot accumulate floating-point drift. Amounts
//! enter as dollars once, at construction, and leave as dollars once,
//! at serialisation or display.
//!
//! # Examples
//!
//! ```
//! use captable_core::types::Money;
//!
//! let invested = Money::from_dollars(1_000_000.0).unwrap();
//! let preference = invested.mul_f64(1.5).unwrap();
//!
//! assert_eq!(preference.cents(), 150_000_000);
//! assert_eq!(preference.to_dollars(), 1_500_000.0);
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::error::MoneyError;

/// Scale used to carry multiplication factors in integer arithmetic.
const FACTOR_SCALE: i128 = 1_000_000_000;

/// A currency amount held as an integer number of cents.
///
/// Addition and subtraction are plain integer operations; amounts are
/// bounded at construction (see [`Money::MAX_DOLLARS`]) so sums across a
/// cap table stay far inside the `i64` range. Multiplication by a factor
/// (a liquidation multiple, a dividend accrual, a discount) goes through
/// [`Money::mul_f64`], which carries the product in 128-bit integer
/// arithmetic and rounds to the nearest cent.
///
/// Serialises as a JSON number of dollars; deserialisation rejects
/// non-finite and out-of-range values.
///
/// # Examples
///
/// ```
/// use captable_core::types::Money;
///
/// let a = Money::from_dollars(10.25).unwrap();
/// let b = Money::from_cents(975);
///
/// assert_eq!((a + b).to_dollars(), 20.0);
/// assert_eq!((a - b).cents(), 50);
/// assert!(b < a);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Maximum supported magnitude in dollars (one hundred trillion).
    ///
    /// Keeps every representable amount, and sums of amounts across a
    /// full cap table, comfortably inside the `i64` cent range.
    pub const MAX_DOLLARS: f64 = 1e14;

    /// Creates an amount from an integer number of cents.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::Money;
    ///
    /// let m = Money::from_cents(12_345);
    /// assert_eq!(m.to_dollars(), 123.45);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates an amount from a dollar value, rounding to the nearest cent.
    ///
    /// # Arguments
    /// * `dollars` - Amount in display currency
    ///
    /// # Returns
    /// `Ok(Money)` for finite values within `±MAX_DOLLARS`,
    /// `Err(MoneyError::NonFinite)` or `Err(MoneyError::OutOfRange)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::Money;
    ///
    /// let m = Money::from_dollars(1_666_666.666).unwrap();
    /// assert_eq!(m.cents(), 166_666_667);
    ///
    /// assert!(Money::from_dollars(f64::NAN).is_err());
    /// assert!(Money::from_dollars(1e18).is_err());
    /// ```
    pub fn from_dollars(dollars: f64) -> Result<Self, MoneyError> {
        if !dollars.is_finite() {
            return Err(MoneyError::NonFinite { value: dollars });
        }
        if dollars.abs() > Self::MAX_DOLLARS {
            return Err(MoneyError::OutOfRange {
                dollars,
                max: Self::MAX_DOLLARS,
            });
        }
        Ok(Money((dollars * 100.0).round() as i64))
    }

    /// Returns the amount as integer cents.
    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the amount in display dollars.
    ///
    /// This is the output boundary: the result is for reporting and
    /// serialisation, never for further allocation arithmetic.
    #[inline]
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a factor, rounding to the nearest cent.
    ///
    /// The factor is scaled to nano-units and the product carried in
    /// i128, so the result is deterministic and exact to well below a
    /// cent for any amount in the supported range.
    ///
    /// # Arguments
    /// * `factor` - Multiplier (liquidation multiple, accrual factor, ...)
    ///
    /// # Returns
    /// `Ok(Money)` on success, `Err(MoneyError::NonFinite)` for NaN or
    /// infinite factors, `Err(MoneyError::Overflow)` if the product
    /// leaves the representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::Money;
    ///
    /// let invested = Money::from_dollars(2_000_000.0).unwrap();
    /// let cap = invested.mul_f64(2.0).unwrap();
    /// assert_eq!(cap.to_dollars(), 4_000_000.0);
    /// ```
    pub fn mul_f64(self, factor: f64) -> Result<Self, MoneyError> {
        if !factor.is_finite() {
            return Err(MoneyError::NonFinite { value: factor });
        }
        let scaled = (factor * FACTOR_SCALE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return Err(MoneyError::Overflow { op: "mul" });
        }
        let product = self.0 as i128 * scaled as i128;
        let half = FACTOR_SCALE / 2;
        let cents = if product >= 0 {
            (product + half) / FACTOR_SCALE
        } else {
            (product - half) / FACTOR_SCALE
        };
        i64::try_from(cents)
            .map(Money)
            .map_err(|_| MoneyError::Overflow { op: "mul" })
    }

    /// Checked addition; `None` on i64 overflow.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction; `None` on i64 overflow.
    #[inline]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Fraction of one amount over another, in f64.
    ///
    /// Returns 0.0 when the denominator is zero; used for return
    /// multiples and ownership ratios at the reporting boundary.
    pub fn ratio(self, denominator: Money) -> f64 {
        if denominator.0 == 0 {
            0.0
        } else {
            self.0 as f64 / denominator.0 as f64
        }
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

impl fmt::Display for Money {
    /// Formats as dollars with two decimal places, e.g. `-12.05`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl serde::Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.to_dollars())
    }
}

impl<'de> serde::Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;
        Money::from_dollars(dollars).map_err(serde::de::Error::custom)
    }
}
