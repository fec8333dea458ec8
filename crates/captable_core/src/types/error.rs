//! Error types for structured error handling.
//!
//! This module provides:
//! - `MoneyError`: Errors from money construction and arithmetic
//! - `DateError`: Errors from date construction and parsing
//! - `SolverError`: Errors from root-finding solvers

use std::fmt;
use thiserror::Error;

/// Money construction and arithmetic errors.
///
/// Amounts are carried in integer minor units (cents), so failures are
/// either unrepresentable inputs at the construction boundary or an
/// overflow of the safe integer range during arithmetic.
///
/// # Variants
/// - `NonFinite`: A NaN or infinite value was supplied where an amount was expected
/// - `OutOfRange`: The amount exceeds the supported monetary range
/// - `Overflow`: Integer arithmetic exceeded the representable range
///
/// # Examples
/// ```
/// use captable_core::types::MoneyError;
///
/// let err = MoneyError::NonFinite { value: f64::NAN };
/// assert!(format!("{}", err).contains("finite"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoneyError {
    /// A NaN or infinite value was supplied where an amount was expected.
    #[error("Amount {value} is not finite")]
    NonFinite {
        /// The offending value.
        value: f64,
    },

    /// The amount exceeds the supported monetary range.
    #[error("Amount {dollars} exceeds the supported range of ±{max} dollars")]
    OutOfRange {
        /// The offending amount in dollars.
        dollars: f64,
        /// Maximum supported magnitude in dollars.
        max: f64,
    },

    /// Integer arithmetic exceeded the representable range.
    #[error("Monetary overflow in {op}")]
    Overflow {
        /// The operation that overflowed.
        op: &'static str,
    },
}

/// Date-related errors.
///
/// Provides structured error handling for date construction and parsing
/// with descriptive context for each failure mode.
///
/// # Variants
/// - `InvalidDate`: Invalid date components (e.g., February 30th)
/// - `ParseError`: Failed to parse date string
///
/// # Examples
/// ```
/// use captable_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse date string.
    ParseError(String),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::InvalidDate { year, month, day } => {
                write!(f, "Invalid date: {}-{}-{}", year, month, day)
            }
            DateError::ParseError(msg) => write!(f, "Date parse error: {}", msg),
        }
    }
}

impl std::error::Error for DateError {}

/// Root-finding solver errors.
///
/// Provides structured error handling for root-finding solver operations
/// with descriptive context for each failure mode.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `DerivativeNearZero`: Derivative too small for Newton-Raphson
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `NumericalInstability`: General numerical instability
///
/// # Examples
/// ```
/// use captable_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}
