//! Waterfall engine error types.
//!
//! Inputs are rejected before any allocation arithmetic runs; the only
//! errors that can surface mid-computation are numeric overflow and a
//! conservation breach, both of which abort the single call.

use captable_core::math::rounding::ProRataError;
use captable_core::types::{ClassId, Money, MoneyError};
use captable_model::error::ModelError;
use thiserror::Error;

/// Waterfall allocation errors.
///
/// Non-convergence of the election fixed point is deliberately *not* an
/// error: the engine returns its best allocation flagged
/// `converged = false` instead of failing the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaterfallError {
    /// The exit value was negative.
    #[error("Exit value {value} is negative")]
    NegativeExitValue {
        /// The offending exit value.
        value: Money,
    },

    /// The cap table itself failed validation.
    #[error("Invalid cap table: {0}")]
    Model(#[from] ModelError),

    /// A ratchet or request referenced a class not in the snapshot.
    #[error("Unknown share class '{id}'")]
    UnknownClass {
        /// The missing class id.
        id: ClassId,
    },

    /// Money arithmetic left the safe integer range.
    #[error("Numeric overflow: {0}")]
    Numeric(#[from] MoneyError),

    /// A pro-rata split failed (negative pool or invalid weights).
    #[error("Allocation failed: {0}")]
    Allocation(#[from] ProRataError),

    /// Total proceeds diverged from the exit value beyond one cent.
    #[error("Proceeds diverge from the exit value by {difference}")]
    Conservation {
        /// The unreconciled difference.
        difference: Money,
    },
}
