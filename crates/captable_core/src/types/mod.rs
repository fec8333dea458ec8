//! Core money, identifier, and time types.
//!
//! This module provides:
//! - `money`: Exact currency amounts held in integer minor units
//! - `ids`: Strongly-typed identifiers for share classes, rounds, and scenarios
//! - `time`: Date type and ACT/365F year-fraction helpers
//! - `error`: Structured error types for money, date, and solver operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Money`] from `money`
//! - [`ClassId`], [`RoundId`], [`ScenarioId`] from `ids`
//! - [`Date`], [`year_fraction`] from `time`
//! - [`MoneyError`], [`DateError`], [`SolverError`] from `error`

pub mod error;
pub mod ids;
pub mod money;
pub mod time;

// Re-export commonly used types at module level
pub use error::{DateError, MoneyError, SolverError};
pub use ids::{ClassId, RoundId, ScenarioId};
pub use money::Money;
pub use time::{year_fraction, Date};
